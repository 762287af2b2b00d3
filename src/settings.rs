use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::{ExportError, Result};

/// GX fog modes understood by the stagedef compiler.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum FogType {
    #[default]
    #[serde(rename = "GX_FOG_NONE")]
    #[strum(serialize = "GX_FOG_NONE")]
    None,
    #[serde(rename = "GX_FOG_LIN")]
    #[strum(serialize = "GX_FOG_LIN")]
    Linear,
    #[serde(rename = "GX_FOG_EXP")]
    #[strum(serialize = "GX_FOG_EXP")]
    Exp,
    #[serde(rename = "GX_FOG_EXP2")]
    #[strum(serialize = "GX_FOG_EXP2")]
    Exp2,
    #[serde(rename = "GX_FOG_REVEXP")]
    #[strum(serialize = "GX_FOG_REVEXP")]
    RevExp,
    #[serde(rename = "GX_FOG_REVEXP2")]
    #[strum(serialize = "GX_FOG_REVEXP2")]
    RevExp2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogSettings {
    #[serde(rename = "type")]
    pub fog_type: FogType,
    pub start: f64,
    pub end: f64,
    pub color: [f64; 3],
}

impl Default for FogSettings {
    fn default() -> Self {
        Self {
            fog_type: FogType::None,
            start: 0.0,
            end: 100.0,
            color: [1.0, 1.0, 1.0],
        }
    }
}

impl FogSettings {
    pub fn enabled(&self) -> bool {
        self.fog_type != FogType::None
    }
}

/// Per-scene stage metadata written to the document header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageSettings {
    pub game_mode: String,
    pub fallout_plane: f64,
    pub fog: FogSettings,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            game_mode: "MAIN_GAME".to_string(),
            fallout_plane: -10.0,
            fog: FogSettings::default(),
        }
    }
}

pub const GOLF_GAME_MODE: &str = "MONKEY_GOLF_2";
pub const TARGET_GAME_MODE: &str = "MONKEY_TARGET_2";

const TARGET_SCORES: [i64; 11] = [1, 10, 50, 100, 150, 200, 300, 400, 500, 750, 1000];

/// Collision triangle flags the given game mode defines, including the normal flag 0.
pub fn collision_triangle_flags(game_mode: &str) -> Vec<i64> {
    let mut flags = vec![0];
    match game_mode {
        GOLF_GAME_MODE => flags.extend([2, 4, 8]),
        // 0x8000 | (2 * score), stored as a signed 16-bit value
        TARGET_GAME_MODE => flags.extend(TARGET_SCORES.iter().map(|score| 2 * score - 32768)),
        _ => {}
    }
    flags
}

/// Options controlling how the exporter samples and where it writes.
///
/// Paths starting with `//` are relative to the scene document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub timestep: u32,
    pub value_round: u32,
    pub time_round: u32,
    pub optimize_keyframes: bool,
    pub model_path: String,
    pub config_path: String,
    pub background_path: String,
    pub background_import_path: Option<String>,
    pub background_import_preview: bool,
    pub gma_path: String,
    pub tpl_path: String,
    pub stagedef_path: String,
    pub raw_stagedef_path: String,
    pub gx_preset_path: String,
    pub import_gma_path: Option<String>,
    pub import_tpl_path: Option<String>,
    pub tools_dir: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            timestep: 1,
            value_round: 3,
            time_round: 3,
            optimize_keyframes: true,
            model_path: "//model.obj".to_string(),
            config_path: "//config.xml".to_string(),
            background_path: "//background.xml".to_string(),
            background_import_path: None,
            background_import_preview: true,
            gma_path: "//stage.gma".to_string(),
            tpl_path: "//stage.tpl".to_string(),
            stagedef_path: "//stage.lz".to_string(),
            raw_stagedef_path: "//stage.lz.raw".to_string(),
            gx_preset_path: "//presets".to_string(),
            import_gma_path: None,
            import_tpl_path: None,
            tools_dir: None,
        }
    }
}

const MAX_TIME_ROUND: u32 = 9;
const MAX_VALUE_ROUND: u32 = 12;

impl ExportConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: ExportConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timestep == 0 {
            return Err(ExportError::InvalidConfig(
                "timestep must be at least 1 frame".to_string(),
            ));
        }
        if self.time_round > MAX_TIME_ROUND {
            return Err(ExportError::InvalidConfig(format!(
                "time_round {} exceeds the maximum of {}",
                self.time_round, MAX_TIME_ROUND
            )));
        }
        if self.value_round > MAX_VALUE_ROUND {
            return Err(ExportError::InvalidConfig(format!(
                "value_round {} exceeds the maximum of {}",
                self.value_round, MAX_VALUE_ROUND
            )));
        }
        Ok(())
    }
}

/// Resolve a `//`-relative path against the directory of the scene document.
pub fn resolve_path(path: &str, base_dir: &Path) -> PathBuf {
    match path.strip_prefix("//") {
        Some(relative) => base_dir.join(relative),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn fog_type_wire_names() {
        assert_eq!("GX_FOG_EXP2", FogType::Exp2.to_string());
        assert_eq!(FogType::RevExp, FogType::from_str("GX_FOG_REVEXP").unwrap());
        assert!(!FogSettings::default().enabled());
    }

    #[test]
    fn target_flags_are_signed_score_flags() {
        let flags = collision_triangle_flags(TARGET_GAME_MODE);
        assert_eq!(12, flags.len());
        assert_eq!(-32766, flags[1]);
        assert_eq!(2 * 1000 - 32768, flags[11]);
        assert_eq!(vec![0, 2, 4, 8], collision_triangle_flags(GOLF_GAME_MODE));
        assert_eq!(vec![0], collision_triangle_flags("MAIN_GAME"));
    }

    #[test]
    fn zero_timestep_is_rejected() {
        let config = ExportConfig {
            timestep: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ExportError::InvalidConfig(_))));
        assert!(ExportConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ExportConfig = serde_json::from_str(r#"{ "optimize_keyframes": false }"#).unwrap();
        assert!(!config.optimize_keyframes);
        assert_eq!(3, config.value_round);
        assert_eq!("//model.obj", config.model_path);
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let base = Path::new("/stages/level1");
        assert_eq!(PathBuf::from("/stages/level1/config.xml"), resolve_path("//config.xml", base));
        assert_eq!(PathBuf::from("/tmp/out.xml"), resolve_path("/tmp/out.xml", base));
    }
}
