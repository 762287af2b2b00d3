//! Invocation of the external model converter and stagedef compiler.
//!
//! Both tools print their problems to stdout instead of failing, so their output is
//! scanned for marker words and handed back as diagnostics.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use anyhow::{anyhow, Result};
use directories::ProjectDirs;

use crate::settings::{resolve_path, ExportConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    /// Imports OBJ/MTL and writes GMA and TPL containers.
    GxModelViewer,
    /// Compiles a stage config into a stagedef.
    Ws2LzFrontend,
}

impl Converter {
    pub fn display_name(&self) -> &'static str {
        match self {
            Converter::GxModelViewer => "GxModelViewer",
            Converter::Ws2LzFrontend => "SMB Workshop 2",
        }
    }

    pub fn executable(&self, tools_dir: &Path) -> PathBuf {
        let windows = cfg!(target_os = "windows");
        match (self, windows) {
            (Converter::GxModelViewer, false) => tools_dir.join("GxUtils").join("GxModelViewer"),
            (Converter::GxModelViewer, true) => tools_dir.join("GxUtils").join("GxModelViewer.exe"),
            (Converter::Ws2LzFrontend, false) => {
                tools_dir.join("ws2lzfrontend").join("bin").join("ws2lzfrontend")
            }
            (Converter::Ws2LzFrontend, true) => {
                tools_dir.join("ws2lzfrontend").join("ws2lzfrontend.exe")
            }
        }
    }

    /// Substrings that mark an output line as a warning or error.
    fn markers(&self) -> &'static [&'static str] {
        match self {
            Converter::GxModelViewer => &["Import Warning", "Error"],
            Converter::Ws2LzFrontend => &["Critical", "Error", "Warning"],
        }
    }
}

/// Captured output of one converter run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterOutput {
    pub converter: Converter,
    pub lines: Vec<String>,
    pub diagnostics: Vec<String>,
    pub success: bool,
}

impl ConverterOutput {
    pub fn from_output(converter: Converter, output: &Output) -> Self {
        let lines = output_lines(&output.stdout);
        let diagnostics = scan_lines(converter, &lines);
        Self {
            converter,
            lines,
            diagnostics,
            success: output.status.success(),
        }
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Decode tool output, dropping terminal colour codes.
pub fn output_lines(bytes: &[u8]) -> Vec<String> {
    let stripped = strip_ansi_escapes::strip(bytes);
    String::from_utf8_lossy(&stripped)
        .lines()
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}

pub fn scan_lines(converter: Converter, lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| converter.markers().iter().any(|m| line.contains(m)))
        .cloned()
        .collect()
}

/// Where converters are looked up when the export config does not name a directory.
pub fn default_tools_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "smb_stage_config").map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn tools_dir(config: &ExportConfig) -> Result<PathBuf> {
    config
        .tools_dir
        .clone()
        .or_else(default_tools_dir)
        .ok_or_else(|| anyhow!("No converter directory configured and no home directory found"))
}

pub fn gx_model_viewer_args(config: &ExportConfig, base_dir: &Path) -> Vec<String> {
    let path = |p: &str| resolve_path(p, base_dir).to_string_lossy().into_owned();

    let mut args = vec![
        "-setPresetFolder".to_string(),
        path(&config.gx_preset_path),
        "-importObjMtl".to_string(),
        path(&config.model_path),
        "-removeUnusedTextures".to_string(),
    ];

    // Merging needs both halves of an existing GMA/TPL pair
    if let (Some(gma), Some(tpl)) = (&config.import_gma_path, &config.import_tpl_path) {
        let (gma, tpl) = (path(gma), path(tpl));
        if Path::new(&gma).exists() && Path::new(&tpl).exists() {
            args.push("-mergeGmaTpl".to_string());
            args.push(format!("{},{}", gma, tpl));
        }
    }

    args.extend([
        "-exportGma".to_string(),
        path(&config.gma_path),
        "-exportTpl".to_string(),
        path(&config.tpl_path),
    ]);
    args
}

/// `raw` writes an uncompressed stagedef to `raw_stagedef_path` instead of `stagedef_path`.
pub fn ws2lz_args(config: &ExportConfig, base_dir: &Path, raw: bool) -> Vec<String> {
    let path = |p: &str| resolve_path(p, base_dir).to_string_lossy().into_owned();
    let output = if raw {
        format!("-o{}", path(&config.raw_stagedef_path))
    } else {
        format!("-s{}", path(&config.stagedef_path))
    };
    vec![format!("-c{}", path(&config.config_path)), output]
}

/// Run a converter and collect its diagnostics.
///
/// A missing executable is an error. When the executable is not permitted to run, it is made
/// executable for its owner and started once more.
pub fn run_converter(converter: Converter, tools_dir: &Path, args: &[String]) -> Result<ConverterOutput> {
    let executable = converter.executable(tools_dir);
    if !executable.exists() {
        return Err(anyhow!(
            "{} not found at {}",
            converter.display_name(),
            executable.display()
        ));
    }

    log::info!("Running {} {}", executable.display(), args.join(" "));
    let output = match Command::new(&executable).args(args).output() {
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            log::warn!("Setting executable permissions on {}", executable.display());
            make_executable(&executable)?;
            Command::new(&executable).args(args).output().map_err(|e| {
                anyhow!(
                    "{} does not have the correct permissions to run, set executable permissions on {}: {}",
                    converter.display_name(),
                    executable.display(),
                    e
                )
            })?
        }
        result => result.map_err(|e| anyhow!("{} failed to run: {}", converter.display_name(), e))?,
    };

    let result = ConverterOutput::from_output(converter, &output);
    for line in &result.lines {
        log::debug!("{}", line);
    }
    for diagnostic in &result.diagnostics {
        log::warn!("{}: {}", converter.display_name(), diagnostic);
    }
    Ok(result)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o744))
        .map_err(|e| anyhow!("Failed to set permissions on {}: {}", path.display(), e))
}

#[cfg(not(unix))]
fn make_executable(path: &Path) -> Result<()> {
    Err(anyhow!("{} is not executable", path.display()))
}

/// Convert the exported OBJ into the stage's GMA and TPL.
pub fn export_gma_tpl(config: &ExportConfig, base_dir: &Path) -> Result<ConverterOutput> {
    let args = gx_model_viewer_args(config, base_dir);
    run_converter(Converter::GxModelViewer, &tools_dir(config)?, &args)
}

/// Compile the exported stage config into a stagedef.
pub fn export_stagedef(config: &ExportConfig, base_dir: &Path, raw: bool) -> Result<ConverterOutput> {
    let args = ws2lz_args(config, base_dir, raw);
    run_converter(Converter::Ws2LzFrontend, &tools_dir(config)?, &args)
}
