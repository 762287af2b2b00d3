use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{HostScene, SceneObject, SceneSettings};
use crate::error::Result;
use crate::settings::{ExportConfig, StageSettings};

/// A scene serialized as JSON, standing in for a live editor session.
///
/// Transforms are stored as they are at the start frame; animated values come from the curves.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDocument {
    pub scene: SceneSettings,
    pub stage: StageSettings,
    pub export: ExportConfig,
    pub frame_current: i64,
    pub objects: Vec<SceneObject>,
}

impl SceneDocument {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = self.to_json_string()?;
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn object_mut(&mut self, name: &str) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.name == name)
    }

    /// Add an object, replacing any existing object with the same name in place.
    pub fn upsert_object(&mut self, object: SceneObject) {
        match self.objects.iter_mut().find(|o| o.name == object.name) {
            Some(existing) => *existing = object,
            None => self.objects.push(object),
        }
    }
}

impl HostScene for SceneDocument {
    fn settings(&self) -> SceneSettings {
        self.scene
    }

    fn stage_settings(&self) -> &StageSettings {
        &self.stage
    }

    fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    fn frame_current(&self) -> i64 {
        self.frame_current
    }

    fn frame_set(&mut self, frame: i64) {
        self.frame_current = frame;
    }
}
