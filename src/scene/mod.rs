//! Read-only view of the host scene the exporter walks.

pub mod curve;
pub mod document;

use std::collections::BTreeMap;
use std::ops::Deref;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};
use crate::settings::StageSettings;

pub use curve::{Action, Channel, CurvePath, FCurve, Interpolation, KeyframePoint};
pub use document::SceneDocument;

/// Frame rate and animation range of the host scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub fps: f64,
    pub frame_start: i64,
    pub frame_end: i64,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            fps: 60.0,
            frame_start: 0,
            frame_end: 599,
        }
    }
}

impl SceneSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(ExportError::InvalidSceneSettings(format!(
                "frame rate must be positive, got {}",
                self.fps
            )));
        }
        if self.frame_end < self.frame_start {
            return Err(ExportError::InvalidSceneSettings(format!(
                "end frame {} is before start frame {}",
                self.frame_end, self.frame_start
            )));
        }
        Ok(())
    }

    /// Length of the scene's animation range in seconds, both ends inclusive.
    pub fn range_seconds(&self) -> f64 {
        (self.frame_end - self.frame_start + 1) as f64 / self.fps
    }
}

/// World-space transform in the host frame. Rotation is an XZY Euler triple in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub location: DVec3,
    pub rotation: DVec3,
    pub scale: DVec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            location: DVec3::ZERO,
            rotation: DVec3::ZERO,
            scale: DVec3::ONE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spline {
    pub points: Vec<DVec3>,
}

/// The data block an object carries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectData {
    #[default]
    Empty,
    Mesh {
        name: String,
    },
    Curve {
        name: String,
        #[serde(default)]
        splines: Vec<Spline>,
    },
    Other,
}

impl ObjectData {
    pub fn has_geometry(&self) -> bool {
        matches!(self, ObjectData::Mesh { .. } | ObjectData::Curve { .. })
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            ObjectData::Mesh { name } | ObjectData::Curve { name, .. } => Some(name),
            ObjectData::Empty | ObjectData::Other => None,
        }
    }
}

/// A custom attribute value as stored on a host object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Vector(Vec<f64>),
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::String(v.to_string())
    }
}

/// String-keyed custom attributes of one object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag(BTreeMap<String, PropertyValue>);

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.0.iter()
    }

    /// Copy every entry of `other` that is not already set.
    pub fn merge_missing(&mut self, other: PropertyBag) {
        for (key, value) in other.0 {
            self.0.entry(key).or_insert(value);
        }
    }
}

/// One host object as seen at the scene's current frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(default)]
    pub data: ObjectData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub properties: PropertyBag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Action>,
}

impl SceneObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: ObjectData::Empty,
            parent: None,
            transform: Transform::default(),
            properties: PropertyBag::new(),
            animation: None,
        }
    }

    pub fn is_animated(&self) -> bool {
        self.animation.is_some()
    }
}

/// The query interface the exporter needs from a host editor.
pub trait HostScene {
    fn settings(&self) -> SceneSettings;
    fn stage_settings(&self) -> &StageSettings;
    /// All objects in scene-list order.
    fn objects(&self) -> &[SceneObject];
    fn frame_current(&self) -> i64;
    fn frame_set(&mut self, frame: i64);

    fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects().iter().find(|o| o.name == name)
    }
}

/// Moves the frame cursor for the duration of an export and puts it back on drop,
/// including when the export bails out with an error.
pub struct FrameGuard<'a, S: HostScene + ?Sized> {
    scene: &'a mut S,
    saved: i64,
}

impl<'a, S: HostScene + ?Sized> FrameGuard<'a, S> {
    pub fn new(scene: &'a mut S, frame: i64) -> Self {
        let saved = scene.frame_current();
        scene.frame_set(frame);
        Self { scene, saved }
    }
}

impl<S: HostScene + ?Sized> Deref for FrameGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &*self.scene
    }
}

impl<S: HostScene + ?Sized> Drop for FrameGuard<'_, S> {
    fn drop(&mut self) {
        if self.scene.frame_current() != self.saved {
            log::debug!("Restoring scene frame {}", self.saved);
        }
        self.scene.frame_set(self.saved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_settings_reject_bad_frame_rate() {
        let settings = SceneSettings {
            fps: 0.0,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(ExportError::InvalidSceneSettings(_))));

        let settings = SceneSettings {
            frame_start: 10,
            frame_end: 5,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn range_seconds_includes_both_ends() {
        let settings = SceneSettings {
            fps: 60.0,
            frame_start: 0,
            frame_end: 59,
        };
        assert_eq!(1.0, settings.range_seconds());
    }

    #[test]
    fn frame_guard_restores_cursor() {
        let mut doc = SceneDocument::default();
        doc.frame_current = 42;
        {
            let guard = FrameGuard::new(&mut doc, 0);
            assert_eq!(0, guard.frame_current());
        }
        assert_eq!(42, doc.frame_current);
    }

    #[test]
    fn properties_deserialize_by_shape() {
        let bag: PropertyBag =
            serde_json::from_str(r#"{ "a": true, "b": 3, "c": 1.5, "d": "x", "e": [1.0, 2.0] }"#)
                .unwrap();
        assert_eq!(Some(&PropertyValue::Bool(true)), bag.get("a"));
        assert_eq!(Some(&PropertyValue::Int(3)), bag.get("b"));
        assert_eq!(Some(&PropertyValue::Float(1.5)), bag.get("c"));
        assert_eq!(Some(&PropertyValue::String("x".to_string())), bag.get("d"));
        assert_eq!(Some(&PropertyValue::Vector(vec![1.0, 2.0])), bag.get("e"));
    }
}
