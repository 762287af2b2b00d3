use std::path::PathBuf;

use thiserror::Error;

/// Everything that can abort a stage export.
///
/// Object-level variants always carry the host object name so the user can find it.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Object '{object}' has an unknown {category} tag (expected one of {expected})")]
    UnknownVariant {
        object: String,
        category: &'static str,
        expected: &'static str,
    },
    #[error("{kind} '{object}' is not linked to a {target}")]
    UnlinkedReference {
        object: String,
        kind: &'static str,
        target: &'static str,
    },
    #[error("{kind} '{object}' links to {target} id {id}, but no {target} in the scene has that id")]
    UnresolvedReference {
        object: String,
        kind: &'static str,
        target: &'static str,
        id: i64,
    },
    #[error("{id_name} {id} is used by both '{first}' and '{second}'")]
    DuplicateId {
        id_name: &'static str,
        id: i64,
        first: String,
        second: String,
    },
    #[error("Track path '{object}' has {count} points, at most {max} are allowed")]
    TrackPathTooLong {
        object: String,
        count: usize,
        max: usize,
    },
    #[error("Track path '{object}' has {count} points, at least 2 are needed")]
    TrackPathTooShort { object: String, count: usize },
    #[error("Object '{object}' is missing required attribute '{attribute}'")]
    MissingAttribute { object: String, attribute: String },
    #[error("Object '{object}' has invalid attribute '{attribute}': {reason}")]
    InvalidAttribute {
        object: String,
        attribute: String,
        reason: String,
    },
    #[error("Every id from {min} to {max} is already in use")]
    IdsExhausted { min: i64, max: i64 },
    #[error("Scene has no object named '{0}'")]
    MissingObject(String),
    #[error("An object named '{0}' already exists")]
    DuplicateObject(String),
    #[error("'{0}' is not an item group")]
    NotAnItemGroup(String),
    #[error("Invalid scene settings: {0}")]
    InvalidSceneSettings(String),
    #[error("Invalid export configuration: {0}")]
    InvalidConfig(String),
    #[error("'{}' is not an exported background (root element is '{root}')", path.display())]
    BackgroundDocument { path: PathBuf, root: String },
    #[error("Background file '{}' does not exist", .0.display())]
    MissingBackground(PathBuf),
    #[error("Background entry {index} is malformed: {reason}")]
    MalformedBackgroundEntry { index: usize, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error serializing or deserializing json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to parse XML: {0}")]
    XmlParse(#[from] xmltree::ParseError),
    #[error("Failed to write XML: {0}")]
    XmlWrite(#[from] xmltree::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;

impl ExportError {
    pub(crate) fn missing(object: &str, attribute: &str) -> Self {
        ExportError::MissingAttribute {
            object: object.to_string(),
            attribute: attribute.to_string(),
        }
    }

    pub(crate) fn invalid(object: &str, attribute: &str, reason: impl Into<String>) -> Self {
        ExportError::InvalidAttribute {
            object: object.to_string(),
            attribute: attribute.to_string(),
            reason: reason.into(),
        }
    }
}
