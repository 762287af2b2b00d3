//! Export Super Monkey Ball stage scenes to stage config XML.
//!
//! Objects are recognized by bracketed name tags such as `[IG]` or `[GOAL_B]`, grouped under
//! their item groups, sampled for animation and written as a versioned `superMonkeyBallStage`
//! document for the stagedef compiler.

pub mod convert;
pub mod error;
pub mod export;
pub mod scene;
pub mod settings;
pub mod stage;
pub mod tools;

pub use error::{ExportError, Result};
pub use export::{
    build_background_document, build_stage_config, export_background, export_stage_config,
    write_background, write_stage_config,
};
pub use scene::{HostScene, SceneDocument, SceneObject};
pub use settings::{ExportConfig, StageSettings};
