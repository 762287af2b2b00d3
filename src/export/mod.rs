pub mod background;
pub mod config;
pub mod descriptors;
pub mod keyframes;
pub mod track_path;
pub mod xml;

pub use background::{build_background_document, export_background, write_background};
pub use config::{build_stage_config, export_stage_config, write_stage_config};
