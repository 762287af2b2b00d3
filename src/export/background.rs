//! Background-only documents, shared between stages.

use std::path::{Path, PathBuf};

use xmltree::Element;

use super::config::{append_background_import, Emitter};
use super::descriptors::{Descriptor, BACKGROUND, FOREGROUND};
use super::xml::{push_element, set_attribute, write_pretty};
use crate::error::Result;
use crate::scene::{FrameGuard, HostScene};
use crate::settings::{resolve_path, ExportConfig};
use crate::stage::classify::stage_object;
use crate::stage::{ObjectKind, StageObject};

pub const BACKGROUND_ROOT: &str = "superMonkeyBallBackground";
pub const BACKGROUND_VERSION: &str = "1.3.0";

/// Build a document holding only the scene's foreground and background models,
/// followed by the merged entries of the configured background import.
///
/// Other objects are never classified, so a broken switch elsewhere in the scene does not
/// prevent exporting its background.
pub fn build_background_document<S: HostScene + ?Sized>(
    scene: &S,
    config: &ExportConfig,
    base_dir: &Path,
) -> Result<Element> {
    let settings = scene.settings();
    settings.validate()?;
    config.validate()?;

    log::info!("Generating background/foreground config...");
    let mut decorations: Vec<StageObject> = Vec::new();
    for object in scene.objects() {
        if FOREGROUND.matches(&object.name) || BACKGROUND.matches(&object.name) {
            decorations.extend(stage_object(object)?);
        }
    }

    let mut root = Element::new(BACKGROUND_ROOT);
    set_attribute(&mut root, "version", BACKGROUND_VERSION);

    let emitter = Emitter::new(settings, scene.stage_settings(), config);
    for kind in [ObjectKind::ForegroundModel, ObjectKind::BackgroundModel] {
        for object in decorations.iter().filter(|o| o.kind == kind) {
            push_element(&mut root, emitter.emit_animated(object)?);
        }
    }
    log::info!("Exported {} background and foreground models", decorations.len());

    append_background_import(&mut root, scene, config, base_dir)?;
    Ok(root)
}

pub fn write_background(root: &Element, path: &Path) -> Result<()> {
    let text = write_pretty(root)?;
    std::fs::write(path, text)?;
    log::info!("Wrote background to {}", path.display());
    Ok(())
}

/// Export the background document to `config.background_path` and return the written path.
pub fn export_background<S: HostScene + ?Sized>(
    scene: &mut S,
    config: &ExportConfig,
    base_dir: &Path,
) -> Result<PathBuf> {
    let start = scene.settings().frame_start;
    let root = {
        let guard = FrameGuard::new(scene, start);
        build_background_document(&*guard, config, base_dir)?
    };

    let path = resolve_path(&config.background_path, base_dir);
    write_background(&root, &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::xml::{child_elements, find_child, get_element_text};
    use crate::scene::{SceneDocument, SceneObject};

    #[test]
    fn only_decorations_are_exported() {
        let mut doc = SceneDocument::default();
        doc.objects = vec![
            SceneObject::new("[BG] Ring [EXT:bg_ring]"),
            SceneObject::new("[SW_PLAY] Broken"),
            SceneObject::new("[START] Start"),
            SceneObject::new("[FG] Near"),
        ];
        let root = build_background_document(&doc, &doc.export, Path::new("/stages")).unwrap();

        assert_eq!(BACKGROUND_ROOT, root.name);
        assert_eq!(BACKGROUND_VERSION, root.attributes["version"]);
        let names: Vec<String> = child_elements(&root).map(|c| c.name.clone()).collect();
        assert_eq!(vec!["foregroundModel", "backgroundModel"], names);
        let background = child_elements(&root).nth(1).unwrap();
        assert_eq!(
            Some("bg_ring".to_string()),
            find_child(background, "name").and_then(get_element_text)
        );
    }

    #[test]
    fn export_writes_to_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = SceneDocument::default();
        doc.frame_current = 12;
        doc.objects = vec![SceneObject::new("[BG] Sky")];
        let config = doc.export.clone();

        let path = export_background(&mut doc, &config, dir.path()).unwrap();
        assert_eq!(dir.path().join("background.xml"), path);
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("<superMonkeyBallBackground version=\"1.3.0\">"));
        assert_eq!(12, doc.frame_current);
    }
}
