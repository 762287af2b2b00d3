//! The stage config document: header, dummy item group, root objects and item groups.

use std::path::{Path, PathBuf};

use xmltree::Element;

use super::descriptors::{grid_vector, EmitContext};
use super::keyframes::{ResolvedAnimation, SamplingPolicy, LINEAR_EASING};
use super::xml::{format_float, keyframe_element, push_element, push_text, set_attribute, write_pretty};
use crate::convert::background::merge_background;
use crate::error::Result;
use crate::scene::{FrameGuard, HostScene, SceneSettings};
use crate::settings::{resolve_path, ExportConfig, FogSettings, StageSettings};
use crate::stage::{build_stage_graph, ObjectKind, StageObject};

pub const STAGE_CONFIG_ROOT: &str = "superMonkeyBallStage";
pub const STAGE_CONFIG_VERSION: &str = "1.3.0";

/// Everything needed to emit one object in its place in the document.
pub(super) struct Emitter<'a> {
    scene: SceneSettings,
    stage: &'a StageSettings,
    policy: SamplingPolicy,
}

impl<'a> Emitter<'a> {
    pub(super) fn new(scene: SceneSettings, stage: &'a StageSettings, config: &ExportConfig) -> Self {
        Self {
            scene,
            stage,
            policy: SamplingPolicy::new(&scene, config),
        }
    }

    /// Emit a root object or item group. Item groups and decorations carry their own animation.
    pub(super) fn emit_animated(&self, object: &StageObject) -> Result<Element> {
        let animation = if object.kind == ObjectKind::ItemGroup || object.kind.is_decoration() {
            let policy = self
                .policy
                .for_object(object.attributes.loop_time(), object.attributes.export_timestep());
            ResolvedAnimation::sample(object.source, &policy)
        } else {
            None
        };
        let context = EmitContext {
            scene: self.scene,
            stage: self.stage,
            animation: animation.as_ref(),
            group: None,
        };
        object.descriptor.emit(object, &context)
    }

    fn emit_child(&self, object: &StageObject, group: &StageObject) -> Result<Element> {
        let context = EmitContext {
            scene: self.scene,
            stage: self.stage,
            animation: None,
            group: group.item_group(),
        };
        object.descriptor.emit(object, &context)
    }
}

/// Build the stage config document for a scene.
///
/// The scene is only read. Animated values come from the curves, so the frame cursor
/// does not need to move; [`export_stage_config`] still pins it for the duration of the export.
pub fn build_stage_config<S: HostScene + ?Sized>(
    scene: &S,
    config: &ExportConfig,
    base_dir: &Path,
) -> Result<Element> {
    let settings = scene.settings();
    settings.validate()?;
    config.validate()?;
    let stage = scene.stage_settings();

    log::info!("Generating stage config...");
    let graph = build_stage_graph(scene.objects())?;

    let mut root = Element::new(STAGE_CONFIG_ROOT);
    set_attribute(&mut root, "version", STAGE_CONFIG_VERSION);
    push_text(&mut root, "modelImport", model_import(&config.model_path));
    push_text(&mut root, "stageType", &stage.game_mode);

    let mut fallout = Element::new("falloutPlane");
    set_attribute(&mut fallout, "y", format_float(stage.fallout_plane));
    push_element(&mut root, fallout);

    if stage.fog.enabled() {
        push_fog(&mut root, &stage.fog);
    }

    // The first item group is not usable in game
    let mut dummy = Element::new("itemGroup");
    let mut grid = Element::new("collisionGrid");
    push_element(&mut grid, grid_vector("start", "-256".to_string(), "-256".to_string()));
    push_element(&mut grid, grid_vector("step", "32".to_string(), "32".to_string()));
    push_element(&mut grid, grid_vector("count", "16".to_string(), "16".to_string()));
    push_element(&mut dummy, grid);
    push_element(&mut root, dummy);

    let emitter = Emitter::new(settings, stage, config);

    // Foreground and background models lead the root objects
    for kind in [ObjectKind::ForegroundModel, ObjectKind::BackgroundModel] {
        for object in graph.root_objects_of(kind) {
            push_element(&mut root, emitter.emit_animated(object)?);
        }
    }
    for object in graph.root_objects.iter().filter(|o| !o.kind.is_decoration()) {
        push_element(&mut root, emitter.emit_animated(object)?);
    }

    for node in &graph.item_groups {
        let mut group = emitter.emit_animated(&node.group)?;
        for child in &node.children {
            push_element(&mut group, emitter.emit_child(child, &node.group)?);
        }
        push_element(&mut root, group);
    }

    append_background_import(&mut root, scene, config, base_dir)?;
    Ok(root)
}

/// Append the entries of the configured background import, updated from their proxies.
pub(super) fn append_background_import<S: HostScene + ?Sized>(
    root: &mut Element,
    scene: &S,
    config: &ExportConfig,
    base_dir: &Path,
) -> Result<()> {
    let Some(import_path) = config
        .background_import_path
        .as_deref()
        .filter(|path| !path.is_empty())
    else {
        return Ok(());
    };

    let path = resolve_path(import_path, base_dir);
    let entries = merge_background(&path, scene.objects(), config.background_import_preview)?;
    log::info!("Merged {} background entries from {}", entries.len(), path.display());
    for entry in entries {
        push_element(root, entry);
    }
    Ok(())
}

/// Relative paths are passed through for the stagedef compiler to resolve.
fn model_import(model_path: &str) -> String {
    if model_path.starts_with("//") {
        model_path.to_string()
    } else {
        format!("file://{}", model_path)
    }
}

fn push_fog(root: &mut Element, fog: &FogSettings) {
    let [red, green, blue] = fog.color;
    let values = [
        ("start", fog.start),
        ("end", fog.end),
        ("red", red),
        ("green", green),
        ("blue", blue),
    ];

    let mut element = Element::new("fog");
    push_text(&mut element, "type", fog.fog_type);
    for (name, value) in values {
        push_text(&mut element, name, format_float(value));
    }
    push_element(root, element);

    // Fog only takes effect with at least one animation keyframe
    let mut animation = Element::new("fogAnimationKeyframes");
    for (name, value) in values {
        let mut channel = Element::new(name);
        push_element(&mut channel, keyframe_element(0.0, value, LINEAR_EASING));
        push_element(&mut animation, channel);
    }
    push_element(root, animation);
}

/// Write a finished document. Nothing touches the disk until serialization succeeded.
pub fn write_stage_config(root: &Element, path: &Path) -> Result<()> {
    let text = write_pretty(root)?;
    std::fs::write(path, text)?;
    log::info!("Wrote stage config to {}", path.display());
    Ok(())
}

/// Export the scene's stage config to `config.config_path` and return the written path.
///
/// The frame cursor is moved to the start frame and restored on every exit path.
pub fn export_stage_config<S: HostScene + ?Sized>(
    scene: &mut S,
    config: &ExportConfig,
    base_dir: &Path,
) -> Result<PathBuf> {
    let start = scene.settings().frame_start;
    let root = {
        let guard = FrameGuard::new(scene, start);
        build_stage_config(&*guard, config, base_dir)?
    };

    let path = resolve_path(&config.config_path, base_dir);
    write_stage_config(&root, &path)?;
    Ok(path)
}
