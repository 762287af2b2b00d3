mod common;

use std::path::Path;
use std::process::Command;

use common::*;
use smb_stage_config::scene::SceneDocument;
use smb_stage_config::stage::edit::{add_object, edit_collision_grid, GridEdit};
use smb_stage_config::stage::CollisionGrid;
use smb_stage_config::{export_stage_config, ExportError};
use xmltree::Element;

fn read_config(path: &Path) -> Element {
    let text = std::fs::read_to_string(path).unwrap();
    Element::parse(text.as_bytes()).unwrap()
}

fn grid_element(group: &Element) -> [String; 6] {
    let grid = smb_stage_config::export::xml::find_child(group, "collisionGrid").unwrap();
    let start = smb_stage_config::export::xml::find_child(grid, "start").unwrap();
    let step = smb_stage_config::export::xml::find_child(grid, "step").unwrap();
    let count = smb_stage_config::export::xml::find_child(grid, "count").unwrap();
    [
        start.attributes["x"].clone(),
        start.attributes["z"].clone(),
        step.attributes["x"].clone(),
        step.attributes["z"].clone(),
        count.attributes["x"].clone(),
        count.attributes["z"].clone(),
    ]
}

#[test]
fn authored_stage_exports() {
    let dir = tempfile::tempdir().unwrap();
    let scene_path = dir.path().join("stage.json");
    let mut doc = scene(Vec::new());
    add_object(&mut doc, "[IG] Platform", None).unwrap();
    add_object(&mut doc, "[GOAL_R] Exit", Some("[IG] Platform")).unwrap();
    add_object(&mut doc, "[WH] A", Some("[IG] Platform")).unwrap();
    add_object(&mut doc, "[WH] B", Some("[IG] Platform")).unwrap();
    add_object(&mut doc, "[START] Start", None).unwrap();
    for (from, to) in [("[WH] A", "[WH] B"), ("[WH] B", "[WH] A")] {
        doc.object_mut(from)
            .unwrap()
            .properties
            .insert("linkedObject", to);
    }
    edit_collision_grid(&mut doc, "[IG] Platform", GridEdit::Subdivide).unwrap();
    doc.save(&scene_path).unwrap();

    let mut doc = SceneDocument::from_json_file(&scene_path).unwrap();
    let config = doc.export.clone();
    let root = read_config(&export_stage_config(&mut doc, &config, dir.path()).unwrap());

    let platform = children(&root, "itemGroup")[1];
    assert_eq!(Some("[IG] Platform".to_string()), text(platform, "name"));
    assert_eq!(Some("RED".to_string()), text(children(platform, "goal")[0], "type"));
    assert_eq!(["-256.0", "-256.0", "16.0", "16.0", "32", "32"], grid_element(platform));

    // The allocated ids survive the scene round trip and link the pair
    let wormholes = children(platform, "wormhole");
    assert_eq!(2, wormholes.len());
    assert_eq!(text(wormholes[0], "name"), text(wormholes[1], "destinationName"));
    assert_eq!(text(wormholes[1], "name"), text(wormholes[0], "destinationName"));
    assert_ne!(text(wormholes[0], "name"), text(platform, "animGroupId"));
}

#[test]
fn refused_unsubdivide_keeps_the_grid() {
    let mut doc = scene(vec![item_group("[IG] Main", 1)]);
    doc.object_mut("[IG] Main")
        .unwrap()
        .properties
        .insert("collisionStepCountX", 1i64);
    let before = CollisionGrid::from_object(&doc.objects[0]).unwrap();
    let after = edit_collision_grid(&mut doc, "[IG] Main", GridEdit::Unsubdivide).unwrap();
    assert_eq!(before, after);
}

#[test]
fn negative_step_count_blocks_grid_edits_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = scene(vec![item_group("[IG] Main", 1)]);
    doc.object_mut("[IG] Main")
        .unwrap()
        .properties
        .insert("collisionStepCountY", -16i64);

    let err = edit_collision_grid(&mut doc, "[IG] Main", GridEdit::Subdivide).unwrap_err();
    assert!(matches!(err, ExportError::InvalidAttribute { .. }));
    assert!(err.to_string().contains("[IG] Main"));

    let config = doc.export.clone();
    assert!(export_stage_config(&mut doc, &config, dir.path()).is_err());
    assert!(!dir.path().join("config.xml").exists());
}

fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_smb_stage_config"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

#[test]
fn cli_add_and_grid_edit_the_scene_file() {
    let dir = tempfile::tempdir().unwrap();
    let scene_path = dir.path().join("stage.json");
    scene(Vec::new()).save(&scene_path).unwrap();
    let path = scene_path.to_str().unwrap();

    assert!(run(&["add", path, "[IG] Platform"]).status.success());
    assert!(run(&["add", path, "[IG] Other"]).status.success());
    assert!(run(&["add", path, "[BANANA_B] Bunch", "--parent", "[IG] Platform"]).status.success());
    assert!(run(&["grid", path, "subdivide", "[IG] Platform"]).status.success());
    assert!(run(&["grid", path, "copy", "[IG] Other", "--from", "[IG] Platform"]).status.success());
    assert!(run(&["grid", path, "fit", "[IG] Platform", "--margin", "0"]).status.success());

    let doc = SceneDocument::from_json_file(&scene_path).unwrap();
    assert_eq!(3, doc.objects.len());
    assert_eq!(Some("[IG] Platform"), doc.objects[2].parent.as_deref());

    // The group and its banana both sit at the origin: a 10 by 10 square
    let platform = CollisionGrid::from_object(&doc.objects[0]).unwrap();
    assert_eq!([32, 32], platform.count);
    assert_eq!(-5.0, platform.start.x);
    assert_eq!(-5.0, platform.start.y);
    assert_eq!(10.0 / 32.0, platform.step.x);

    let other = CollisionGrid::from_object(&doc.objects[1]).unwrap();
    assert_eq!([32, 32], other.count);
    assert_eq!(16.0, other.step.x);
}

#[test]
fn cli_rejects_bad_edits_without_touching_the_scene() {
    let dir = tempfile::tempdir().unwrap();
    let scene_path = dir.path().join("stage.json");
    scene(vec![empty("[START] Start", None)]).save(&scene_path).unwrap();
    let before = std::fs::read_to_string(&scene_path).unwrap();
    let path = scene_path.to_str().unwrap();

    assert!(!run(&["add", path, "Camera Target"]).status.success());
    assert!(!run(&["add", path, "[START] Start"]).status.success());
    assert!(!run(&["grid", path, "subdivide", "[START] Start"]).status.success());
    assert!(!run(&["grid", path, "copy", "[START] Start"]).status.success());
    assert!(!run(&["grid", path, "twist", "[START] Start"]).status.success());
    assert_eq!(before, std::fs::read_to_string(&scene_path).unwrap());
}
