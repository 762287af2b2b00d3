mod common;

use std::path::Path;

use approx::assert_abs_diff_eq;
use common::*;
use smb_stage_config::export::config::STAGE_CONFIG_VERSION;
use smb_stage_config::export::xml::{find_child, write_pretty};
use smb_stage_config::scene::{Channel, SceneDocument};
use smb_stage_config::{build_stage_config, export_stage_config, ExportError};
use xmltree::Element;

fn build(doc: &SceneDocument) -> Result<Element, ExportError> {
    build_stage_config(doc, &doc.export, Path::new("/stages"))
}

fn minimal_stage() -> SceneDocument {
    scene(vec![
        item_group("[IG] Main", 4242),
        empty("[GOAL_B] Goal", Some("[IG] Main")),
        mesh("Floor", Some("[IG] Main")),
        empty("[START] Start", None),
    ])
}

#[test]
fn minimal_stage_scenario() {
    let root = build(&minimal_stage()).unwrap();
    assert_eq!("superMonkeyBallStage", root.name);
    assert_eq!(STAGE_CONFIG_VERSION, root.attributes["version"]);

    let groups = children(&root, "itemGroup");
    assert_eq!(2, groups.len());
    // The leading dummy group only has a collision grid
    assert_eq!(vec!["collisionGrid"], child_names(groups[0]));

    let main = groups[1];
    assert_eq!(Some("[IG] Main".to_string()), text(main, "name"));
    assert_eq!(Some("4242".to_string()), text(main, "animGroupId"));
    assert_eq!(Some("PLAY".to_string()), text(main, "animInitialState"));
    assert_eq!(Some("LOOPING_ANIMATION".to_string()), text(main, "animSeesawType"));
    // Default loop time is the scene range: 600 frames at 60 fps
    assert_eq!(Some("10.0".to_string()), text(main, "animLoopTime"));

    let goals = children(main, "goal");
    assert_eq!(1, goals.len());
    assert_eq!(Some("BLUE".to_string()), text(goals[0], "type"));
    assert_eq!(1, children(main, "stageModel").len());
    assert!(find_child(&root, "goal").is_none());
    assert_eq!(1, children(&root, "start").len());
}

#[test]
fn wormhole_pair_points_at_each_other() {
    let doc = scene(vec![
        item_group("[IG] Main", 1),
        wormhole("[WH] A", "[IG] Main", 11, 22),
        wormhole("[WH] B", "[IG] Main", 22, 11),
    ]);
    let root = build(&doc).unwrap();
    let main = children(&root, "itemGroup")[1];
    let wormholes = children(main, "wormhole");
    assert_eq!(2, wormholes.len());
    assert_eq!(Some("11".to_string()), text(wormholes[0], "name"));
    assert_eq!(Some("22".to_string()), text(wormholes[0], "destinationName"));
    assert_eq!(Some("22".to_string()), text(wormholes[1], "name"));
    assert_eq!(Some("11".to_string()), text(wormholes[1], "destinationName"));
}

#[test]
fn wormhole_links_by_object_name() {
    let mut a = wormhole("[WH] A", "[IG] Main", 11, 0);
    a.properties.insert("linkedObject", "[WH] B");
    let doc = scene(vec![
        item_group("[IG] Main", 1),
        a,
        wormhole("[WH] B", "[IG] Main", 22, 11),
    ]);
    let root = build(&doc).unwrap();
    let main = children(&root, "itemGroup")[1];
    assert_eq!(
        Some("22".to_string()),
        text(children(main, "wormhole")[0], "destinationName")
    );
}

#[test]
fn export_is_idempotent() {
    let mut doc = minimal_stage();
    let mut group = item_group("[IG] Moving", 7);
    animate(&mut group, Channel::PosX, &[(0.0, 0.0), (30.0, 3.0)]);
    doc.objects.push(group);

    let first = write_pretty(&build(&doc).unwrap()).unwrap();
    let second = write_pretty(&build(&doc).unwrap()).unwrap();
    assert_eq!(first, second);
    // Building never touches the scene
    assert_eq!(minimal_stage().objects[..], doc.objects[..4]);
}

#[test]
fn unlinked_switch_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = scene(vec![
        item_group("[IG] Main", 1),
        empty("[SW_PLAY] Lever", Some("[IG] Main")),
    ]);
    doc.frame_current = 37;
    let config = doc.export.clone();

    let err = export_stage_config(&mut doc, &config, dir.path()).unwrap_err();
    assert!(matches!(err, ExportError::UnlinkedReference { .. }));
    assert!(err.to_string().contains("[SW_PLAY] Lever"));
    assert!(!dir.path().join("config.xml").exists());
    assert_eq!(37, doc.frame_current);
}

#[test]
fn export_writes_and_restores_frame() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = minimal_stage();
    doc.frame_current = 120;
    let config = doc.export.clone();

    let path = export_stage_config(&mut doc, &config, dir.path()).unwrap();
    assert_eq!(dir.path().join("config.xml"), path);
    assert_eq!(120, doc.frame_current);

    let text = std::fs::read_to_string(&path).unwrap();
    let root = Element::parse(text.as_bytes()).unwrap();
    assert_eq!(Some("//model.obj".to_string()), common::text(&root, "modelImport"));
    assert_eq!(Some("MAIN_GAME".to_string()), common::text(&root, "stageType"));
}

#[test]
fn duplicate_wormhole_ids_are_rejected() {
    let doc = scene(vec![
        item_group("[IG] Main", 1),
        wormhole("[WH] A", "[IG] Main", 5, 5),
        wormhole("[WH] B", "[IG] Main", 5, 5),
    ]);
    let err = build(&doc).unwrap_err();
    assert!(matches!(err, ExportError::DuplicateId { id: 5, .. }));
}

#[test]
fn unknown_goal_tag_names_the_object() {
    let doc = scene(vec![
        item_group("[IG] Main", 1),
        empty("[GOAL_Q] Exit", Some("[IG] Main")),
    ]);
    let err = build(&doc).unwrap_err();
    assert!(matches!(err, ExportError::UnknownVariant { .. }));
    assert!(err.to_string().contains("[GOAL_Q] Exit"));
}

#[test]
fn animated_item_group_gets_all_channels() {
    let mut doc = scene(vec![item_group("[IG] Lift", 3)]);
    doc.scene.frame_end = 119;
    animate(&mut doc.objects[0], Channel::PosX, &[(0.0, 0.0), (60.0, 6.0)]);

    let root = build(&doc).unwrap();
    let lift = children(&root, "itemGroup")[1];
    let animation = find_child(lift, "animKeyframes").unwrap();
    assert_eq!(9, child_names(animation).len());

    let pos_x = keyframes(lift, "posX");
    assert_eq!((0.0, 0.0), pos_x[0]);
    assert!(pos_x.contains(&(1.0, 6.0)));
    // The held value after the last key collapses to its first and last sample
    let held: Vec<_> = pos_x.iter().filter(|(t, _)| *t >= 1.0).collect();
    assert_eq!(2, held.len());
    assert_abs_diff_eq!(119.0 / 60.0, held[1].0, epsilon = 1e-3);

    // Unanimated channels hold their static value from the anchor key on
    let scale = keyframes(lift, "scaleY");
    assert_eq!((0.0, 1.0), scale[0]);
    assert!(scale.iter().all(|(_, v)| *v == 1.0));
}

#[test]
fn loop_time_limits_the_sampled_range() {
    let mut group = item_group("[IG] Short", 3);
    group.properties.insert("animLoopTime", 0.5);
    animate(&mut group, Channel::PosX, &[(0.0, 0.0), (60.0, 6.0)]);
    let root = build(&scene(vec![group])).unwrap();

    let short = children(&root, "itemGroup")[1];
    assert_eq!(Some("0.5".to_string()), text(short, "animLoopTime"));
    let pos_x = keyframes(short, "posX");
    assert_eq!(30, pos_x.len());
    assert!(pos_x.iter().all(|(t, _)| *t < 0.5));
}

#[test]
fn full_bake_without_optimization() {
    let mut doc = scene(vec![item_group("[IG] Lift", 3)]);
    doc.scene.frame_end = 59;
    doc.export.optimize_keyframes = false;
    doc.export.timestep = 2;
    animate(&mut doc.objects[0], Channel::PosX, &[(0.0, 1.0), (10.0, 1.0)]);

    let root = build(&doc).unwrap();
    let lift = children(&root, "itemGroup")[1];
    // Frames 0, 2, .., 58 plus the explicit key on frame 10, which is already on the grid
    assert_eq!(30, keyframes(lift, "posX").len());
}

#[test]
fn static_and_animated_conversions_agree() {
    let mut group = item_group("[IG] Spinner", 3);
    group.transform.location = glam::DVec3::new(1.0, 2.0, 3.0);
    group.transform.rotation = glam::DVec3::new(0.1, 0.2, 0.3);
    // Animating one channel anchors the other eight at their static values
    animate(&mut group, Channel::ScaleX, &[(0.0, 1.0), (30.0, 2.0)]);
    let root = build(&scene(vec![group])).unwrap();
    let spinner = children(&root, "itemGroup")[1];

    let center = find_child(spinner, "rotationCenter").unwrap();
    let rotation = find_child(spinner, "initialRotation").unwrap();
    for (channel, element, axis) in [
        ("posX", center, "x"),
        ("posY", center, "y"),
        ("posZ", center, "z"),
        ("rotX", rotation, "x"),
        ("rotY", rotation, "y"),
        ("rotZ", rotation, "z"),
    ] {
        let static_value: f64 = element.attributes[axis].parse().unwrap();
        let first_key = keyframes(spinner, channel)[0].1;
        assert_abs_diff_eq!(static_value, first_key, epsilon = 1e-3);
    }
}

#[test]
fn unparented_objects_export_at_the_root() {
    let doc = scene(vec![
        empty("[START] Start", None),
        empty("[GOAL_B] Goal", None),
        empty("[BANANA_S] Banana", None),
        empty("[BUMPER] Bumper", None),
        mesh("Loose Floor", None),
        empty("Camera Target", None),
    ]);
    let root = build(&doc).unwrap();
    assert_eq!(
        vec![
            "modelImport",
            "stageType",
            "falloutPlane",
            "itemGroup",
            "start",
            "goal",
            "banana",
            "bumper",
            "stageModel"
        ],
        child_names(&root)
    );
    let goal = children(&root, "goal")[0];
    assert_eq!(Some("BLUE".to_string()), text(goal, "type"));
    assert_eq!(Some("SINGLE".to_string()), text(children(&root, "banana")[0], "type"));
}

#[test]
fn root_switch_must_still_be_linked() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = scene(vec![empty("[SW_PLAY] Lever", None)]);
    let config = doc.export.clone();
    let err = export_stage_config(&mut doc, &config, dir.path()).unwrap_err();
    assert!(err.to_string().contains("[SW_PLAY] Lever"));
    assert!(!dir.path().join("config.xml").exists());

    let mut lever = empty("[SW_PLAY] Lever", None);
    lever.properties.insert("linkedObject", "[IG] Main");
    let root = build(&scene(vec![item_group("[IG] Main", 77), lever])).unwrap();
    let switch = children(&root, "switch")[0];
    assert_eq!(Some("77".to_string()), text(switch, "animGroupId"));
}
