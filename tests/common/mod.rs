#![allow(dead_code)]

use smb_stage_config::export::xml::{child_elements, find_child, get_element_text};
use smb_stage_config::scene::{
    Action, Channel, FCurve, Interpolation, KeyframePoint, ObjectData, SceneDocument, SceneObject,
};
use smb_stage_config::stage::ItemGroupAttributes;
use xmltree::Element;

pub fn empty(name: &str, parent: Option<&str>) -> SceneObject {
    let mut object = SceneObject::new(name);
    object.parent = parent.map(str::to_string);
    object
}

pub fn mesh(name: &str, parent: Option<&str>) -> SceneObject {
    let mut object = empty(name, parent);
    object.data = ObjectData::Mesh {
        name: name.to_string(),
    };
    object
}

pub fn item_group(name: &str, anim_id: i64) -> SceneObject {
    let mut object = empty(name, None);
    object.properties = ItemGroupAttributes::defaults(anim_id);
    object
}

pub fn wormhole(name: &str, parent: &str, wh_id: i64, linked_id: i64) -> SceneObject {
    let mut object = empty(name, Some(parent));
    object.properties.insert("whId", wh_id);
    object.properties.insert("linkedId", linked_id);
    object
}

/// Linear keys on one channel.
pub fn animate(object: &mut SceneObject, channel: Channel, keys: &[(f64, f64)]) {
    let points = keys
        .iter()
        .map(|(frame, value)| KeyframePoint::new(*frame, *value, Interpolation::Linear))
        .collect();
    object
        .animation
        .get_or_insert_with(Action::default)
        .fcurves
        .push(FCurve::new(channel, points));
}

pub fn scene(objects: Vec<SceneObject>) -> SceneDocument {
    SceneDocument {
        objects,
        ..Default::default()
    }
}

pub fn text(element: &Element, name: &str) -> Option<String> {
    find_child(element, name).and_then(get_element_text)
}

pub fn children<'a>(element: &'a Element, name: &str) -> Vec<&'a Element> {
    child_elements(element).filter(|c| c.name == name).collect()
}

pub fn child_names(element: &Element) -> Vec<&str> {
    child_elements(element).map(|c| c.name.as_str()).collect()
}

/// `(time, value)` of every keyframe under `animKeyframes/<channel>`.
pub fn keyframes(element: &Element, channel: &str) -> Vec<(f64, f64)> {
    let Some(channel) = find_child(element, "animKeyframes").and_then(|a| find_child(a, channel))
    else {
        return Vec::new();
    };
    child_elements(channel)
        .map(|k| {
            (
                k.attributes["time"].parse().unwrap(),
                k.attributes["value"].parse().unwrap(),
            )
        })
        .collect()
}
