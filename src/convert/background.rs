//! Previously exported background documents: loading, proxy import and merging.
//!
//! Importing turns every entry into an empty proxy object named after the entry, so it can be
//! moved around in the scene. Merging reads the proxies back and rewrites the entries.

use std::path::Path;

use glam::DVec3;
use xmltree::Element;

use super::coords::{
    from_target_position, from_target_rotation, from_target_scale, to_target_position,
    to_target_rotation, to_target_scale,
};
use crate::error::{ExportError, Result};
use crate::export::background::BACKGROUND_ROOT;
use crate::export::xml::{
    child_elements, child_elements_mut, find_child, find_child_mut, format_float, get_element_text,
    set_attribute,
};
use crate::scene::{ObjectData, SceneDocument, SceneObject, Transform};

/// Shared prefix of entry and effect proxy names.
pub const PROXY_PREFIX: &str = "[EXT_IMPORTED";

const ENTRY_TAGS: [&str; 2] = ["backgroundModel", "foregroundModel"];

/// Name of the proxy object for entry `index`.
pub fn proxy_name(name: &str, index: usize) -> String {
    format!("[EXT_IMPORTED:{}:{}]", name, index)
}

/// Name of the proxy object for keyframe `keyframe` of the `effect_type` list of entry `index`.
/// Both effect lists count from 0, so the list name is part of the key.
pub fn effect_proxy_name(name: &str, index: usize, effect_type: &str, keyframe: usize) -> String {
    format!("[EXT_IMPORTED_FX:{}:{}:{}:{}]", name, index, effect_type, keyframe)
}

/// Read a background document, rejecting anything that is not an exported background.
pub fn load_background(path: &Path) -> Result<Element> {
    if !path.exists() {
        return Err(ExportError::MissingBackground(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    let root = Element::parse(std::io::BufReader::new(file))?;
    if root.name != BACKGROUND_ROOT {
        return Err(ExportError::BackgroundDocument {
            path: path.to_path_buf(),
            root: root.name,
        });
    }
    Ok(root)
}

/// Model entries paired with their position in the document, which is part of the proxy name.
fn entries(root: &Element) -> impl Iterator<Item = (usize, &Element)> {
    child_elements(root).enumerate().filter(|(index, entry)| {
        let known = ENTRY_TAGS.contains(&entry.name.as_str());
        if !known {
            log::warn!("Skipping background entry {} <{}>", index, entry.name);
        }
        known
    })
}

fn malformed(index: usize, reason: impl Into<String>) -> ExportError {
    ExportError::MalformedBackgroundEntry {
        index,
        reason: reason.into(),
    }
}

fn entry_name(entry: &Element, index: usize) -> Result<String> {
    find_child(entry, "name")
        .and_then(get_element_text)
        .ok_or_else(|| malformed(index, "missing <name>"))
}

fn parse_number(element: &Element, key: &str, index: usize) -> Result<f64> {
    let text = element
        .attributes
        .get(key)
        .ok_or_else(|| malformed(index, format!("<{}> has no '{}'", element.name, key)))?;
    text.trim().parse().map_err(|_| {
        malformed(
            index,
            format!("<{}> {}=\"{}\" is not a number", element.name, key, text),
        )
    })
}

fn read_vector(entry: &Element, name: &str, index: usize) -> Result<DVec3> {
    let element =
        find_child(entry, name).ok_or_else(|| malformed(index, format!("missing <{}>", name)))?;
    Ok(DVec3::new(
        parse_number(element, "x", index)?,
        parse_number(element, "y", index)?,
        parse_number(element, "z", index)?,
    ))
}

fn write_vector(entry: &mut Element, name: &str, v: DVec3) {
    if let Some(element) = find_child_mut(entry, name) {
        set_attribute(element, "x", format_float(v.x));
        set_attribute(element, "y", format_float(v.y));
        set_attribute(element, "z", format_float(v.z));
    }
}

fn read_triple(element: &Element, keys: [&str; 3], index: usize) -> Result<DVec3> {
    Ok(DVec3::new(
        parse_number(element, keys[0], index)?,
        parse_number(element, keys[1], index)?,
        parse_number(element, keys[2], index)?,
    ))
}

const EFFECT_POSITION: [&str; 3] = ["posX", "posY", "posZ"];
const EFFECT_ROTATION: [&str; 3] = ["rotX", "rotY", "rotZ"];

fn proxy(name: String, transform: Transform) -> SceneObject {
    let mut object = SceneObject::new(name);
    object.data = ObjectData::Empty;
    object.transform = transform;
    object
}

/// Add a proxy object for every entry and effect keyframe of `root` to the document,
/// replacing proxies left over from an earlier import. Returns the number of proxies.
pub fn import_background(doc: &mut SceneDocument, root: &Element) -> Result<usize> {
    let mut count = 0;
    for (index, entry) in entries(root) {
        let name = entry_name(entry, index)?;
        log::debug!("Importing model {}", name);

        let transform = Transform {
            location: from_target_position(read_vector(entry, "position", index)?),
            rotation: from_target_rotation(read_vector(entry, "rotation", index)?),
            scale: from_target_scale(read_vector(entry, "scale", index)?),
        };
        doc.upsert_object(proxy(proxy_name(&name, index), transform));
        count += 1;

        let Some(effects) = find_child(entry, "effectKeyframes") else {
            continue;
        };
        for effect in child_elements(effects) {
            let with_rotation = match effect.name.as_str() {
                "effectType1" => true,
                "effectType2" => false,
                _ => continue,
            };
            for (j, keyframe) in child_elements(effect).enumerate() {
                let rotation = if with_rotation {
                    from_target_rotation(read_triple(keyframe, EFFECT_ROTATION, index)?)
                } else {
                    DVec3::ZERO
                };
                let transform = Transform {
                    location: from_target_position(read_triple(keyframe, EFFECT_POSITION, index)?),
                    rotation,
                    scale: DVec3::ONE,
                };
                doc.upsert_object(proxy(
                    effect_proxy_name(&name, index, &effect.name, j),
                    transform,
                ));
                count += 1;
            }
        }
    }

    log::info!("Imported {} background proxies", count);
    Ok(count)
}

/// Load the background at `path` and return its entries updated from their proxies.
pub fn merge_background(path: &Path, objects: &[SceneObject], preview: bool) -> Result<Vec<Element>> {
    let root = load_background(path)?;
    merge_entries(&root, objects, preview)
}

/// Rewrite every entry whose proxy still exists with the proxy's current transform.
///
/// Keyframe values follow the proxy: positions and rotations are shifted by the change of
/// the static transform, scales are multiplied by its ratio. Entries without a proxy, and
/// every entry when `preview` is off, are returned unchanged.
pub fn merge_entries(root: &Element, objects: &[SceneObject], preview: bool) -> Result<Vec<Element>> {
    let find = |name: &str| objects.iter().find(|o| o.name == name);

    let mut merged = Vec::new();
    for (index, entry) in entries(root) {
        let mut entry = entry.clone();
        if !preview {
            merged.push(entry);
            continue;
        }

        let name = entry_name(&entry, index)?;
        let Some(proxy) = find(&proxy_name(&name, index)) else {
            log::warn!(
                "No proxy for background entry {} ({}), keeping it as exported",
                index,
                name
            );
            merged.push(entry);
            continue;
        };
        log::debug!("Exporting imported background object {}", proxy.name);

        let original = [
            read_vector(&entry, "position", index)?,
            read_vector(&entry, "rotation", index)?,
            read_vector(&entry, "scale", index)?,
        ];
        let current = [
            to_target_position(proxy.transform.location),
            to_target_rotation(proxy.transform.rotation),
            to_target_scale(proxy.transform.scale),
        ];
        write_vector(&mut entry, "position", current[0]);
        write_vector(&mut entry, "rotation", current[1]);
        write_vector(&mut entry, "scale", current[2]);

        if let Some(effects) = find_child_mut(&mut entry, "effectKeyframes") {
            for effect in child_elements_mut(effects) {
                let with_rotation = match effect.name.as_str() {
                    "effectType1" => true,
                    "effectType2" => false,
                    _ => continue,
                };
                let effect_type = effect.name.clone();
                for (j, keyframe) in child_elements_mut(effect).enumerate() {
                    let Some(effect_proxy) = find(&effect_proxy_name(&name, index, &effect_type, j))
                    else {
                        continue;
                    };
                    let location = to_target_position(effect_proxy.transform.location);
                    for (key, value) in EFFECT_POSITION.iter().zip(location.to_array()) {
                        set_attribute(keyframe, key, format_float(value));
                    }
                    if with_rotation {
                        let rotation = to_target_rotation(effect_proxy.transform.rotation);
                        for (key, value) in EFFECT_ROTATION.iter().zip(rotation.to_array()) {
                            set_attribute(keyframe, key, format_float(value));
                        }
                    }
                }
            }
        }

        if let Some(animation) = find_child_mut(&mut entry, "animKeyframes") {
            let position_delta = current[0] - original[0];
            let rotation_delta = current[1] - original[1];
            let scale_ratio = DVec3::from_array(std::array::from_fn(|axis| {
                if approx::abs_diff_eq!(original[2][axis], 0.0) {
                    1.0
                } else {
                    current[2][axis] / original[2][axis]
                }
            }));
            shift_keyframes(animation, position_delta, rotation_delta, scale_ratio, index)?;
        }

        merged.push(entry);
    }
    Ok(merged)
}

fn shift_keyframes(
    animation: &mut Element,
    position_delta: DVec3,
    rotation_delta: DVec3,
    scale_ratio: DVec3,
    index: usize,
) -> Result<()> {
    for channel in child_elements_mut(animation) {
        let name = channel.name.as_str();
        let Some(axis) = ["X", "Y", "Z"].iter().position(|a| name.ends_with(a)) else {
            continue;
        };
        let apply: Box<dyn Fn(f64) -> f64> = match &name[..name.len() - 1] {
            "pos" => Box::new(move |v| v + position_delta[axis]),
            "rot" => Box::new(move |v| v + rotation_delta[axis]),
            "scale" => Box::new(move |v| v * scale_ratio[axis]),
            _ => continue,
        };
        for keyframe in child_elements_mut(channel) {
            let value = parse_number(keyframe, "value", index)?;
            set_attribute(keyframe, "value", format_float(apply(value)));
        }
    }
    Ok(())
}
