//! Small helpers over `xmltree` shared by the stage and background writers.

use glam::DVec3;
use xmltree::{Element, EmitterConfig, XMLNode};

use crate::error::Result;

pub fn push_element(parent: &mut Element, child: Element) {
    parent.children.push(XMLNode::Element(child));
}

pub fn text_element(name: &str, text: impl ToString) -> Element {
    let mut element = Element::new(name);
    element.children.push(XMLNode::Text(text.to_string()));
    element
}

pub fn push_text(parent: &mut Element, name: &str, text: impl ToString) {
    push_element(parent, text_element(name, text));
}

pub fn set_attribute(element: &mut Element, key: &str, value: impl ToString) {
    element.attributes.insert(key.to_string(), value.to_string());
}

/// `<name x=".." y=".." z=".."/>`
pub fn vector_element(name: &str, v: DVec3) -> Element {
    let mut element = Element::new(name);
    set_attribute(&mut element, "x", format_float(v.x));
    set_attribute(&mut element, "y", format_float(v.y));
    set_attribute(&mut element, "z", format_float(v.z));
    element
}

pub fn keyframe_element(time: f64, value: f64, easing: &str) -> Element {
    let mut keyframe = Element::new("keyframe");
    set_attribute(&mut keyframe, "time", format_float(time));
    set_attribute(&mut keyframe, "value", format_float(value));
    set_attribute(&mut keyframe, "easing", easing);
    keyframe
}

/// Shortest round-trip decimal, always with a fractional part ("1.0", "0.25", "-256.0").
pub fn format_float(v: f64) -> String {
    if v == 0.0 {
        // Also folds -0.0
        "0.0".to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

pub fn find_child<'a>(element: &'a Element, name: &str) -> Option<&'a Element> {
    element.children.iter().find_map(|node| match node {
        XMLNode::Element(child) if child.name == name => Some(child),
        _ => None,
    })
}

pub fn find_child_mut<'a>(element: &'a mut Element, name: &str) -> Option<&'a mut Element> {
    element.children.iter_mut().find_map(|node| match node {
        XMLNode::Element(child) if child.name == name => Some(child),
        _ => None,
    })
}

pub fn find_all_children<'a>(element: &'a Element, name: &str) -> Vec<&'a Element> {
    child_elements(element)
        .filter(|child| child.name == name)
        .collect()
}

pub fn child_elements(element: &Element) -> impl Iterator<Item = &Element> {
    element.children.iter().filter_map(|node| match node {
        XMLNode::Element(child) => Some(child),
        _ => None,
    })
}

pub fn child_elements_mut(element: &mut Element) -> impl Iterator<Item = &mut Element> {
    element.children.iter_mut().filter_map(|node| match node {
        XMLNode::Element(child) => Some(child),
        _ => None,
    })
}

pub fn get_element_text(element: &Element) -> Option<String> {
    element.children.iter().find_map(|node| match node {
        XMLNode::Text(text) => Some(text.trim().to_string()),
        _ => None,
    })
}

/// Serialize with an XML declaration and two-space indentation.
pub fn write_pretty(root: &Element) -> Result<String> {
    let mut buffer = Vec::new();
    let config = EmitterConfig::new()
        .perform_indent(true)
        .indent_string("  ");
    root.write_with_config(&mut buffer, config)?;
    buffer.push(b'\n');
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_keep_a_fractional_part() {
        assert_eq!("0.0", format_float(0.0));
        assert_eq!("0.0", format_float(-0.0));
        assert_eq!("-256.0", format_float(-256.0));
        assert_eq!("0.017", format_float(0.017));
        assert_eq!("1.5", format_float(1.5));
        assert_eq!("-10.0", format_float(-10.0));
    }

    #[test]
    fn vector_attributes_keep_insertion_order() {
        let mut root = Element::new("root");
        push_element(&mut root, vector_element("position", DVec3::new(1.0, 2.0, 3.0)));
        let text = write_pretty(&root).unwrap();
        assert!(text.contains(r#"<position x="1.0" y="2.0" z="3.0""#));
    }

    #[test]
    fn child_lookup_skips_text_nodes() {
        let mut root = Element::new("root");
        push_text(&mut root, "name", " Goal ");
        push_text(&mut root, "name", "Second");
        let first = find_child(&root, "name").unwrap();
        assert_eq!(Some("Goal".to_string()), get_element_text(first));
        assert_eq!(2, find_all_children(&root, "name").len());
        assert!(find_child(&root, "missing").is_none());
    }
}
