//! Authoring edits: creating tagged objects and adjusting item group collision grids.

use glam::DVec2;

use super::attributes::{CollisionGrid, IdAllocator};
use super::classify::classify;
use super::ObjectKind;
use crate::error::{ExportError, Result};
use crate::scene::{SceneDocument, SceneObject};

/// Scene objects carry no vertices, so each one counts as a square of this half size.
pub const FOOTPRINT_HALF_SIZE: f64 = 5.0;

pub const DEFAULT_FIT_MARGIN: f64 = 50.0;

/// Create an empty for the kind its name is tagged with and give it that kind's default
/// attributes. Item groups and wormholes get ids no other object in the scene uses.
pub fn add_object(doc: &mut SceneDocument, name: &str, parent: Option<&str>) -> Result<ObjectKind> {
    if find(doc, name).is_some() {
        return Err(ExportError::DuplicateObject(name.to_string()));
    }
    if let Some(parent) = parent {
        find(doc, parent).ok_or_else(|| ExportError::MissingObject(parent.to_string()))?;
    }
    let (descriptor, kind) = classify(name, false)?.ok_or_else(|| ExportError::UnknownVariant {
        object: name.to_string(),
        category: "stage object",
        expected: "[IG], [START], [GOAL_B], [BANANA_S], [BUMPER], [SW_PLAY], [WH], [BG], [FG]",
    })?;

    let mut ids = IdAllocator::from_objects(&doc.objects);
    let mut object = SceneObject::new(name);
    object.parent = parent.map(str::to_string);
    object.properties = descriptor.default_attributes(&mut ids)?;
    doc.objects.push(object);

    log::info!("Added {} '{}'", kind, name);
    Ok(kind)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridEdit<'a> {
    Subdivide,
    /// Does nothing when either axis is down to a single cell.
    Unsubdivide,
    /// Cover the group and its children plus `margin_percent` of their extent.
    Fit { margin_percent: f64 },
    /// Take over the grid of another item group.
    CopyFrom(&'a str),
}

/// Apply `edit` to the collision grid of item group `group` and store the result on the object.
pub fn edit_collision_grid(
    doc: &mut SceneDocument,
    group: &str,
    edit: GridEdit,
) -> Result<CollisionGrid> {
    let mut grid = CollisionGrid::from_object(item_group(doc, group)?)?;
    match edit {
        GridEdit::Subdivide => grid.subdivide(group)?,
        GridEdit::Unsubdivide => {
            if !grid.unsubdivide() {
                log::warn!("Collision grid of '{}' has a single cell on one axis", group);
            }
        }
        GridEdit::Fit { margin_percent } => {
            let (min, max) = footprint(doc, group);
            grid.fit_to_bounds(min, max, margin_percent);
        }
        GridEdit::CopyFrom(source) => {
            grid = CollisionGrid::from_object(item_group(doc, source)?)?;
        }
    }

    let object = doc
        .object_mut(group)
        .ok_or_else(|| ExportError::MissingObject(group.to_string()))?;
    grid.write_to(&mut object.properties);
    log::info!(
        "Collision grid of '{}' is now {}x{} cells of {}x{}",
        group,
        grid.count[0],
        grid.count[1],
        grid.step.x,
        grid.step.y
    );
    Ok(grid)
}

fn find<'a>(doc: &'a SceneDocument, name: &str) -> Option<&'a SceneObject> {
    doc.objects.iter().find(|o| o.name == name)
}

fn item_group<'a>(doc: &'a SceneDocument, name: &str) -> Result<&'a SceneObject> {
    let object = find(doc, name).ok_or_else(|| ExportError::MissingObject(name.to_string()))?;
    match classify(&object.name, object.data.has_geometry())? {
        Some((_, ObjectKind::ItemGroup)) => Ok(object),
        _ => Err(ExportError::NotAnItemGroup(name.to_string())),
    }
}

/// Host XY bounds of an item group and the objects parented to it.
fn footprint(doc: &SceneDocument, group: &str) -> (DVec2, DVec2) {
    let half = DVec2::splat(FOOTPRINT_HALF_SIZE);
    doc.objects
        .iter()
        .filter(|o| o.name == group || o.parent.as_deref() == Some(group))
        .map(|o| o.transform.location.truncate())
        .fold(
            (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
            |(min, max), center| (min.min(center - half), max.max(center + half)),
        )
}
