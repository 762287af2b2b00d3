//! Partition classified objects into the exported forest and resolve cross references.

use std::collections::HashMap;

use super::classify::stage_object;
use super::{ObjectKind, StageAttributes, StageModelAttributes, StageObject};
use crate::error::{ExportError, Result};
use crate::export::descriptors::{Placement, STAGE_MODEL};
use crate::scene::{ObjectData, SceneObject};

/// An item group and the objects parented directly to it, in scene order.
#[derive(Debug, Clone)]
pub struct ItemGroupNode<'a> {
    pub group: StageObject<'a>,
    pub children: Vec<StageObject<'a>>,
}

#[derive(Debug, Clone, Default)]
pub struct StageGraph<'a> {
    /// Objects exported at the document root, in scene order.
    pub root_objects: Vec<StageObject<'a>>,
    pub item_groups: Vec<ItemGroupNode<'a>>,
}

impl<'a> StageGraph<'a> {
    pub fn root_objects_of(&self, kind: ObjectKind) -> impl Iterator<Item = &StageObject<'a>> {
        self.root_objects.iter().filter(move |o| o.kind == kind)
    }

    pub fn object_count(&self) -> usize {
        self.root_objects.len()
            + self
                .item_groups
                .iter()
                .map(|node| 1 + node.children.len())
                .sum::<usize>()
    }
}

/// Ids by value and by owning object name, for one id namespace.
struct IdIndex<'a> {
    id_name: &'static str,
    by_id: HashMap<i64, &'a str>,
    by_name: HashMap<&'a str, i64>,
}

impl<'a> IdIndex<'a> {
    fn new(id_name: &'static str) -> Self {
        Self {
            id_name,
            by_id: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    fn insert(&mut self, id: i64, object: &'a str) -> Result<()> {
        if let Some(first) = self.by_id.insert(id, object) {
            return Err(ExportError::DuplicateId {
                id_name: self.id_name,
                id,
                first: first.to_string(),
                second: object.to_string(),
            });
        }
        self.by_name.insert(object, id);
        Ok(())
    }

    /// A stored id wins over a stored object name; neither resolving is an error.
    fn resolve(
        &self,
        object: &StageObject,
        kind: &'static str,
        target: &'static str,
    ) -> Result<i64> {
        let link = object.attributes.link().cloned().unwrap_or_default();
        if let Some(id) = link.id {
            return match self.by_id.contains_key(&id) {
                true => Ok(id),
                false => Err(ExportError::UnresolvedReference {
                    object: object.name().to_string(),
                    kind,
                    target,
                    id,
                }),
            };
        }
        link.object
            .as_deref()
            .and_then(|name| self.by_name.get(name).copied())
            .ok_or_else(|| ExportError::UnlinkedReference {
                object: object.name().to_string(),
                kind,
                target,
            })
    }
}

/// Classify every object, group children under their item groups and resolve
/// switch and wormhole links.
///
/// Only direct children of an item group join it. Everything else, including root-only kinds
/// parented to an item group, is exported at the root in scene order.
pub fn build_stage_graph(objects: &[SceneObject]) -> Result<StageGraph<'_>> {
    let mut graph = StageGraph::default();
    let mut group_index: HashMap<&str, usize> = HashMap::new();
    let mut placed = Vec::new();

    for object in objects {
        if object.data == ObjectData::Other {
            log::debug!("Skipping {}: not an empty, mesh or curve", object.name);
            continue;
        }
        let Some(classified) = stage_object(object)? else {
            continue;
        };
        log::debug!("{} classified as {}", object.name, classified.kind);

        if classified.descriptor.placement() == Placement::ItemGroup {
            group_index.insert(&object.name, graph.item_groups.len());
            graph.item_groups.push(ItemGroupNode {
                group: classified,
                children: Vec::new(),
            });
        } else {
            placed.push(classified);
        }
    }

    // Parents may come after their children in the scene list
    for classified in placed {
        let group = match classified.descriptor.placement() {
            Placement::Group => classified
                .source
                .parent
                .as_deref()
                .and_then(|parent| group_index.get(parent).copied()),
            Placement::Root | Placement::ItemGroup => None,
        };
        match group {
            Some(index) => graph.item_groups[index].children.push(classified),
            None => graph.root_objects.push(classified),
        }
    }

    // An item group's own mesh is part of its geometry
    for node in &mut graph.item_groups {
        let source = node.group.source;
        if source.data.has_geometry() {
            node.children.push(StageObject {
                source,
                kind: ObjectKind::StaticStageModel,
                descriptor: &STAGE_MODEL,
                attributes: StageAttributes::StageModel(StageModelAttributes::parse(
                    source, false,
                )?),
                link_target: None,
            });
        }
    }

    resolve_links(&mut graph)?;

    log::info!(
        "Found {} item groups and {} root objects ({} stage objects)",
        graph.item_groups.len(),
        graph.root_objects.len(),
        graph.object_count()
    );
    Ok(graph)
}

fn resolve_links(graph: &mut StageGraph) -> Result<()> {
    let mut anim_ids = IdIndex::new("animId");
    for node in &graph.item_groups {
        if let Some(group) = node.group.item_group() {
            anim_ids.insert(group.anim_id, node.group.name())?;
        }
    }

    let mut wormhole_ids = IdIndex::new("whId");
    for object in all_objects(graph) {
        if let StageAttributes::Wormhole { wh_id, .. } = object.attributes {
            wormhole_ids.insert(wh_id, object.name())?;
        }
    }

    let mut resolved = Vec::new();
    for object in all_objects(graph) {
        let target = match object.kind {
            ObjectKind::Switch(_) => anim_ids.resolve(object, "Switch", "item group")?,
            ObjectKind::Wormhole => wormhole_ids.resolve(object, "Wormhole", "wormhole")?,
            _ => continue,
        };
        log::debug!("{} links to id {}", object.name(), target);
        resolved.push(target);
    }

    let mut targets = resolved.into_iter();
    for object in all_objects_mut(graph) {
        if matches!(object.kind, ObjectKind::Switch(_) | ObjectKind::Wormhole) {
            object.link_target = targets.next();
        }
    }
    Ok(())
}

fn all_objects<'g, 'a>(graph: &'g StageGraph<'a>) -> impl Iterator<Item = &'g StageObject<'a>> {
    graph.root_objects.iter().chain(
        graph
            .item_groups
            .iter()
            .flat_map(|node| std::iter::once(&node.group).chain(node.children.iter())),
    )
}

fn all_objects_mut<'g, 'a>(
    graph: &'g mut StageGraph<'a>,
) -> impl Iterator<Item = &'g mut StageObject<'a>> {
    graph.root_objects.iter_mut().chain(
        graph
            .item_groups
            .iter_mut()
            .flat_map(|node| std::iter::once(&mut node.group).chain(node.children.iter_mut())),
    )
}
