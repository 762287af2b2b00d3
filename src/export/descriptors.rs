//! One descriptor per stage object kind: name recognition, creation-time defaults and XML emission.
//!
//! Adding a placeable kind means adding a descriptor to [`DESCRIPTORS`]; the graph resolver
//! and the serializer only ever talk to the trait.

use std::fmt;

use glam::DVec3;
use xmltree::Element;

use super::keyframes::ResolvedAnimation;
use super::track_path::{resample_track_path, tangents, TRACK_PATH_SAMPLES};
use super::xml::{format_float, push_element, push_text, set_attribute, text_element, vector_element};
use crate::convert::coords::{to_target_position, to_target_rotation, to_target_scale};
use crate::error::{ExportError, Result};
use crate::scene::{ObjectData, PropertyBag, SceneObject, SceneSettings, Transform};
use crate::settings::{collision_triangle_flags, StageSettings};
use crate::stage::attributes::{
    AttributeReader, DecorationAttributes, ItemGroupAttributes, Link, StageModelAttributes,
    LINKED_ID_KEY, LINKED_OBJECT_KEY, WORMHOLE_ID_KEY,
};
use crate::stage::{
    BananaType, GoalColor, IdAllocator, ObjectKind, Playback, StageAttributes, StageObject,
};

/// How a descriptor recognizes its objects by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    Prefix(&'static str),
    Substring(&'static str),
    /// Never matched by name; picked when nothing else matches.
    Fallback,
}

impl MatchRule {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            MatchRule::Prefix(token) => name.starts_with(token),
            MatchRule::Substring(token) => name.contains(token),
            MatchRule::Fallback => false,
        }
    }
}

/// Where objects of a kind may appear in the exported document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Always exported at the document root.
    Root,
    /// Exported inside the item group it is parented to, otherwise at the root.
    Group,
    ItemGroup,
}

/// Everything an emitter may need besides the object itself.
pub struct EmitContext<'a> {
    pub scene: SceneSettings,
    pub stage: &'a StageSettings,
    pub animation: Option<&'a ResolvedAnimation>,
    /// Attributes of the item group the object belongs to.
    pub group: Option<&'a ItemGroupAttributes>,
}

pub trait Descriptor: Sync + fmt::Debug {
    /// Element name written for this kind.
    fn tag(&self) -> &'static str;

    fn match_rule(&self) -> MatchRule;

    fn matches(&self, name: &str) -> bool {
        self.match_rule().matches(name)
    }

    fn placement(&self) -> Placement {
        Placement::Group
    }

    /// The exact kind for a matching name. Kinds with variants parse the bracketed sub-tag here.
    fn kind_for(&self, name: &str) -> Result<ObjectKind>;

    /// Attributes assigned when an object of this kind is created.
    fn default_attributes(&self, _ids: &mut IdAllocator) -> Result<PropertyBag> {
        Ok(PropertyBag::new())
    }

    fn parse_attributes(&self, _object: &SceneObject, _kind: ObjectKind) -> Result<StageAttributes> {
        Ok(StageAttributes::None)
    }

    fn emit(&self, object: &StageObject, context: &EmitContext) -> Result<Element>;
}

/// Which transform parts the generic fragment carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fields {
    name: bool,
    position: bool,
    rotation: bool,
    scale: bool,
}

const POSITION: Fields = Fields {
    name: true,
    position: true,
    rotation: false,
    scale: false,
};
const POSITION_ROTATION: Fields = Fields {
    rotation: true,
    ..POSITION
};
const FULL_TRANSFORM: Fields = Fields {
    scale: true,
    ..POSITION_ROTATION
};
const UNNAMED_POSITION_ROTATION: Fields = Fields {
    name: false,
    ..POSITION_ROTATION
};

/// `<tag>` with optional name, position, rotation and scale in game coordinates.
fn generic_element(tag: &str, name: Option<&str>, transform: &Transform, fields: Fields) -> Element {
    let mut element = Element::new(tag);
    if fields.name {
        if let Some(name) = name {
            push_text(&mut element, "name", name);
        }
    }
    if fields.position {
        push_element(&mut element, vector_element("position", to_target_position(transform.location)));
    }
    if fields.rotation {
        push_element(&mut element, vector_element("rotation", to_target_rotation(transform.rotation)));
    }
    if fields.scale {
        push_element(&mut element, vector_element("scale", to_target_scale(transform.scale)));
    }
    element
}

/// The bracketed variant following `token`, e.g. `B` for `[GOAL_B]` with token `[GOAL_`.
fn sub_tag<'n>(name: &'n str, token: &str) -> Option<&'n str> {
    let rest = &name[name.find(token)? + token.len()..];
    rest.find(']').map(|end| &rest[..end])
}

fn unknown_variant(name: &str, category: &'static str, expected: &'static str) -> ExportError {
    ExportError::UnknownVariant {
        object: name.to_string(),
        category,
        expected,
    }
}

fn linked_target(object: &StageObject, kind: &'static str, target: &'static str) -> Result<i64> {
    object
        .link_target
        .ok_or_else(|| ExportError::UnlinkedReference {
            object: object.name().to_string(),
            kind,
            target,
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtraFields {
    None,
    /// `<radius>` from scale X.
    Radius,
    /// `<radius>` from scale X and `<height>` from scale Z.
    RadiusHeight,
}

/// Kinds whose fragment is just the generic fields plus a few scalars.
#[derive(Debug)]
pub struct SimpleDescriptor {
    tag: &'static str,
    rule: MatchRule,
    kind: ObjectKind,
    placement: Placement,
    fields: Fields,
    extra: ExtraFields,
}

impl Descriptor for SimpleDescriptor {
    fn tag(&self) -> &'static str {
        self.tag
    }

    fn match_rule(&self) -> MatchRule {
        self.rule
    }

    fn placement(&self) -> Placement {
        self.placement
    }

    fn kind_for(&self, _name: &str) -> Result<ObjectKind> {
        Ok(self.kind)
    }

    fn emit(&self, object: &StageObject, _context: &EmitContext) -> Result<Element> {
        let transform = &object.source.transform;
        let mut element = generic_element(self.tag, Some(object.name()), transform, self.fields);
        match self.extra {
            ExtraFields::None => {}
            ExtraFields::Radius => {
                push_text(&mut element, "radius", format_float(transform.scale.x));
            }
            ExtraFields::RadiusHeight => {
                push_text(&mut element, "radius", format_float(transform.scale.x));
                push_text(&mut element, "height", format_float(transform.scale.z));
            }
        }
        Ok(element)
    }
}

#[derive(Debug)]
pub struct ItemGroupDescriptor;

impl Descriptor for ItemGroupDescriptor {
    fn tag(&self) -> &'static str {
        "itemGroup"
    }

    fn match_rule(&self) -> MatchRule {
        MatchRule::Substring("[IG]")
    }

    fn placement(&self) -> Placement {
        Placement::ItemGroup
    }

    fn kind_for(&self, _name: &str) -> Result<ObjectKind> {
        Ok(ObjectKind::ItemGroup)
    }

    fn default_attributes(&self, ids: &mut IdAllocator) -> Result<PropertyBag> {
        Ok(ItemGroupAttributes::defaults(ids.next_id()?))
    }

    fn parse_attributes(&self, object: &SceneObject, _kind: ObjectKind) -> Result<StageAttributes> {
        Ok(StageAttributes::ItemGroup(ItemGroupAttributes::parse(object)?))
    }

    fn emit(&self, object: &StageObject, context: &EmitContext) -> Result<Element> {
        let group = object
            .item_group()
            .ok_or_else(|| ExportError::missing(object.name(), "animId"))?;
        let transform = &object.source.transform;
        log::debug!("Processing item group {}", object.name());

        let mut element = Element::new(self.tag());
        push_text(&mut element, "name", object.name());
        push_element(
            &mut element,
            vector_element("rotationCenter", to_target_position(transform.location)),
        );
        push_element(
            &mut element,
            vector_element("initialRotation", to_target_rotation(transform.rotation)),
        );
        push_text(
            &mut element,
            "animLoopTime",
            format_float(group.loop_time.resolve(&context.scene)),
        );
        push_text(&mut element, "animGroupId", group.anim_id);
        push_text(&mut element, "animInitialState", group.initial_state);
        push_text(&mut element, "animSeesawType", group.loop_mode);
        push_element(&mut element, vector_element("conveyorSpeed", group.conveyor));
        push_text(&mut element, "seesawSensitivity", format_float(group.seesaw.sensitivity));
        push_text(&mut element, "seesawFriction", format_float(group.seesaw.friction));
        push_text(&mut element, "seesawSpring", format_float(group.seesaw.spring));

        let mut scroll = Element::new("textureScroll");
        set_attribute(&mut scroll, "x", format_float(group.texture_scroll.x));
        set_attribute(&mut scroll, "y", format_float(group.texture_scroll.y));
        push_element(&mut element, scroll);

        // <collisionGrid>
        let grid = &group.collision_grid;
        let mut grid_element = Element::new("collisionGrid");
        push_element(
            &mut grid_element,
            grid_vector("start", format_float(grid.start.x), format_float(grid.start.y)),
        );
        push_element(
            &mut grid_element,
            grid_vector("step", format_float(grid.step.x), format_float(grid.step.y)),
        );
        push_element(
            &mut grid_element,
            grid_vector("count", grid.count[0].to_string(), grid.count[1].to_string()),
        );
        push_element(&mut element, grid_element);

        if let Some(animation) = context.animation {
            push_element(&mut element, animation.to_element());
        }
        Ok(element)
    }
}

/// Grid vectors only have the two ground axes.
pub(crate) fn grid_vector(name: &str, x: String, z: String) -> Element {
    let mut element = Element::new(name);
    set_attribute(&mut element, "x", x);
    set_attribute(&mut element, "z", z);
    element
}

#[derive(Debug)]
pub struct GoalDescriptor;

impl Descriptor for GoalDescriptor {
    fn tag(&self) -> &'static str {
        "goal"
    }

    fn match_rule(&self) -> MatchRule {
        MatchRule::Substring("[GOAL_")
    }

    fn kind_for(&self, name: &str) -> Result<ObjectKind> {
        let color = match sub_tag(name, "[GOAL_") {
            Some("B") => GoalColor::Blue,
            Some("G") => GoalColor::Green,
            Some("R") => GoalColor::Red,
            _ => return Err(unknown_variant(name, "goal", "[GOAL_B], [GOAL_G], [GOAL_R]")),
        };
        Ok(ObjectKind::Goal(color))
    }

    fn default_attributes(&self, _ids: &mut IdAllocator) -> Result<PropertyBag> {
        let mut bag = PropertyBag::new();
        bag.insert("cast_shadow", true);
        Ok(bag)
    }

    fn parse_attributes(&self, object: &SceneObject, _kind: ObjectKind) -> Result<StageAttributes> {
        let reader = AttributeReader::new(object);
        Ok(StageAttributes::Goal {
            cast_shadow: reader.bool("cast_shadow")?.unwrap_or(true),
        })
    }

    fn emit(&self, object: &StageObject, _context: &EmitContext) -> Result<Element> {
        let ObjectKind::Goal(color) = object.kind else {
            return Err(unknown_variant(object.name(), "goal", "[GOAL_B], [GOAL_G], [GOAL_R]"));
        };
        let cast_shadow = match object.attributes {
            StageAttributes::Goal { cast_shadow } => cast_shadow,
            _ => true,
        };

        let mut element = generic_element(
            self.tag(),
            Some(object.name()),
            &object.source.transform,
            POSITION_ROTATION,
        );
        push_text(&mut element, "type", color);
        push_text(&mut element, "castShadow", cast_shadow);
        Ok(element)
    }
}

#[derive(Debug)]
pub struct BananaDescriptor;

impl Descriptor for BananaDescriptor {
    fn tag(&self) -> &'static str {
        "banana"
    }

    fn match_rule(&self) -> MatchRule {
        MatchRule::Substring("[BANANA_")
    }

    fn kind_for(&self, name: &str) -> Result<ObjectKind> {
        match sub_tag(name, "[BANANA_") {
            Some("S") => Ok(ObjectKind::Banana(BananaType::Single)),
            Some("B") => Ok(ObjectKind::Banana(BananaType::Bunch)),
            _ => Err(unknown_variant(name, "banana", "[BANANA_S], [BANANA_B]")),
        }
    }

    fn emit(&self, object: &StageObject, _context: &EmitContext) -> Result<Element> {
        let ObjectKind::Banana(banana) = object.kind else {
            return Err(unknown_variant(object.name(), "banana", "[BANANA_S], [BANANA_B]"));
        };
        let mut element =
            generic_element(self.tag(), Some(object.name()), &object.source.transform, POSITION);
        push_text(&mut element, "type", banana);
        Ok(element)
    }
}

const SWITCH_TAGS: &str = "[SW_RW], [SW_PLAY_BACKWARDS], [SW_PAUSE], [SW_PLAY], [SW_FF]";

#[derive(Debug)]
pub struct SwitchDescriptor;

impl Descriptor for SwitchDescriptor {
    fn tag(&self) -> &'static str {
        "switch"
    }

    fn match_rule(&self) -> MatchRule {
        MatchRule::Substring("[SW_")
    }

    fn kind_for(&self, name: &str) -> Result<ObjectKind> {
        sub_tag(name, "[SW_")
            .and_then(Playback::from_switch_tag)
            .map(ObjectKind::Switch)
            .ok_or_else(|| unknown_variant(name, "switch", SWITCH_TAGS))
    }

    fn default_attributes(&self, _ids: &mut IdAllocator) -> Result<PropertyBag> {
        let mut bag = PropertyBag::new();
        bag.insert(LINKED_ID_KEY, 0i64);
        bag.insert(LINKED_OBJECT_KEY, "");
        Ok(bag)
    }

    fn parse_attributes(&self, object: &SceneObject, _kind: ObjectKind) -> Result<StageAttributes> {
        Ok(StageAttributes::Switch(Link::parse(object)?))
    }

    fn emit(&self, object: &StageObject, _context: &EmitContext) -> Result<Element> {
        let ObjectKind::Switch(playback) = object.kind else {
            return Err(unknown_variant(object.name(), "switch", SWITCH_TAGS));
        };
        let group_id = linked_target(object, "Switch", "item group")?;

        let mut element = generic_element(
            self.tag(),
            Some(object.name()),
            &object.source.transform,
            POSITION_ROTATION,
        );
        push_text(&mut element, "type", playback);
        push_text(&mut element, "animGroupId", group_id);
        Ok(element)
    }
}

#[derive(Debug)]
pub struct WormholeDescriptor;

impl Descriptor for WormholeDescriptor {
    fn tag(&self) -> &'static str {
        "wormhole"
    }

    fn match_rule(&self) -> MatchRule {
        MatchRule::Substring("[WH")
    }

    fn kind_for(&self, _name: &str) -> Result<ObjectKind> {
        Ok(ObjectKind::Wormhole)
    }

    fn default_attributes(&self, ids: &mut IdAllocator) -> Result<PropertyBag> {
        let mut bag = PropertyBag::new();
        bag.insert(WORMHOLE_ID_KEY, ids.next_id()?);
        bag.insert(LINKED_ID_KEY, 0i64);
        bag.insert(LINKED_OBJECT_KEY, "");
        Ok(bag)
    }

    fn parse_attributes(&self, object: &SceneObject, _kind: ObjectKind) -> Result<StageAttributes> {
        let reader = AttributeReader::new(object);
        Ok(StageAttributes::Wormhole {
            wh_id: reader.required_int(WORMHOLE_ID_KEY)?,
            link: Link::parse(object)?,
        })
    }

    fn emit(&self, object: &StageObject, _context: &EmitContext) -> Result<Element> {
        let StageAttributes::Wormhole { wh_id, .. } = object.attributes else {
            return Err(ExportError::missing(object.name(), WORMHOLE_ID_KEY));
        };
        let destination = linked_target(object, "Wormhole", "wormhole")?;

        let name = wh_id.to_string();
        let mut element = generic_element(
            self.tag(),
            Some(&name),
            &object.source.transform,
            POSITION_ROTATION,
        );
        push_text(&mut element, "destinationName", destination);
        Ok(element)
    }
}

pub const TRACK_PATH_EASING: &str = "EASED";

#[derive(Debug)]
pub struct TrackPathDescriptor;

impl Descriptor for TrackPathDescriptor {
    fn tag(&self) -> &'static str {
        "trackPath"
    }

    fn match_rule(&self) -> MatchRule {
        MatchRule::Prefix("[PATH]")
    }

    fn placement(&self) -> Placement {
        Placement::Root
    }

    fn kind_for(&self, _name: &str) -> Result<ObjectKind> {
        Ok(ObjectKind::TrackPath)
    }

    fn default_attributes(&self, _ids: &mut IdAllocator) -> Result<PropertyBag> {
        let mut bag = PropertyBag::new();
        bag.insert("playerID", 1i64);
        Ok(bag)
    }

    fn parse_attributes(&self, object: &SceneObject, _kind: ObjectKind) -> Result<StageAttributes> {
        let reader = AttributeReader::new(object);
        Ok(StageAttributes::TrackPath {
            player_id: reader.int("playerID")?.unwrap_or(1),
        })
    }

    fn emit(&self, object: &StageObject, _context: &EmitContext) -> Result<Element> {
        let player_id = match object.attributes {
            StageAttributes::TrackPath { player_id } => player_id,
            _ => 1,
        };
        let points: Vec<DVec3> = match &object.source.data {
            ObjectData::Curve { splines, .. } => splines
                .first()
                .map(|spline| spline.points.iter().map(|p| to_target_position(*p)).collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        let path = resample_track_path(object.name(), &points)?;
        log::debug!(
            "Track path {} resampled from {} to {} points",
            object.name(),
            points.len(),
            TRACK_PATH_SAMPLES
        );

        let mut element = Element::new(self.tag());
        push_text(&mut element, "playerID", player_id);
        for (axis, name) in ["posX", "posY", "posZ"].into_iter().enumerate() {
            let values: Vec<f64> = path.iter().map(|p| p[axis]).collect();
            let mut axis_element = Element::new(name);
            for (i, (value, tangent)) in values.iter().zip(tangents(&values)).enumerate() {
                let mut keyframe = Element::new("keyframe");
                set_attribute(&mut keyframe, "time", i);
                set_attribute(&mut keyframe, "value", format_float(*value));
                set_attribute(&mut keyframe, "easing", TRACK_PATH_EASING);
                set_attribute(&mut keyframe, "tangentIn", format_float(tangent));
                set_attribute(&mut keyframe, "tangentOut", format_float(tangent));
                push_element(&mut axis_element, keyframe);
            }
            push_element(&mut element, axis_element);
        }
        Ok(element)
    }
}

/// Background and foreground models.
#[derive(Debug)]
pub struct DecorationDescriptor {
    tag: &'static str,
    token: &'static str,
    kind: ObjectKind,
}

impl DecorationDescriptor {
    /// `[EXT:name]` references a model that lives outside this stage's model file.
    fn model_name(name: &str) -> String {
        match sub_tag(name, "[EXT:") {
            Some(external) => external.to_string(),
            None => name.replace(' ', "_"),
        }
    }
}

impl Descriptor for DecorationDescriptor {
    fn tag(&self) -> &'static str {
        self.tag
    }

    fn match_rule(&self) -> MatchRule {
        MatchRule::Prefix(self.token)
    }

    fn placement(&self) -> Placement {
        Placement::Root
    }

    fn kind_for(&self, _name: &str) -> Result<ObjectKind> {
        Ok(self.kind)
    }

    fn default_attributes(&self, _ids: &mut IdAllocator) -> Result<PropertyBag> {
        Ok(DecorationAttributes::defaults())
    }

    fn parse_attributes(&self, object: &SceneObject, _kind: ObjectKind) -> Result<StageAttributes> {
        Ok(StageAttributes::Decoration(DecorationAttributes::parse(object)?))
    }

    fn emit(&self, object: &StageObject, context: &EmitContext) -> Result<Element> {
        log::debug!("{} {}", self.kind, object.name());
        // Static decorations are placed by the model itself
        let transform = if object.source.is_animated() {
            object.source.transform
        } else {
            Transform::default()
        };
        let fields = Fields {
            name: false,
            ..FULL_TRANSFORM
        };
        let mut element = generic_element(self.tag, None, &transform, fields);
        push_text(&mut element, "name", Self::model_name(object.name()));

        if let StageAttributes::Decoration(decoration) = &object.attributes {
            if let Some(mesh_type) = decoration.mesh_type {
                push_text(&mut element, "meshType", mesh_type);
            }
            if let Some(loop_time) = decoration.loop_time {
                push_text(
                    &mut element,
                    "animLoopTime",
                    format_float(loop_time.resolve(&context.scene)),
                );
            }
            if let Some(scroll) = decoration.texture_scroll {
                let mut scroll_element = Element::new("textureScroll");
                set_attribute(&mut scroll_element, "x", format_float(scroll.x));
                set_attribute(&mut scroll_element, "y", format_float(scroll.y));
                push_element(&mut element, scroll_element);
            }
        }

        if let Some(animation) = context.animation {
            push_element(&mut element, animation.to_element());
        }
        Ok(element)
    }
}

/// Level geometry. The explicit variant matches `[MODEL]`; the other picks up untagged meshes.
#[derive(Debug)]
pub struct StageModelDescriptor {
    explicit: bool,
}

impl Descriptor for StageModelDescriptor {
    fn tag(&self) -> &'static str {
        "stageModel"
    }

    fn match_rule(&self) -> MatchRule {
        if self.explicit {
            MatchRule::Substring("[MODEL]")
        } else {
            MatchRule::Fallback
        }
    }

    fn kind_for(&self, _name: &str) -> Result<ObjectKind> {
        Ok(ObjectKind::StaticStageModel)
    }

    fn default_attributes(&self, _ids: &mut IdAllocator) -> Result<PropertyBag> {
        Ok(if self.explicit {
            StageModelAttributes::defaults()
        } else {
            PropertyBag::new()
        })
    }

    fn parse_attributes(&self, object: &SceneObject, _kind: ObjectKind) -> Result<StageAttributes> {
        Ok(StageAttributes::StageModel(StageModelAttributes::parse(
            object,
            self.explicit,
        )?))
    }

    fn emit(&self, object: &StageObject, context: &EmitContext) -> Result<Element> {
        let StageAttributes::StageModel(model) = &object.attributes else {
            return Err(ExportError::missing(object.name(), "model name"));
        };
        log::debug!("Level model {}", object.name());

        let mut element = Element::new(self.tag());
        push_text(&mut element, "name", model.display_name());

        if model.collision {
            let flag = context
                .group
                .map(|group| group.collision_triangle_flag)
                .unwrap_or(model.collision_triangle_flag);
            if !collision_triangle_flags(&context.stage.game_mode).contains(&flag) {
                log::warn!(
                    "{} uses collision flag {}, which {} does not define",
                    object.name(),
                    flag,
                    context.stage.game_mode
                );
            }

            let mut mesh_collision = Element::new("meshCollision");
            push_text(&mut mesh_collision, "collisionFlag", flag);
            push_text(&mut mesh_collision, "name", &model.model_name);
            let mut collision = Element::new("collision");
            push_element(&mut collision, mesh_collision);
            push_element(&mut element, collision);
        }

        if model.reflective {
            push_element(&mut element, text_element("runtimeReflective", true));
        }
        if let Some(flags) = model.flags {
            push_text(&mut element, "bitflag", flags);
        }
        Ok(element)
    }
}

pub static ITEM_GROUP: ItemGroupDescriptor = ItemGroupDescriptor;
pub static GOAL: GoalDescriptor = GoalDescriptor;
pub static BANANA: BananaDescriptor = BananaDescriptor;
pub static SWITCH: SwitchDescriptor = SwitchDescriptor;
pub static WORMHOLE: WormholeDescriptor = WormholeDescriptor;
pub static TRACK_PATH: TrackPathDescriptor = TrackPathDescriptor;

pub static BACKGROUND: DecorationDescriptor = DecorationDescriptor {
    tag: "backgroundModel",
    token: "[BG]",
    kind: ObjectKind::BackgroundModel,
};
pub static FOREGROUND: DecorationDescriptor = DecorationDescriptor {
    tag: "foregroundModel",
    token: "[FG]",
    kind: ObjectKind::ForegroundModel,
};

pub static MODEL: StageModelDescriptor = StageModelDescriptor { explicit: true };
/// Used for untagged geometry, including an item group's own mesh.
pub static STAGE_MODEL: StageModelDescriptor = StageModelDescriptor { explicit: false };

pub static START: SimpleDescriptor = SimpleDescriptor {
    tag: "start",
    rule: MatchRule::Prefix("[START]"),
    kind: ObjectKind::Start,
    placement: Placement::Root,
    fields: UNNAMED_POSITION_ROTATION,
    extra: ExtraFields::None,
};
pub static BUMPER: SimpleDescriptor = SimpleDescriptor {
    tag: "bumper",
    rule: MatchRule::Substring("[BUMPER]"),
    kind: ObjectKind::Bumper,
    placement: Placement::Group,
    fields: FULL_TRANSFORM,
    extra: ExtraFields::None,
};
pub static JAMABAR: SimpleDescriptor = SimpleDescriptor {
    tag: "jamabar",
    rule: MatchRule::Substring("[JAMABAR]"),
    kind: ObjectKind::Jamabar,
    placement: Placement::Group,
    fields: FULL_TRANSFORM,
    extra: ExtraFields::None,
};
pub static CONE_COLLISION: SimpleDescriptor = SimpleDescriptor {
    tag: "cone",
    rule: MatchRule::Substring("[CONE_COL]"),
    kind: ObjectKind::ConeCollision,
    placement: Placement::Group,
    fields: POSITION_ROTATION,
    extra: ExtraFields::RadiusHeight,
};
pub static SPHERE_COLLISION: SimpleDescriptor = SimpleDescriptor {
    tag: "sphere",
    rule: MatchRule::Substring("[SPHERE_COL]"),
    kind: ObjectKind::SphereCollision,
    placement: Placement::Group,
    fields: POSITION,
    extra: ExtraFields::Radius,
};
pub static CYLINDER_COLLISION: SimpleDescriptor = SimpleDescriptor {
    tag: "cylinder",
    rule: MatchRule::Substring("[CYLINDER_COL]"),
    kind: ObjectKind::CylinderCollision,
    placement: Placement::Group,
    fields: POSITION_ROTATION,
    extra: ExtraFields::RadiusHeight,
};
pub static FALLOUT_VOLUME: SimpleDescriptor = SimpleDescriptor {
    tag: "falloutVolume",
    rule: MatchRule::Substring("[FALLOUT_VOL]"),
    kind: ObjectKind::FalloutVolume,
    placement: Placement::Group,
    fields: FULL_TRANSFORM,
    extra: ExtraFields::None,
};
pub static BOOSTER: SimpleDescriptor = SimpleDescriptor {
    tag: "booster",
    rule: MatchRule::Prefix("[BOOSTER]"),
    kind: ObjectKind::Booster,
    placement: Placement::Root,
    fields: UNNAMED_POSITION_ROTATION,
    extra: ExtraFields::None,
};
pub static GOLF_HOLE: SimpleDescriptor = SimpleDescriptor {
    tag: "golfHole",
    rule: MatchRule::Prefix("[GOLF_HOLE]"),
    kind: ObjectKind::GolfHole,
    placement: Placement::Root,
    fields: UNNAMED_POSITION_ROTATION,
    extra: ExtraFields::None,
};

/// All named kinds in classification priority order.
pub static DESCRIPTORS: [&dyn Descriptor; 18] = [
    &ITEM_GROUP,
    &BUMPER,
    &JAMABAR,
    &CONE_COLLISION,
    &SPHERE_COLLISION,
    &CYLINDER_COLLISION,
    &BANANA,
    &FALLOUT_VOLUME,
    &SWITCH,
    &WORMHOLE,
    &GOAL,
    &START,
    &BACKGROUND,
    &FOREGROUND,
    &BOOSTER,
    &GOLF_HOLE,
    &TRACK_PATH,
    &MODEL,
];
