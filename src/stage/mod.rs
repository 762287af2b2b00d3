//! Stage objects derived from the host scene on every export.

pub mod attributes;
pub mod classify;
pub mod edit;
pub mod graph;

use std::fmt;

use strum::{Display, EnumIter, EnumString};

use crate::export::descriptors::Descriptor;
use crate::scene::SceneObject;

pub use attributes::{
    CollisionGrid, DecorationAttributes, IdAllocator, ItemGroupAttributes, Link, LoopMode,
    LoopTime, Seesaw, StageAttributes, StageModelAttributes,
};
pub use classify::classify;
pub use edit::{add_object, edit_collision_grid, GridEdit};
pub use graph::{build_stage_graph, ItemGroupNode, StageGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalColor {
    Blue,
    Green,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BananaType {
    Single,
    Bunch,
}

/// Animation playback command, shared by switch types and item group initial states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Playback {
    Pause,
    Play,
    PlayBackwards,
    FastForward,
    Rewind,
}

impl Playback {
    /// Item group `initPlaying` values, in attribute order.
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Playback::Pause),
            1 => Some(Playback::Play),
            2 => Some(Playback::PlayBackwards),
            3 => Some(Playback::FastForward),
            4 => Some(Playback::Rewind),
            _ => None,
        }
    }

    /// The short tag used in switch names, e.g. `[SW_FF]`.
    pub fn from_switch_tag(tag: &str) -> Option<Self> {
        match tag {
            "RW" => Some(Playback::Rewind),
            "PLAY_BACKWARDS" => Some(Playback::PlayBackwards),
            "PAUSE" => Some(Playback::Pause),
            "PLAY" => Some(Playback::Play),
            "FF" => Some(Playback::FastForward),
            _ => None,
        }
    }
}

/// Every kind of placeable the stage format knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    ItemGroup,
    Start,
    Goal(GoalColor),
    Bumper,
    Jamabar,
    ConeCollision,
    SphereCollision,
    CylinderCollision,
    FalloutVolume,
    Banana(BananaType),
    Switch(Playback),
    Wormhole,
    Booster,
    GolfHole,
    TrackPath,
    BackgroundModel,
    ForegroundModel,
    StaticStageModel,
}

impl ObjectKind {
    pub fn is_decoration(&self) -> bool {
        matches!(self, ObjectKind::BackgroundModel | ObjectKind::ForegroundModel)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Goal(color) => write!(f, "Goal ({})", color),
            ObjectKind::Banana(banana) => write!(f, "Banana ({})", banana),
            ObjectKind::Switch(playback) => write!(f, "Switch ({})", playback),
            other => write!(f, "{:?}", other),
        }
    }
}

/// One classified host object plus everything the exporter derived for it.
#[derive(Debug, Clone)]
pub struct StageObject<'a> {
    pub source: &'a SceneObject,
    pub kind: ObjectKind,
    pub descriptor: &'static dyn Descriptor,
    pub attributes: StageAttributes,
    /// Id of the resolved link target, filled in by the graph resolver.
    pub link_target: Option<i64>,
}

impl<'a> StageObject<'a> {
    pub fn name(&self) -> &'a str {
        &self.source.name
    }

    pub fn item_group(&self) -> Option<&ItemGroupAttributes> {
        match &self.attributes {
            StageAttributes::ItemGroup(attributes) => Some(attributes),
            _ => None,
        }
    }
}
