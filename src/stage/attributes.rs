//! Typed attribute records parsed out of the host's per-object property bags.

use std::collections::HashSet;

use glam::{DVec2, DVec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use strum::Display;

use super::Playback;
use crate::error::{ExportError, Result};
use crate::scene::{PropertyBag, PropertyValue, SceneObject, SceneSettings};

pub const ANIM_ID_KEY: &str = "animId";
pub const WORMHOLE_ID_KEY: &str = "whId";
pub const LINKED_ID_KEY: &str = "linkedId";
pub const LINKED_OBJECT_KEY: &str = "linkedObject";
pub const LOOP_TIME_KEY: &str = "animLoopTime";
pub const TIMESTEP_KEY: &str = "exportTimestep";
pub const TRIANGLE_FLAG_KEY: &str = "collisionTriangleFlag";

const MIN_ID: i64 = 1;
const MAX_ID: i64 = 65535;
/// Random draws before falling back to a scan for the lowest free id.
const RANDOM_ID_ATTEMPTS: usize = 256;

/// Typed access to one object's property bag. Wrong-typed values are errors naming the object.
pub struct AttributeReader<'a> {
    object: &'a str,
    bag: &'a PropertyBag,
}

impl<'a> AttributeReader<'a> {
    pub fn new(object: &'a SceneObject) -> Self {
        Self {
            object: &object.name,
            bag: &object.properties,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.bag.contains(key)
    }

    pub fn float(&self, key: &str) -> Result<Option<f64>> {
        match self.bag.get(key) {
            None => Ok(None),
            Some(PropertyValue::Float(v)) => Ok(Some(*v)),
            Some(PropertyValue::Int(v)) => Ok(Some(*v as f64)),
            Some(PropertyValue::Bool(v)) => Ok(Some(if *v { 1.0 } else { 0.0 })),
            Some(other) => Err(self.wrong_type(key, "a number", other)),
        }
    }

    pub fn int(&self, key: &str) -> Result<Option<i64>> {
        match self.bag.get(key) {
            None => Ok(None),
            Some(PropertyValue::Int(v)) => Ok(Some(*v)),
            Some(PropertyValue::Bool(v)) => Ok(Some(*v as i64)),
            Some(PropertyValue::Float(v)) if v.fract() == 0.0 => Ok(Some(*v as i64)),
            Some(other) => Err(self.wrong_type(key, "an integer", other)),
        }
    }

    pub fn bool(&self, key: &str) -> Result<Option<bool>> {
        match self.bag.get(key) {
            None => Ok(None),
            Some(PropertyValue::Bool(v)) => Ok(Some(*v)),
            Some(PropertyValue::Int(v)) => Ok(Some(*v != 0)),
            Some(other) => Err(self.wrong_type(key, "a boolean", other)),
        }
    }

    pub fn string(&self, key: &str) -> Result<Option<&'a str>> {
        match self.bag.get(key) {
            None => Ok(None),
            Some(PropertyValue::String(v)) => Ok(Some(v.as_str())),
            Some(other) => Err(self.wrong_type(key, "a string", other)),
        }
    }

    pub fn required_float(&self, key: &str) -> Result<f64> {
        self.float(key)?
            .ok_or_else(|| ExportError::missing(self.object, key))
    }

    pub fn required_int(&self, key: &str) -> Result<i64> {
        self.int(key)?
            .ok_or_else(|| ExportError::missing(self.object, key))
    }

    pub fn float_or(&self, key: &str, default: f64) -> Result<f64> {
        Ok(self.float(key)?.unwrap_or(default))
    }

    fn wrong_type(&self, key: &str, expected: &str, found: &PropertyValue) -> ExportError {
        ExportError::invalid(self.object, key, format!("expected {}, found {:?}", expected, found))
    }

    fn invalid(&self, key: &str, reason: impl Into<String>) -> ExportError {
        ExportError::invalid(self.object, key, reason)
    }
}

/// Loop duration of an animated object. `-1` in the host means "use the scene range".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoopTime {
    SceneRange,
    Seconds(f64),
}

impl LoopTime {
    pub fn from_raw(value: f64) -> Self {
        if value == -1.0 {
            LoopTime::SceneRange
        } else {
            LoopTime::Seconds(value)
        }
    }

    pub fn resolve(&self, settings: &SceneSettings) -> f64 {
        match self {
            LoopTime::SceneRange => settings.range_seconds(),
            LoopTime::Seconds(seconds) => *seconds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LoopMode {
    #[strum(serialize = "PLAY_ONCE_ANIMATION")]
    PlayOnce,
    #[strum(serialize = "LOOPING_ANIMATION")]
    Looping,
    #[strum(serialize = "SEESAW")]
    Seesaw,
}

impl LoopMode {
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(LoopMode::PlayOnce),
            1 => Some(LoopMode::Looping),
            2 => Some(LoopMode::Seesaw),
            _ => None,
        }
    }
}

/// Broad-phase collision grid of an item group, in game X/Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionGrid {
    pub start: DVec2,
    pub step: DVec2,
    pub count: [u32; 2],
}

impl Default for CollisionGrid {
    fn default() -> Self {
        Self {
            start: DVec2::new(-256.0, -256.0),
            step: DVec2::new(32.0, 32.0),
            count: [16, 16],
        }
    }
}

impl CollisionGrid {
    /// Halve the cell size and double the cell count on both axes.
    /// `object` names the owning item group in the error when a count would overflow.
    pub fn subdivide(&mut self, object: &str) -> Result<()> {
        let double = |count: u32, key: &str| {
            count.checked_mul(2).ok_or_else(|| {
                ExportError::invalid(object, key, format!("step count {} cannot be doubled", count))
            })
        };
        let count = [
            double(self.count[0], "collisionStepCountX")?,
            double(self.count[1], "collisionStepCountY")?,
        ];
        self.step /= 2.0;
        self.count = count;
        Ok(())
    }

    /// Undo one subdivision. Returns false and leaves the grid alone if either axis has a single cell.
    pub fn unsubdivide(&mut self) -> bool {
        if self.count[0] <= 1 || self.count[1] <= 1 {
            return false;
        }
        self.step *= 2.0;
        self.count = [self.count[0] / 2, self.count[1] / 2];
        true
    }

    /// Cover a host-frame XY bounding box plus `margin_percent` of its size, keeping the cell counts.
    pub fn fit_to_bounds(&mut self, min: DVec2, max: DVec2, margin_percent: f64) {
        let margin = margin_percent / 100.0;
        let dimensions = max - min;
        let start_x = min.x - dimensions.x * 0.5 * margin;
        let start_y = max.y + dimensions.y * 0.5 * margin;
        let padded = dimensions * (1.0 + margin);

        // Host +Y is game -Z
        self.start = DVec2::new(start_x, -start_y);
        self.step = DVec2::new(
            padded.x / self.count[0] as f64,
            padded.y / self.count[1] as f64,
        );
    }

    /// The grid stored on an item group object.
    pub fn from_object(object: &SceneObject) -> Result<Self> {
        Self::parse(&AttributeReader::new(object))
    }

    fn parse(reader: &AttributeReader) -> Result<Self> {
        let count_x = reader.required_int("collisionStepCountX")?;
        let count_y = reader.required_int("collisionStepCountY")?;
        let step_count = |key: &str, count: i64| match u32::try_from(count) {
            Ok(count) if count >= 1 => Ok(count),
            _ => Err(reader.invalid(
                key,
                format!("step count must be between 1 and {}, got {}", u32::MAX, count),
            )),
        };
        let count = [
            step_count("collisionStepCountX", count_x)?,
            step_count("collisionStepCountY", count_y)?,
        ];
        Ok(Self {
            start: DVec2::new(
                reader.required_float("collisionStartX")?,
                reader.required_float("collisionStartY")?,
            ),
            step: DVec2::new(
                reader.required_float("collisionStepX")?,
                reader.required_float("collisionStepY")?,
            ),
            count,
        })
    }

    pub fn write_to(&self, bag: &mut PropertyBag) {
        bag.insert("collisionStartX", self.start.x);
        bag.insert("collisionStartY", self.start.y);
        bag.insert("collisionStepX", self.step.x);
        bag.insert("collisionStepY", self.step.y);
        bag.insert("collisionStepCountX", self.count[0] as i64);
        bag.insert("collisionStepCountY", self.count[1] as i64);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Seesaw {
    pub sensitivity: f64,
    pub friction: f64,
    pub spring: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemGroupAttributes {
    pub anim_id: i64,
    pub initial_state: Playback,
    pub loop_mode: LoopMode,
    pub loop_time: LoopTime,
    pub conveyor: DVec3,
    pub seesaw: Seesaw,
    pub texture_scroll: DVec2,
    pub collision_grid: CollisionGrid,
    pub export_timestep: Option<u32>,
    pub collision_triangle_flag: i64,
}

impl ItemGroupAttributes {
    pub fn parse(object: &SceneObject) -> Result<Self> {
        let reader = AttributeReader::new(object);

        let init_playing = reader.required_int("initPlaying")?;
        let initial_state = Playback::from_index(init_playing).ok_or_else(|| {
            reader.invalid("initPlaying", format!("{} is not a play state (0-4)", init_playing))
        })?;
        let loop_anim = reader.required_int("loopAnim")?;
        let loop_mode = LoopMode::from_index(loop_anim).ok_or_else(|| {
            reader.invalid("loopAnim", format!("{} is not an animation type (0-2)", loop_anim))
        })?;

        let export_timestep = match reader.int(TIMESTEP_KEY)? {
            None | Some(-1) => None,
            Some(step) if step >= 1 => Some(step as u32),
            Some(step) => {
                return Err(reader.invalid(TIMESTEP_KEY, format!("{} is not a valid timestep", step)))
            }
        };

        Ok(Self {
            anim_id: reader.required_int(ANIM_ID_KEY)?,
            initial_state,
            loop_mode,
            loop_time: LoopTime::from_raw(reader.float_or(LOOP_TIME_KEY, -1.0)?),
            conveyor: DVec3::new(
                reader.float_or("conveyorX", 0.0)?,
                reader.float_or("conveyorY", 0.0)?,
                reader.float_or("conveyorZ", 0.0)?,
            ),
            seesaw: Seesaw {
                sensitivity: reader.float_or("seesawSensitivity", 0.0)?,
                friction: reader.float_or("seesawFriction", 0.0)?,
                spring: reader.float_or("seesawSpring", 0.0)?,
            },
            texture_scroll: DVec2::new(
                reader.float_or("texScrollUSpeed", 0.0)?,
                reader.float_or("texScrollVSpeed", 0.0)?,
            ),
            collision_grid: CollisionGrid::parse(&reader)?,
            export_timestep,
            collision_triangle_flag: reader.int(TRIANGLE_FLAG_KEY)?.unwrap_or(0),
        })
    }

    pub fn defaults(anim_id: i64) -> PropertyBag {
        let mut bag = PropertyBag::new();
        CollisionGrid::default().write_to(&mut bag);
        bag.insert(ANIM_ID_KEY, anim_id);
        bag.insert("initPlaying", 1i64);
        bag.insert("loopAnim", 1i64);
        bag.insert(LOOP_TIME_KEY, -1.0);
        bag.insert("conveyorX", 0.0);
        bag.insert("conveyorY", 0.0);
        bag.insert("conveyorZ", 0.0);
        bag.insert("seesawSensitivity", 0.0);
        bag.insert("seesawFriction", 0.0);
        bag.insert("seesawSpring", 0.0);
        bag.insert("texScrollUSpeed", 0.0);
        bag.insert("texScrollVSpeed", 0.0);
        bag.insert(TIMESTEP_KEY, -1i64);
        bag
    }
}

/// A stored cross reference: a target id, plus the target object's name as a lookup shortcut.
/// A `linkedId` of 0 means unset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Link {
    pub id: Option<i64>,
    pub object: Option<String>,
}

impl Link {
    pub fn parse(object: &SceneObject) -> Result<Self> {
        let reader = AttributeReader::new(object);
        Ok(Self {
            id: reader.int(LINKED_ID_KEY)?.filter(|id| *id != 0),
            object: reader
                .string(LINKED_OBJECT_KEY)?
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        })
    }
}

/// Background and foreground model options. Every field is optional on the host object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecorationAttributes {
    pub mesh_type: Option<i64>,
    pub loop_time: Option<LoopTime>,
    pub texture_scroll: Option<DVec2>,
}

impl DecorationAttributes {
    pub fn parse(object: &SceneObject) -> Result<Self> {
        let reader = AttributeReader::new(object);
        let texture_scroll = match reader.float("texScrollUSpeed")? {
            Some(u) => Some(DVec2::new(u, reader.float_or("texScrollVSpeed", 0.0)?)),
            None => None,
        };
        Ok(Self {
            mesh_type: reader.int("meshType")?,
            loop_time: reader.float(LOOP_TIME_KEY)?.map(LoopTime::from_raw),
            texture_scroll,
        })
    }

    pub fn defaults() -> PropertyBag {
        let mut bag = PropertyBag::new();
        bag.insert(LOOP_TIME_KEY, -1.0);
        bag.insert("meshType", 0x1fi64);
        bag.insert("texScrollUSpeed", 0.0);
        bag.insert("texScrollVSpeed", 0.0);
        bag
    }
}

/// Model flag attributes, bit 0 first.
pub const MODEL_FLAG_KEYS: [&str; 8] = [
    "cast_shadow",
    "receive_shadow",
    "unk3",
    "transparencyA",
    "transparencyB",
    "unk6",
    "unk7",
    "unk8",
];

#[derive(Debug, Clone, PartialEq)]
pub struct StageModelAttributes {
    pub model_name: String,
    pub hidden: bool,
    pub collision: bool,
    pub reflective: bool,
    pub flags: Option<u8>,
    pub collision_triangle_flag: i64,
}

impl StageModelAttributes {
    /// `explicit` is set for objects carrying the `[MODEL]` tag rather than plain geometry.
    pub fn parse(object: &SceneObject, explicit: bool) -> Result<Self> {
        let reader = AttributeReader::new(object);

        let raw_name = match object.data.name() {
            Some(data_name) if data_name != object.name => {
                format!("{}_{}", object.name, data_name)
            }
            _ => object.name.clone(),
        };

        let flags = if explicit && reader.contains(MODEL_FLAG_KEYS[0]) {
            let mut bits = 0u8;
            for (bit, key) in MODEL_FLAG_KEYS.iter().enumerate() {
                if reader.bool(key)?.unwrap_or(false) {
                    bits |= 1 << bit;
                }
            }
            Some(bits)
        } else {
            None
        };

        Ok(Self {
            model_name: raw_name.replace(' ', "_"),
            hidden: object.name.contains("[NODISP]"),
            collision: !object.name.contains("[NOCOLI]"),
            reflective: object.name.contains("[MIR]"),
            flags,
            collision_triangle_flag: reader.int(TRIANGLE_FLAG_KEY)?.unwrap_or(0),
        })
    }

    /// Name shown in game; hidden models get a `__` prefix.
    pub fn display_name(&self) -> String {
        if self.hidden {
            format!("__{}", self.model_name)
        } else {
            self.model_name.clone()
        }
    }

    pub fn defaults() -> PropertyBag {
        let mut bag = PropertyBag::new();
        for key in MODEL_FLAG_KEYS {
            bag.insert(key, false);
        }
        bag
    }
}

/// Kind-specific attributes of a classified object.
#[derive(Debug, Clone, PartialEq)]
pub enum StageAttributes {
    None,
    ItemGroup(ItemGroupAttributes),
    Goal { cast_shadow: bool },
    Switch(Link),
    Wormhole { wh_id: i64, link: Link },
    TrackPath { player_id: i64 },
    Decoration(DecorationAttributes),
    StageModel(StageModelAttributes),
}

impl StageAttributes {
    pub fn link(&self) -> Option<&Link> {
        match self {
            StageAttributes::Switch(link) | StageAttributes::Wormhole { link, .. } => Some(link),
            _ => None,
        }
    }

    pub fn loop_time(&self) -> Option<LoopTime> {
        match self {
            StageAttributes::ItemGroup(group) => Some(group.loop_time),
            StageAttributes::Decoration(decoration) => decoration.loop_time,
            _ => None,
        }
    }

    pub fn export_timestep(&self) -> Option<u32> {
        match self {
            StageAttributes::ItemGroup(group) => group.export_timestep,
            _ => None,
        }
    }
}

/// Hands out random animation and wormhole ids, re-rolling on collision.
pub struct IdAllocator {
    used: HashSet<i64>,
    rng: StdRng,
}

impl IdAllocator {
    pub fn from_objects(objects: &[SceneObject]) -> Self {
        Self::with_rng(objects, StdRng::from_entropy())
    }

    pub fn with_rng(objects: &[SceneObject], rng: StdRng) -> Self {
        let used = objects
            .iter()
            .flat_map(|object| {
                let reader = AttributeReader::new(object);
                [ANIM_ID_KEY, WORMHOLE_ID_KEY]
                    .into_iter()
                    .filter_map(move |key| reader.int(key).ok().flatten())
            })
            .collect();
        Self { used, rng }
    }

    pub fn is_used(&self, id: i64) -> bool {
        self.used.contains(&id)
    }

    pub fn next_id(&mut self) -> Result<i64> {
        for _ in 0..RANDOM_ID_ATTEMPTS {
            let id = self.rng.gen_range(MIN_ID..=MAX_ID);
            if self.used.insert(id) {
                return Ok(id);
            }
        }
        let id = (MIN_ID..=MAX_ID)
            .find(|id| !self.used.contains(id))
            .ok_or(ExportError::IdsExhausted {
                min: MIN_ID,
                max: MAX_ID,
            })?;
        self.used.insert(id);
        Ok(id)
    }
}
