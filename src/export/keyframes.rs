//! Keyframe channel sampling.
//!
//! Every channel is sampled by evaluating its curve directly at each frame, so no
//! scene state is touched while building keyframe lists.

use std::collections::BTreeMap;

use strum::IntoEnumIterator;
use xmltree::Element;

use super::xml::{keyframe_element, push_element};
use crate::convert::coords::{channel_target, channel_value};
use crate::scene::{
    Action, Channel, FCurve, Interpolation, KeyframePoint, SceneObject, SceneSettings,
};
use crate::settings::ExportConfig;
use crate::stage::LoopTime;

pub const LINEAR_EASING: &str = "LINEAR";

/// Round to `digits` decimal places.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

/// Frame range, step and precision used to turn one object's curves into keyframes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingPolicy {
    pub fps: f64,
    pub start: i64,
    pub end: i64,
    pub timestep: u32,
    pub value_round: u32,
    pub time_round: u32,
    pub optimize: bool,
}

impl SamplingPolicy {
    pub fn new(scene: &SceneSettings, config: &ExportConfig) -> Self {
        Self {
            fps: scene.fps,
            start: scene.frame_start,
            end: scene.frame_end,
            timestep: config.timestep.max(1),
            value_round: config.value_round,
            time_round: config.time_round,
            optimize: config.optimize_keyframes,
        }
    }

    /// Apply an object's loop time and timestep overrides.
    pub fn for_object(&self, loop_time: Option<LoopTime>, timestep: Option<u32>) -> Self {
        let mut policy = *self;
        if let Some(LoopTime::Seconds(seconds)) = loop_time {
            policy.end = self.start + (seconds * self.fps).round() as i64 - 1;
        }
        if let Some(timestep) = timestep {
            policy.timestep = timestep.max(1);
        }
        policy
    }

    fn ticks_per_second(&self) -> f64 {
        10f64.powi(self.time_round as i32)
    }

    /// Seconds since the start frame, as an integer count of rounding units.
    fn ticks(&self, frame: f64) -> i64 {
        ((frame - self.start as f64) / self.fps * self.ticks_per_second()).round() as i64
    }
}

/// Sampled values of one channel keyed by time. Times are stored already rounded,
/// so two samples landing on the same rounded time share one entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSeries {
    ticks_per_second: f64,
    samples: BTreeMap<i64, f64>,
}

impl ChannelSeries {
    fn new(policy: &SamplingPolicy) -> Self {
        Self {
            ticks_per_second: policy.ticks_per_second(),
            samples: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// `(seconds, value)` pairs in ascending time order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.samples
            .iter()
            .map(|(ticks, value)| (*ticks as f64 / self.ticks_per_second, *value))
    }

    pub fn value_at(&self, seconds: f64) -> Option<f64> {
        let ticks = (seconds * self.ticks_per_second).round() as i64;
        self.samples.get(&ticks).copied()
    }

    pub fn to_element(&self, name: &str) -> Element {
        let mut element = Element::new(name);
        for (time, value) in self.iter() {
            push_element(&mut element, keyframe_element(time, value, LINEAR_EASING));
        }
        element
    }
}

/// Sample one channel over the policy's range.
///
/// Explicit curve keys in `[start, end + 1]` always survive. Resampled values fill in the
/// remaining times; with `optimize` on, runs of equal values keep only their first and last sample.
/// `fallback` is the raw host value used when the curve has no points.
pub fn sample_channel(
    curve: &FCurve,
    channel: Channel,
    fallback: f64,
    policy: &SamplingPolicy,
) -> ChannelSeries {
    let mut series = ChannelSeries::new(policy);
    let round_value = |raw: f64| round_to(channel_value(channel, raw), policy.value_round);

    for key in &curve.keyframes {
        if key.frame >= policy.start as f64 && key.frame <= (policy.end + 1) as f64 {
            series
                .samples
                .insert(policy.ticks(key.frame), round_value(key.value));
        }
    }

    let mut previous: Option<f64> = None;
    let mut pending: Option<(i64, f64)> = None;
    let mut frame = policy.start;
    while frame <= policy.end {
        let raw = curve.evaluate(frame as f64).unwrap_or(fallback);
        let value = round_value(raw);
        let ticks = policy.ticks(frame as f64);

        if policy.optimize && previous == Some(value) {
            pending = Some((ticks, value));
        } else {
            if let Some((pending_ticks, pending_value)) = pending.take() {
                series.samples.entry(pending_ticks).or_insert(pending_value);
            }
            previous = Some(value);
            series.samples.entry(ticks).or_insert(value);
        }
        frame += policy.timestep as i64;
    }
    if let Some((pending_ticks, pending_value)) = pending {
        series.samples.entry(pending_ticks).or_insert(pending_value);
    }

    series
}

/// A working copy of the object's curves where every channel has a key on `start`.
///
/// Channels with a curve get the curve's value there; channels without one get a single
/// key holding the static transform component. Returns `None` for unanimated objects.
pub fn anchored_action(object: &SceneObject, start: i64) -> Option<Action> {
    let mut action = object.animation.clone()?;
    let frame = start as f64;

    for channel in Channel::iter() {
        let fallback = channel.component(&object.transform);
        match action.find_mut(channel) {
            Some(curve) if curve.has_keyframe_at(frame) => {}
            Some(curve) => {
                let value = curve.evaluate(frame).unwrap_or(fallback);
                let interpolation = curve
                    .keyframes
                    .iter()
                    .filter(|k| k.frame < frame)
                    .max_by(|a, b| a.frame.total_cmp(&b.frame))
                    .or_else(|| curve.keyframes.first())
                    .map(|k| k.interpolation)
                    .unwrap_or_default();
                curve.insert(KeyframePoint::new(frame, value, interpolation));
            }
            None => action.fcurves.push(FCurve::new(
                channel,
                vec![KeyframePoint::new(frame, fallback, Interpolation::Linear)],
            )),
        }
    }

    Some(action)
}

/// All sampled channels of one object, in source channel order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAnimation {
    pub channels: Vec<(Channel, ChannelSeries)>,
}

impl ResolvedAnimation {
    /// Sample an action. Channels without a curve are left out entirely.
    pub fn from_action(action: &Action, object: &SceneObject, policy: &SamplingPolicy) -> Self {
        let channels = Channel::iter()
            .filter_map(|channel| {
                let curve = action.find(channel)?;
                let fallback = channel.component(&object.transform);
                Some((channel, sample_channel(curve, channel, fallback, policy)))
            })
            .collect();
        Self { channels }
    }

    /// Anchor and sample an animated object. Returns `None` for unanimated objects.
    pub fn sample(object: &SceneObject, policy: &SamplingPolicy) -> Option<Self> {
        let action = anchored_action(object, policy.start)?;
        log::debug!(
            "Sampling {} curves of {} over frames {}..={}",
            action.fcurves.len(),
            object.name,
            policy.start,
            policy.end
        );
        Some(Self::from_action(&action, object, policy))
    }

    pub fn channel(&self, channel: Channel) -> Option<&ChannelSeries> {
        self.channels
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, series)| series)
    }

    /// `<animKeyframes>` with one element per sampled channel, named by its game axis.
    pub fn to_element(&self) -> Element {
        let mut element = Element::new("animKeyframes");
        for (channel, series) in &self.channels {
            let target = channel_target(*channel);
            push_element(&mut element, series.to_element(&target.element));
        }
        element
    }
}
