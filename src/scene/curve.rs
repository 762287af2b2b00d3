//! Animation curves attached to scene objects.
//!
//! Curves are evaluated directly so the sampler never has to move the scene frame cursor.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

/// The animated property a curve drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurvePath {
    Location,
    RotationEuler,
    Scale,
}

/// One scalar transform component, in source (host) axis order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
pub enum Channel {
    PosX,
    PosY,
    PosZ,
    RotX,
    RotY,
    RotZ,
    ScaleX,
    ScaleY,
    ScaleZ,
}

impl Channel {
    pub fn new(path: CurvePath, index: usize) -> Option<Self> {
        Self::iter().find(|c| c.path() == path && c.index() == index)
    }

    pub fn path(self) -> CurvePath {
        match self {
            Channel::PosX | Channel::PosY | Channel::PosZ => CurvePath::Location,
            Channel::RotX | Channel::RotY | Channel::RotZ => CurvePath::RotationEuler,
            Channel::ScaleX | Channel::ScaleY | Channel::ScaleZ => CurvePath::Scale,
        }
    }

    /// Axis index within the channel's vector property.
    pub fn index(self) -> usize {
        match self {
            Channel::PosX | Channel::RotX | Channel::ScaleX => 0,
            Channel::PosY | Channel::RotY | Channel::ScaleY => 1,
            Channel::PosZ | Channel::RotZ | Channel::ScaleZ => 2,
        }
    }

    /// The static value of this channel on a transform, used when no curve drives it.
    pub fn component(self, transform: &super::Transform) -> f64 {
        let v: DVec3 = match self.path() {
            CurvePath::Location => transform.location,
            CurvePath::RotationEuler => transform.rotation,
            CurvePath::Scale => transform.scale,
        };
        v[self.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    Constant,
    Linear,
    #[default]
    Bezier,
}

/// A keyframe point as `(frame, value)` with optional bezier handles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyframePoint {
    pub frame: f64,
    pub value: f64,
    #[serde(default)]
    pub interpolation: Interpolation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_left: Option<DVec2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_right: Option<DVec2>,
}

impl KeyframePoint {
    pub fn new(frame: f64, value: f64, interpolation: Interpolation) -> Self {
        Self {
            frame,
            value,
            interpolation,
            handle_left: None,
            handle_right: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FCurve {
    pub path: CurvePath,
    pub index: usize,
    #[serde(default)]
    pub keyframes: Vec<KeyframePoint>,
}

impl FCurve {
    pub fn new(channel: Channel, keyframes: Vec<KeyframePoint>) -> Self {
        Self {
            path: channel.path(),
            index: channel.index(),
            keyframes,
        }
    }

    pub fn channel(&self) -> Option<Channel> {
        Channel::new(self.path, self.index)
    }

    pub fn has_keyframe_at(&self, frame: f64) -> bool {
        self.keyframes.iter().any(|k| k.frame == frame)
    }

    /// Insert a keyframe keeping the points sorted by frame.
    pub fn insert(&mut self, point: KeyframePoint) {
        let position = self
            .keyframes
            .iter()
            .position(|k| k.frame > point.frame)
            .unwrap_or(self.keyframes.len());
        self.keyframes.insert(position, point);
    }

    /// Evaluate the curve at `frame`.
    ///
    /// Values outside the keyed range are held constant. Returns `None` for a curve with no points.
    pub fn evaluate(&self, frame: f64) -> Option<f64> {
        let mut points: Vec<&KeyframePoint> = self.keyframes.iter().collect();
        points.sort_by(|a, b| a.frame.total_cmp(&b.frame));

        let first = points.first()?;
        let last = points.last()?;
        if frame <= first.frame {
            return Some(first.value);
        }
        if frame >= last.frame {
            return Some(last.value);
        }

        let segment = points
            .windows(2)
            .find(|w| frame >= w[0].frame && frame <= w[1].frame)?;
        let (k0, k1) = (segment[0], segment[1]);
        if frame == k0.frame {
            return Some(k0.value);
        }
        if frame == k1.frame {
            return Some(k1.value);
        }

        let t = (frame - k0.frame) / (k1.frame - k0.frame);
        let value = match k0.interpolation {
            Interpolation::Constant => k0.value,
            Interpolation::Linear => k0.value + (k1.value - k0.value) * t,
            Interpolation::Bezier => evaluate_bezier_segment(k0, k1, frame),
        };
        Some(value)
    }
}

#[inline]
fn cubic_bezier(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Evaluate the 2D bezier between two keys by inverting x(t) = frame with bisection.
fn evaluate_bezier_segment(k0: &KeyframePoint, k1: &KeyframePoint, frame: f64) -> f64 {
    let span = k1.frame - k0.frame;
    let p0 = DVec2::new(k0.frame, k0.value);
    let p3 = DVec2::new(k1.frame, k1.value);
    let p1 = k0
        .handle_right
        .unwrap_or(DVec2::new(k0.frame + span / 3.0, k0.value));
    let p2 = k1
        .handle_left
        .unwrap_or(DVec2::new(k1.frame - span / 3.0, k1.value));

    // Handles past the neighbouring key would make x(t) non-monotonic
    let x1 = p1.x.clamp(p0.x, p3.x);
    let x2 = p2.x.clamp(p0.x, p3.x);

    let mut lo = 0.0f64;
    let mut hi = 1.0f64;
    let mut mid = (frame - p0.x) / span;
    for _ in 0..48 {
        let x = cubic_bezier(p0.x, x1, x2, p3.x, mid);
        if (x - frame).abs() < 1e-9 {
            break;
        }
        if x < frame {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(p0.y, p1.y, p2.y, p3.y, mid)
}

/// All curves animating one object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Action {
    #[serde(default)]
    pub fcurves: Vec<FCurve>,
}

impl Action {
    pub fn find(&self, channel: Channel) -> Option<&FCurve> {
        self.fcurves
            .iter()
            .find(|c| c.path == channel.path() && c.index == channel.index())
    }

    pub fn find_mut(&mut self, channel: Channel) -> Option<&mut FCurve> {
        self.fcurves
            .iter_mut()
            .find(|c| c.path == channel.path() && c.index == channel.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn linear(points: &[(f64, f64)]) -> FCurve {
        FCurve::new(
            Channel::PosX,
            points
                .iter()
                .map(|&(f, v)| KeyframePoint::new(f, v, Interpolation::Linear))
                .collect(),
        )
    }

    #[test]
    fn channel_round_trips_path_and_index() {
        for channel in Channel::iter() {
            assert_eq!(Some(channel), Channel::new(channel.path(), channel.index()));
        }
        assert_eq!(None, Channel::new(CurvePath::Scale, 3));
    }

    #[test]
    fn linear_segments_and_constant_extrapolation() {
        let curve = linear(&[(0.0, 0.0), (10.0, 5.0)]);
        assert_eq!(Some(0.0), curve.evaluate(-5.0));
        assert_abs_diff_eq!(2.5, curve.evaluate(5.0).unwrap());
        assert_eq!(Some(5.0), curve.evaluate(30.0));
    }

    #[test]
    fn constant_interpolation_holds_left_value() {
        let mut curve = linear(&[(0.0, 1.0), (10.0, 3.0)]);
        curve.keyframes[0].interpolation = Interpolation::Constant;
        assert_eq!(Some(1.0), curve.evaluate(9.99));
        assert_eq!(Some(3.0), curve.evaluate(10.0));
    }

    #[test]
    fn default_bezier_handles_ease_between_keys() {
        let mut curve = linear(&[(0.0, 0.0), (10.0, 10.0)]);
        for k in &mut curve.keyframes {
            k.interpolation = Interpolation::Bezier;
        }
        // Flat handles: symmetric ease, exact midpoint, slow start
        assert_abs_diff_eq!(5.0, curve.evaluate(5.0).unwrap(), epsilon = 1e-6);
        assert!(curve.evaluate(1.0).unwrap() < 1.0);
        assert!(curve.evaluate(9.0).unwrap() > 9.0);
    }

    #[test]
    fn bezier_with_collinear_handles_is_linear() {
        let mut curve = linear(&[(0.0, 0.0), (9.0, 9.0)]);
        curve.keyframes[0].interpolation = Interpolation::Bezier;
        curve.keyframes[0].handle_right = Some(DVec2::new(3.0, 3.0));
        curve.keyframes[1].handle_left = Some(DVec2::new(6.0, 6.0));
        assert_abs_diff_eq!(2.0, curve.evaluate(2.0).unwrap(), epsilon = 1e-6);
    }

    #[test]
    fn empty_curve_has_no_value() {
        assert_eq!(None, linear(&[]).evaluate(0.0));
    }

    #[test]
    fn insert_keeps_frames_sorted() {
        let mut curve = linear(&[(0.0, 0.0), (10.0, 1.0)]);
        curve.insert(KeyframePoint::new(5.0, 0.5, Interpolation::Linear));
        let frames: Vec<f64> = curve.keyframes.iter().map(|k| k.frame).collect();
        assert_eq!(vec![0.0, 5.0, 10.0], frames);
        assert!(curve.has_keyframe_at(5.0));
    }
}
