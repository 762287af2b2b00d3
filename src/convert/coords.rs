//! Conversions between the host editor frame (X right, Y forward, Z up, radians)
//! and the game frame (X right, Y up, Z forward, degrees).
//!
//! Both the static transform fragments and the animation channel sampler go through this
//! module, so the two can never disagree about axis order or sign.

use glam::DVec3;

use crate::scene::{Channel, CurvePath};

/// Convert Z-up to Y-up: swap Y and Z, negate the new Z.
pub fn to_target_position(p: DVec3) -> DVec3 {
    DVec3::new(p.x, p.z, -p.y)
}

/// Permute an XZY Euler triple into the game frame, without unit conversion.
/// Rotation about the source Y axis becomes rotation about the game Z axis and flips sign.
pub fn to_target_rotation_axes(r: DVec3) -> DVec3 {
    DVec3::new(r.x, r.z, -r.y)
}

/// Permute and convert an XZY Euler triple in radians to game-frame degrees.
pub fn to_target_rotation(r: DVec3) -> DVec3 {
    let r = to_target_rotation_axes(r);
    DVec3::new(r.x.to_degrees(), r.y.to_degrees(), r.z.to_degrees())
}

/// Scale is unsigned, so only the axes swap.
pub fn to_target_scale(s: DVec3) -> DVec3 {
    DVec3::new(s.x, s.z, s.y)
}

pub fn from_target_position(p: DVec3) -> DVec3 {
    DVec3::new(p.x, -p.z, p.y)
}

/// Game-frame degrees back to a host XZY Euler triple in radians.
pub fn from_target_rotation(r: DVec3) -> DVec3 {
    DVec3::new(r.x.to_radians(), (-r.z).to_radians(), r.y.to_radians())
}

pub fn from_target_scale(s: DVec3) -> DVec3 {
    DVec3::new(s.x, s.z, s.y)
}

const AXIS_NAMES: [&str; 3] = ["X", "Y", "Z"];

/// Where a source channel lands in the game frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelTarget {
    /// Keyframe list element name, e.g. `posZ` for the source Y location.
    pub element: String,
    pub sign: f64,
    pub degrees: bool,
}

/// Derive the game-frame element and sign of a channel by pushing a unit vector through the
/// same conversion used for static transforms.
pub fn channel_target(channel: Channel) -> ChannelTarget {
    let mut unit = DVec3::ZERO;
    unit[channel.index()] = 1.0;

    let (prefix, converted, degrees) = match channel.path() {
        CurvePath::Location => ("pos", to_target_position(unit), false),
        CurvePath::RotationEuler => ("rot", to_target_rotation_axes(unit), true),
        CurvePath::Scale => ("scale", to_target_scale(unit), false),
    };

    let axis = (0..3)
        .find(|&i| converted[i] != 0.0)
        .unwrap_or(channel.index());

    ChannelTarget {
        element: format!("{}{}", prefix, AXIS_NAMES[axis]),
        sign: converted[axis],
        degrees,
    }
}

/// Convert one raw host channel value into the game frame.
pub fn channel_value(channel: Channel, raw: f64) -> f64 {
    let target = channel_target(channel);
    let value = if target.degrees { raw.to_degrees() } else { raw };
    value * target.sign
}
