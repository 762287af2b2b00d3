//! Race track paths: a polyline resampled to the fixed number of samples the game reads.

use glam::DVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{ExportError, Result};

pub const TRACK_PATH_SAMPLES: usize = 101;

/// Resample a polyline to exactly [`TRACK_PATH_SAMPLES`] points.
///
/// Every segment is first split evenly; the remaining points are midpoints inserted into
/// random segments. The random choice is seeded from the object name so re-exports match.
pub fn resample_track_path(object: &str, points: &[DVec3]) -> Result<Vec<DVec3>> {
    let count = points.len();
    if count > TRACK_PATH_SAMPLES {
        return Err(ExportError::TrackPathTooLong {
            object: object.to_string(),
            count,
            max: TRACK_PATH_SAMPLES,
        });
    }
    if count < 2 {
        return Err(ExportError::TrackPathTooShort {
            object: object.to_string(),
            count,
        });
    }

    // Smallest split count that reaches the sample count
    let mut subdivisions = 1;
    while count + subdivisions * (count - 1) < TRACK_PATH_SAMPLES {
        subdivisions += 1;
    }

    let mut path = Vec::with_capacity(TRACK_PATH_SAMPLES);
    for segment in points.windows(2) {
        path.push(segment[0]);
        for step in 1..subdivisions {
            path.push(segment[0].lerp(segment[1], step as f64 / subdivisions as f64));
        }
    }
    path.push(points[count - 1]);

    let mut rng = StdRng::seed_from_u64(name_seed(object));
    while path.len() < TRACK_PATH_SAMPLES {
        let index = rng.gen_range(0..path.len() - 1);
        let midpoint = path[index].lerp(path[index + 1], 0.5);
        path.insert(index + 1, midpoint);
    }

    Ok(path)
}

/// Symmetric tangents: the mean of the forward and backward differences, zero at both ends.
pub fn tangents(values: &[f64]) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            if i == 0 || i + 1 >= values.len() {
                0.0
            } else {
                (values[i + 1] - values[i - 1]) / 2.0
            }
        })
        .collect()
}

// FNV-1a
fn name_seed(name: &str) -> u64 {
    name.bytes().fold(0xcbf29ce484222325, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x100000001b3)
    })
}
