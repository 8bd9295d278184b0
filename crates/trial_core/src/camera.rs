//! Capture camera placement.
//!
//! The camera sits on the line from the start/target midpoint toward the
//! world origin, far enough out that both endpoints stay in frame.

use serde::{Deserialize, Serialize};

use crate::geometry::{distance, ground_midpoint, try_normalize, Position, Vec3};

/// Where the camera goes for one trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPlacement {
    pub position: Position,
    pub look_at: Position,
    /// True when the midpoint coincided with the origin and the fallback
    /// direction was used.
    pub used_fallback: bool,
}

/// Derive the camera placement from the trial endpoints.
///
/// `margin` is added to the start/target distance; `height` replaces the
/// vertical component. Both are sampled by the caller.
pub fn place_camera(start: &Vec3, target: &Vec3, margin: f32, height: f32) -> CameraPlacement {
    let mid = ground_midpoint(start, target);
    let d = distance(start, target);

    let (dir, used_fallback) = match try_normalize(&(-mid)) {
        Some(dir) => (dir, false),
        None => (fallback_direction(start, target), true),
    };

    let mut position = mid + dir * (d + margin);
    position.y = height;

    CameraPlacement { position: position.into(), look_at: mid.into(), used_fallback }
}

/// Ground-plane perpendicular of `start -> target`, or `+z` if that is
/// degenerate too.
fn fallback_direction(start: &Vec3, target: &Vec3) -> Vec3 {
    let along = target - start;
    try_normalize(&Vec3::new(along.z, 0.0, -along.x)).unwrap_or_else(Vec3::z)
}
