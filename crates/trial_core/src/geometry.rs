//! World-space points and the few ground-plane helpers the planner needs.
//!
//! The backend is y-up: x/z span the floor, y is height.

use nalgebra as na;
use rand::Rng;
use rand_distr::{Distribution, UnitDisc};
use serde::{Deserialize, Serialize};

/// 3D point / vector alias.
pub type Vec3 = na::Vector3<f32>;

/// Below this length a direction is treated as undefined.
pub const DIRECTION_EPSILON: f32 = 1e-6;

/// Backend wire form of a point: `{"x": .., "y": .., "z": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const ZERO: Position = Position { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Same value on every axis (uniform scale factors).
    pub fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }
}

impl From<Vec3> for Position {
    fn from(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

impl From<Position> for Vec3 {
    fn from(p: Position) -> Self {
        Vec3::new(p.x, p.y, p.z)
    }
}

#[inline]
pub fn distance(a: &Vec3, b: &Vec3) -> f32 {
    (a - b).norm()
}

/// Midpoint of `a` and `b` on the ground plane.
#[inline]
pub fn ground_midpoint(a: &Vec3, b: &Vec3) -> Vec3 {
    Vec3::new((a.x + b.x) / 2.0, 0.0, (a.z + b.z) / 2.0)
}

/// Unit vector, or `None` when `v` is too short to normalize.
#[inline]
pub fn try_normalize(v: &Vec3) -> Option<Vec3> {
    v.try_normalize(DIRECTION_EPSILON)
}

/// Area-uniform random point in the ground-plane disk around `center`.
///
/// `UnitDisc` samples by rejection, so the density is flat over the area
/// rather than over the radius.
pub fn random_point_in_disk<R: Rng + ?Sized>(center: &Vec3, radius: f32, rng: &mut R) -> Vec3 {
    let [dx, dz]: [f32; 2] = UnitDisc.sample(rng);
    Vec3::new(center.x + dx * radius, center.y, center.z + dz * radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_ground_midpoint_drops_height() {
        let mid = ground_midpoint(&Vec3::new(1.0, 2.0, 4.0), &Vec3::new(3.0, 5.0, -2.0));
        assert_eq!(mid, Vec3::new(2.0, 0.0, 1.0));
    }

    #[test]
    fn test_try_normalize_zero_vector() {
        assert!(try_normalize(&Vec3::zeros()).is_none());
        let unit = try_normalize(&Vec3::new(0.0, 0.0, -3.0)).unwrap();
        assert!((unit.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_disk_point_stays_on_center_height() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let center = Vec3::new(2.0, 0.25, -1.0);
        for _ in 0..500 {
            let p = random_point_in_disk(&center, 0.5, &mut rng);
            assert_eq!(p.y, 0.25);
            assert!(distance(&p, &center) <= 0.5 + 1e-6);
        }
    }

    #[test]
    fn test_position_round_trip_through_vec3() {
        let v = Vec3::new(1.5, -0.25, 3.0);
        let p = Position::from(v);
        assert_eq!(Vec3::from(p), v);
        assert_eq!(serde_json::to_string(&p).unwrap(), r#"{"x":1.5,"y":-0.25,"z":3.0}"#);
    }
}
