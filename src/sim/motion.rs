//! Motion primitives
//!
//! Pure helpers shared by both controllers. Angles are in degrees,
//! measured counter-clockwise from +X.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{delta_degrees, normalize_degrees};

/// Stable handle for an actor in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

/// Position and orientation of an actor
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec2,
    /// Orientation (degrees)
    pub angle: f32,
}

impl Pose {
    pub fn new(position: Vec2, angle: f32) -> Self {
        Self { position, angle }
    }

    /// Unit vector along the actor's local +X axis
    #[inline]
    pub fn forward(&self) -> Vec2 {
        heading(self.angle)
    }

    /// Transform a point from this pose's local frame to world space
    pub fn local_to_world(&self, local: Vec2) -> Vec2 {
        self.position + self.forward().rotate(local)
    }
}

/// Unit vector for an angle in degrees
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::from_angle(angle.to_radians())
}

/// Angle of a vector in degrees, in (-180, 180]
#[inline]
pub fn angle_of(v: Vec2) -> f32 {
    let deg = v.y.atan2(v.x).to_degrees();
    // atan2 yields -180 for (-x, -0.0)
    if deg <= -180.0 { deg + 360.0 } else { deg }
}

/// Advance `current` toward `target` by at most `max_delta`, never overshooting
pub fn move_towards(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let to_target = target - current;
    let dist = to_target.length();
    if dist <= max_delta || dist == 0.0 {
        target
    } else {
        current + to_target / dist * max_delta
    }
}

/// Scalar version of [`move_towards`]
pub fn move_towards_scalar(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Rotate `current` toward `target` (degrees) along the short way by at most `max_delta`
pub fn move_towards_angle(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = delta_degrees(current, target);
    normalize_degrees(current + delta.clamp(-max_delta, max_delta))
}

/// Euclidean distance; the one measure used for scare, catch and planner checks
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Uniform sample in `[min, max)`; returns `min` for an empty range
pub fn random_in_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_move_towards_clamps_to_target() {
        let p = move_towards(Vec2::ZERO, Vec2::new(0.5, 0.0), 1.0);
        assert_eq!(p, Vec2::new(0.5, 0.0));
    }

    #[test]
    fn test_move_towards_partial_step() {
        let p = move_towards(Vec2::ZERO, Vec2::new(10.0, 0.0), 2.0);
        assert_eq!(p, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_move_towards_scalar_both_directions() {
        assert_eq!(move_towards_scalar(0.0, 1.0, 0.25), 0.25);
        assert_eq!(move_towards_scalar(1.0, 0.0, 0.25), 0.75);
        assert_eq!(move_towards_scalar(0.9, 1.0, 0.25), 1.0);
    }

    #[test]
    fn test_angle_of_quadrants() {
        assert_eq!(angle_of(Vec2::X), 0.0);
        assert!((angle_of(Vec2::Y) - 90.0).abs() < 1e-4);
        assert!((angle_of(Vec2::new(-1.0, 0.0)) - 180.0).abs() < 1e-4);
        assert!((angle_of(Vec2::new(0.0, -1.0)) + 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_local_to_world_rotates_offset() {
        let pose = Pose::new(Vec2::new(1.0, 1.0), 90.0);
        let p = pose.local_to_world(Vec2::new(0.0, -0.5));
        // Local -Y points along world +X when rotated by 90 degrees
        assert!((p - Vec2::new(1.5, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_move_towards_angle_short_way() {
        assert_eq!(move_towards_angle(170.0, -170.0, 5.0), 175.0);
        assert_eq!(move_towards_angle(0.0, 30.0, 45.0), 30.0);
    }

    #[test]
    fn test_random_in_range_empty() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(random_in_range(&mut rng, 2.0, 2.0), 2.0);
        let v = random_in_range(&mut rng, 0.0, 360.0);
        assert!((0.0..360.0).contains(&v));
    }

    proptest! {
        #[test]
        fn prop_move_towards_never_overshoots(
            cx in -100.0f32..100.0, cy in -100.0f32..100.0,
            tx in -100.0f32..100.0, ty in -100.0f32..100.0,
            step in 0.0f32..50.0,
        ) {
            let current = Vec2::new(cx, cy);
            let target = Vec2::new(tx, ty);
            let next = move_towards(current, target, step);
            prop_assert!(next.distance(current) <= step + 1e-3);
            prop_assert!(next.distance(target) <= current.distance(target) + 1e-3);
        }

        #[test]
        fn prop_angle_of_in_range(x in -10.0f32..10.0, y in -10.0f32..10.0) {
            let a = angle_of(Vec2::new(x, y));
            prop_assert!(a > -180.0 && a <= 180.0);
        }
    }
}
