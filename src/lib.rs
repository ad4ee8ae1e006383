//! Hop Chase - chase-and-catch simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion primitives, evasion planning, controllers)
//! - `settings`: Simulation-wide tunables
//! - `error`: Construction/configuration failures

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{Result, SimError};
pub use settings::{FastPolicy, PlayerMotionParams, Settings, TargetMotionParams, WorldParams};

/// Simulation configuration constants
pub mod consts {
    use glam::Vec2;

    /// Fixed simulation timestep (50 Hz, the classic fixed-update rate)
    pub const SIM_DT: f32 = 1.0 / 50.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Local offset of a caught target under the player
    pub const ATTACH_OFFSET: Vec2 = Vec2::new(0.0, -0.5);

    /// Distance below which a mover counts as arrived
    pub const ARRIVAL_EPSILON: f32 = 1e-3;
}

/// Normalize an angle in degrees to (-180, 180]. Non-finite input maps to 0.
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 { wrapped - 360.0 } else { wrapped }
}

/// Shortest signed difference `to - from` in degrees, in (-180, 180]
#[inline]
pub fn delta_degrees(from: f32, to: f32) -> f32 {
    normalize_degrees(to - from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(180.0), 180.0);
        assert_eq!(normalize_degrees(-180.0), 180.0);
        assert_eq!(normalize_degrees(270.0), -90.0);
        assert_eq!(normalize_degrees(-450.0), -90.0);
        assert_eq!(normalize_degrees(540.0), 180.0);
    }

    #[test]
    fn test_normalize_degrees_huge_and_non_finite() {
        let huge = normalize_degrees(1.0e10);
        assert!(huge > -180.0 && huge <= 180.0);
        let negative = normalize_degrees(-1.0e10);
        assert!(negative > -180.0 && negative <= 180.0);
        assert_eq!(normalize_degrees(f32::INFINITY), 0.0);
        assert_eq!(normalize_degrees(f32::NEG_INFINITY), 0.0);
        assert_eq!(normalize_degrees(f32::NAN), 0.0);
        assert_eq!(delta_degrees(0.0, f32::INFINITY), 0.0);
    }

    #[test]
    fn test_delta_degrees_wraps() {
        assert_eq!(delta_degrees(170.0, -170.0), 20.0);
        assert_eq!(delta_degrees(-170.0, 170.0), -20.0);
        assert_eq!(delta_degrees(10.0, 40.0), 30.0);
    }
}
