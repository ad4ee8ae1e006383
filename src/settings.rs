//! Simulation settings
//!
//! One `Settings` value is built at startup and handed to every controller by
//! reference. Nothing here changes once the simulation runs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::SIM_DT;
use crate::error::{Result, SimError};

/// What the player does while in the fast-move state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FastPolicy {
    /// Hold position until the next dive
    #[default]
    Hold,
    /// Keep moving at current speed, turning toward the pointer at a capped rate
    Coast,
}

impl FastPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FastPolicy::Hold => "Hold",
            FastPolicy::Coast => "Coast",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hold" => Some(FastPolicy::Hold),
            "coast" => Some(FastPolicy::Coast),
            _ => None,
        }
    }
}

/// Player tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerMotionParams {
    /// Top speed (world units per tick)
    pub max_speed: f32,
    /// Slow speed as a fraction of `max_speed`; also the slow→fast threshold
    pub slow_speed_ratio: f32,
    /// Maximum speed change per tick
    pub speed_increment: f32,
    /// Pointer magnitude fraction above which the player requests `max_speed`
    pub fast_trigger: f32,
    /// Pointer magnitude fraction above which the player requests slow speed
    pub slow_trigger: f32,
    /// Fraction of the heading error turned per tick while coasting
    pub fast_rotate_speed: f32,
    /// Cap on the heading change per tick while coasting (degrees)
    pub fast_rotate_max: f32,
    /// Dive length in seconds
    pub dive_duration: f32,
    /// Lockout after a dive in seconds
    pub dive_recovery_duration: f32,
    /// Distance covered by a dive
    pub dive_distance: f32,
    pub fast_policy: FastPolicy,
}

impl Default for PlayerMotionParams {
    fn default() -> Self {
        Self {
            max_speed: 0.10,
            slow_speed_ratio: 0.66,
            speed_increment: 0.0025,
            fast_trigger: 0.6,
            slow_trigger: 0.06,
            fast_rotate_speed: 0.2,
            fast_rotate_max: 10.0,
            dive_duration: 0.3,
            dive_recovery_duration: 0.5,
            dive_distance: 3.0,
            fast_policy: FastPolicy::Hold,
        }
    }
}

impl PlayerMotionParams {
    /// Slow cruising speed, also the slow→fast threshold
    #[inline]
    pub fn slow_speed(&self) -> f32 {
        self.max_speed * self.slow_speed_ratio
    }

    /// Dive speed in world units per second
    #[inline]
    pub fn dive_speed(&self) -> f32 {
        self.dive_distance / self.dive_duration
    }

    pub fn validate(&self) -> Result<()> {
        positive("player.max_speed", self.max_speed)?;
        positive("player.speed_increment", self.speed_increment)?;
        positive("player.dive_duration", self.dive_duration)?;
        non_negative("player.dive_recovery_duration", self.dive_recovery_duration)?;
        non_negative("player.dive_distance", self.dive_distance)?;
        non_negative("player.fast_rotate_max", self.fast_rotate_max)?;
        if !(0.0..=1.0).contains(&self.slow_speed_ratio) {
            return Err(SimError::config(
                "player.slow_speed_ratio",
                format!("{} is outside [0, 1]", self.slow_speed_ratio),
            ));
        }
        if !(0.0..=1.0).contains(&self.fast_rotate_speed) {
            return Err(SimError::config(
                "player.fast_rotate_speed",
                format!("{} is outside [0, 1]", self.fast_rotate_speed),
            ));
        }
        if self.slow_trigger < 0.0 || self.slow_trigger > self.fast_trigger {
            return Err(SimError::config(
                "player.slow_trigger",
                format!(
                    "{} must lie in [0, fast_trigger = {}]",
                    self.slow_trigger, self.fast_trigger
                ),
            ));
        }
        Ok(())
    }
}

/// Target (evader) tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetMotionParams {
    /// Hop length in seconds
    pub hop_duration: f32,
    /// Hop speed in world units per second
    pub hop_speed: f32,
    /// Flee trigger radius and hop safety margin
    pub scared_distance: f32,
    /// Hard cap on candidate samples per hop
    pub max_placement_attempts: u32,
}

impl Default for TargetMotionParams {
    fn default() -> Self {
        Self {
            hop_duration: 0.2,
            hop_speed: 6.5,
            scared_distance: 3.0,
            max_placement_attempts: 50,
        }
    }
}

impl TargetMotionParams {
    #[inline]
    pub fn hop_length(&self) -> f32 {
        self.hop_duration * self.hop_speed
    }

    pub fn validate(&self) -> Result<()> {
        positive("target.hop_duration", self.hop_duration)?;
        non_negative("target.hop_speed", self.hop_speed)?;
        non_negative("target.scared_distance", self.scared_distance)
    }
}

/// Headless world tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldParams {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Player/target overlap radius used by the built-in overlap detector
    pub catch_radius: f32,
    /// Fixed timestep in seconds
    pub fixed_dt: f32,
}

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            catch_radius: 0.5,
            fixed_dt: SIM_DT,
        }
    }
}

impl WorldParams {
    pub fn validate(&self) -> Result<()> {
        positive("world.fixed_dt", self.fixed_dt)?;
        non_negative("world.catch_radius", self.catch_radius)
    }
}

/// Simulation-wide settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub player: PlayerMotionParams,
    pub target: TargetMotionParams,
    pub world: WorldParams,
}

impl Settings {
    /// Parse and validate settings from JSON; missing fields take defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        log::debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    /// Read settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        log::info!("Loading settings from {}", path.display());
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.player.validate()?;
        self.target.validate()?;
        self.world.validate()
    }
}

fn positive(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::config(field, format!("{value} must be > 0")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::config(field, format!("{value} must be >= 0")))
    }
}
