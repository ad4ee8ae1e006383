//! Deterministic simulation module
//!
//! All chase logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by actor ID)
//! - No rendering or platform dependencies

pub mod evasion;
pub mod motion;
pub mod player;
pub mod target;
pub mod tick;
pub mod visual;
pub mod world;

pub use evasion::{Bounds, EvasionPlanner, HopPlan, PlanOutcome};
pub use motion::{
    ActorId, Pose, angle_of, distance, heading, move_towards, move_towards_angle,
    move_towards_scalar, random_in_range,
};
pub use player::{PlayerController, PlayerRuntime, PlayerState};
pub use target::{AttachRequest, TargetController, TargetRuntime, TargetState, Threat};
pub use tick::{FrameClock, TickInput, overlapping, tick};
pub use visual::{PLAYER_COLORS, Rgb, TARGET_COLORS, VisualState};
pub use world::{
    ActorSnapshot, Attachments, ChaseWorld, ChaseWorldBuilder, GameEvent, WorldSnapshot,
};
