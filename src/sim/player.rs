//! Player controller
//!
//! Moves toward the pointer, speeds up with distance and lunges forward on a
//! dive request. A dive is followed by a recovery lockout before control
//! returns.

use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::motion::{ActorId, Pose, angle_of, move_towards, move_towards_angle, move_towards_scalar};
use super::tick::{FrameClock, TickInput};
use crate::error::{ActorKind, Result, SimError};
use crate::settings::{FastPolicy, PlayerMotionParams, Settings};

/// Player motion state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum PlayerState {
    /// Steering toward the pointer, accelerating up to the fast threshold
    MovingSlow = 0,
    /// Past the fast threshold; only a dive leaves this state
    MovingFast = 1,
    Diving = 2,
    /// Post-dive lockout, no movement
    Recovering = 3,
}

impl PlayerState {
    pub const COUNT: usize = 4;

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerState::MovingSlow => "MovingSlow",
            PlayerState::MovingFast => "MovingFast",
            PlayerState::Diving => "Diving",
            PlayerState::Recovering => "Recovering",
        }
    }

    /// A dive may only start from one of the moving states
    #[inline]
    pub fn can_dive(&self) -> bool {
        matches!(self, PlayerState::MovingSlow | PlayerState::MovingFast)
    }
}

impl TryFrom<u8> for PlayerState {
    type Error = SimError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(PlayerState::MovingSlow),
            1 => Ok(PlayerState::MovingFast),
            2 => Ok(PlayerState::Diving),
            3 => Ok(PlayerState::Recovering),
            _ => Err(SimError::InvalidState {
                actor: ActorKind::Player,
                code,
            }),
        }
    }
}

/// Per-tick mutable motion values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerRuntime {
    pub current_speed: f32,
    pub current_angle: f32,
    pub target_speed: f32,
    pub target_angle: f32,
    pub dive_start_position: Vec2,
    pub dive_end_position: Vec2,
    pub dive_start_time: f32,
}

#[derive(Debug, Clone)]
pub struct PlayerController {
    id: ActorId,
    settings: Arc<Settings>,
    pose: Pose,
    state: PlayerState,
    runtime: PlayerRuntime,
}

impl PlayerController {
    pub fn new(id: ActorId, settings: Arc<Settings>, pose: Pose) -> Self {
        Self {
            id,
            settings,
            pose,
            state: PlayerState::MovingSlow,
            runtime: PlayerRuntime {
                current_angle: pose.angle,
                target_angle: pose.angle,
                ..Default::default()
            },
        }
    }

    #[inline]
    pub fn id(&self) -> ActorId {
        self.id
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        self.pose
    }

    #[inline]
    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn runtime(&self) -> &PlayerRuntime {
        &self.runtime
    }

    #[inline]
    fn params(&self) -> &PlayerMotionParams {
        &self.settings.player
    }

    /// The only thing other actors may ask of the player
    #[inline]
    pub fn is_diving(&self) -> bool {
        self.state == PlayerState::Diving
    }

    /// Advance one fixed step
    pub fn tick(&mut self, clock: &FrameClock, input: &TickInput) {
        // Checked first so a dive starts this very tick
        if input.dive_requested && self.state.can_dive() {
            self.transition(PlayerState::Diving, clock);
        }
        self.on_tick(clock, input);
    }

    /// Overwrite the state from a raw code (snapshots, debug tools).
    /// Unknown codes are logged and leave the controller untouched.
    pub fn restore_state(&mut self, code: u8) -> Result<()> {
        match PlayerState::try_from(code) {
            Ok(state) => {
                self.state = state;
                Ok(())
            }
            Err(err) => {
                log::warn!("Unknown player state reached: {err}");
                Err(err)
            }
        }
    }

    fn transition(&mut self, next: PlayerState, clock: &FrameClock) {
        log::debug!(
            "Player {:?}: {} -> {} at t={:.3}",
            self.id,
            self.state.as_str(),
            next.as_str(),
            clock.now
        );
        self.state = next;
        self.on_enter(next, clock);
    }

    fn on_enter(&mut self, state: PlayerState, clock: &FrameClock) {
        match state {
            PlayerState::Diving => {
                self.runtime.current_speed = 0.0;
                self.runtime.dive_start_position = self.pose.position;
                self.runtime.dive_end_position =
                    self.pose.position - self.pose.forward() * self.params().dive_distance;
                self.runtime.dive_start_time = clock.now;
            }
            PlayerState::MovingSlow | PlayerState::MovingFast | PlayerState::Recovering => {}
        }
    }

    fn on_tick(&mut self, clock: &FrameClock, input: &TickInput) {
        match self.state {
            PlayerState::MovingSlow => {
                self.update_direction_and_speed(input);
                let runtime = &mut self.runtime;
                runtime.current_speed = move_towards_scalar(
                    runtime.current_speed,
                    runtime.target_speed,
                    self.settings.player.speed_increment,
                );
                runtime.current_angle = runtime.target_angle;
                self.pose.angle = runtime.target_angle;
                self.step_backward(self.runtime.current_speed);

                if self.runtime.current_speed > self.params().slow_speed() {
                    self.transition(PlayerState::MovingFast, clock);
                }
            }
            PlayerState::MovingFast => {
                let policy = self.params().fast_policy;
                match policy {
                    FastPolicy::Hold => {}
                    FastPolicy::Coast => self.coast(input),
                }
            }
            PlayerState::Diving => {
                let step = clock.dt * self.params().dive_speed();
                self.pose.position =
                    move_towards(self.pose.position, self.runtime.dive_end_position, step);

                if clock.now >= self.runtime.dive_start_time + self.params().dive_duration {
                    self.transition(PlayerState::Recovering, clock);
                }
            }
            PlayerState::Recovering => {
                let params = self.params();
                let lockout_end = self.runtime.dive_start_time
                    + params.dive_duration
                    + params.dive_recovery_duration;
                if clock.now >= lockout_end {
                    self.transition(PlayerState::MovingSlow, clock);
                }
            }
        }
    }

    /// Pointer offset in world space (player minus pointer)
    fn pointer_offset(&self, input: &TickInput) -> Vec2 {
        self.pose.position - input.pointer
    }

    fn update_direction_and_speed(&mut self, input: &TickInput) {
        let offset = self.pointer_offset(input);
        self.runtime.target_angle = angle_of(offset);

        let extent = input.pointer_extents.length();
        let magnitude = if extent > f32::EPSILON {
            offset.length() / extent
        } else {
            0.0
        };

        let params = &self.settings.player;
        self.runtime.target_speed = if magnitude > params.fast_trigger {
            params.max_speed
        } else if magnitude > params.slow_trigger {
            params.slow_speed()
        } else {
            0.0
        };
    }

    /// Keep the current speed, bending the heading toward the pointer
    fn coast(&mut self, input: &TickInput) {
        let desired = angle_of(self.pointer_offset(input));
        let params = self.params();
        let error = crate::delta_degrees(self.pose.angle, desired);
        let max_turn = (error.abs() * params.fast_rotate_speed).min(params.fast_rotate_max);
        let angle = move_towards_angle(self.pose.angle, desired, max_turn);

        self.pose.angle = angle;
        self.runtime.current_angle = angle;
        self.step_backward(self.runtime.current_speed);
    }

    /// Translate along -forward (toward the pointer) by at most `speed`
    fn step_backward(&mut self, speed: f32) {
        let position = self.pose.position;
        self.pose.position = move_towards(position, position - self.pose.forward(), speed);
    }
}
