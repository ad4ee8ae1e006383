//! Target (evader) controller
//!
//! Sits still until the player comes within the scared distance, then plans a
//! hop away and travels it. A diving player touching the target catches it for
//! good: the target asks to be attached under the player and never moves on
//! its own again.

use std::sync::Arc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::evasion::{Bounds, EvasionPlanner, HopPlan, PlanOutcome};
use super::motion::{ActorId, Pose, angle_of, distance, move_towards};
use super::player::PlayerController;
use super::tick::FrameClock;
use crate::consts::{ARRIVAL_EPSILON, ATTACH_OFFSET};
use crate::error::{ActorKind, Result, SimError};
use crate::settings::{Settings, TargetMotionParams};

/// Read-only view of whatever the target flees from
pub trait Threat {
    fn id(&self) -> ActorId;
    fn pose(&self) -> Pose;
    fn is_diving(&self) -> bool;

    fn position(&self) -> Vec2 {
        self.pose().position
    }
}

impl Threat for PlayerController {
    fn id(&self) -> ActorId {
        PlayerController::id(self)
    }

    fn pose(&self) -> Pose {
        PlayerController::pose(self)
    }

    fn is_diving(&self) -> bool {
        PlayerController::is_diving(self)
    }
}

/// Target motion state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TargetState {
    Idle = 0,
    /// One-shot planning step
    HopStart = 1,
    Hop = 2,
    /// Terminal; attached to the player
    Caught = 3,
}

impl TargetState {
    pub const COUNT: usize = 4;

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetState::Idle => "Idle",
            TargetState::HopStart => "HopStart",
            TargetState::Hop => "Hop",
            TargetState::Caught => "Caught",
        }
    }
}

impl TryFrom<u8> for TargetState {
    type Error = SimError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(TargetState::Idle),
            1 => Ok(TargetState::HopStart),
            2 => Ok(TargetState::Hop),
            3 => Ok(TargetState::Caught),
            _ => Err(SimError::InvalidState {
                actor: ActorKind::Target,
                code,
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetRuntime {
    pub hop_start_time: f32,
    pub hop_start_position: Vec2,
    pub hop_end_position: Vec2,
    /// Outcome of the most recent plan
    pub last_plan: Option<PlanOutcome>,
}

/// Request for the scene graph to parent `child` under `parent`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttachRequest {
    pub child: ActorId,
    pub parent: ActorId,
    pub local_offset: Vec2,
}

#[derive(Debug, Clone)]
pub struct TargetController {
    id: ActorId,
    threat: ActorId,
    settings: Arc<Settings>,
    planner: EvasionPlanner,
    rng: Pcg32,
    pose: Pose,
    state: TargetState,
    runtime: TargetRuntime,
}

impl TargetController {
    /// `threat` is the player this target flees from; `seed` drives hop placement
    pub fn new(
        id: ActorId,
        threat: ActorId,
        settings: Arc<Settings>,
        pose: Pose,
        seed: u64,
    ) -> Self {
        Self {
            id,
            threat,
            planner: EvasionPlanner::from_params(&settings.target),
            settings,
            rng: Pcg32::seed_from_u64(seed),
            pose,
            state: TargetState::Idle,
            runtime: TargetRuntime {
                hop_start_position: pose.position,
                hop_end_position: pose.position,
                ..Default::default()
            },
        }
    }

    #[inline]
    pub fn id(&self) -> ActorId {
        self.id
    }

    #[inline]
    pub fn threat_id(&self) -> ActorId {
        self.threat
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        self.pose
    }

    #[inline]
    pub fn state(&self) -> TargetState {
        self.state
    }

    pub fn runtime(&self) -> &TargetRuntime {
        &self.runtime
    }

    #[inline]
    pub fn is_caught(&self) -> bool {
        self.state == TargetState::Caught
    }

    #[inline]
    fn params(&self) -> &TargetMotionParams {
        &self.settings.target
    }

    /// Advance one fixed step. Returns the hop plan when one was made this tick.
    pub fn tick<T: Threat>(
        &mut self,
        clock: &FrameClock,
        threat: &T,
        bounds: &Bounds,
    ) -> Option<HopPlan> {
        if threat.id() != self.threat {
            log::warn!(
                "Target {:?} ticked against {:?}, expected {:?}; skipping",
                self.id,
                threat.id(),
                self.threat
            );
            return None;
        }
        self.on_tick(clock, threat, bounds)
    }

    /// Overlap callback from the physics collaborator, delivered every tick
    /// the two actors touch. A diving threat catches the target.
    pub fn on_overlap_persist<T: Threat>(
        &mut self,
        other: ActorId,
        threat: &T,
        clock: &FrameClock,
    ) -> Option<AttachRequest> {
        if self.state == TargetState::Caught || other != self.threat || threat.id() != other {
            return None;
        }
        if !threat.is_diving() {
            return None;
        }

        self.transition(TargetState::Caught, clock);
        Some(AttachRequest {
            child: self.id,
            parent: other,
            local_offset: ATTACH_OFFSET,
        })
    }

    /// Kinematic follow while attached; called by the scene graph, not by `tick`
    pub fn follow(&mut self, parent: &Pose, local_offset: Vec2) {
        self.pose = Pose::new(parent.local_to_world(local_offset), parent.angle);
    }

    /// Overwrite the state from a raw code. Unknown codes are logged and
    /// ignored. Nothing leaves `Caught`.
    pub fn restore_state(&mut self, code: u8) -> Result<()> {
        let state = TargetState::try_from(code).inspect_err(|err| {
            log::warn!("Unknown target state reached: {err}");
        })?;
        if self.state != TargetState::Caught {
            self.state = state;
        }
        Ok(())
    }

    fn transition(&mut self, next: TargetState, clock: &FrameClock) {
        log::debug!(
            "Target {:?}: {} -> {} at t={:.3}",
            self.id,
            self.state.as_str(),
            next.as_str(),
            clock.now
        );
        self.state = next;
        self.on_enter(next);
    }

    /// HopStart has no entry work: planning needs the threat and bounds, so it
    /// runs on that state's tick.
    fn on_enter(&mut self, state: TargetState) {
        match state {
            TargetState::Idle => {
                // Land exactly on the planned spot, whatever the last step left over
                self.pose.position = self.runtime.hop_end_position;
            }
            TargetState::Caught => {
                log::info!("Target {:?} caught by {:?}", self.id, self.threat);
            }
            TargetState::HopStart | TargetState::Hop => {}
        }
    }

    fn on_tick<T: Threat>(
        &mut self,
        clock: &FrameClock,
        threat: &T,
        bounds: &Bounds,
    ) -> Option<HopPlan> {
        match self.state {
            TargetState::Idle => {
                let scared = self.params().scared_distance;
                if distance(self.pose.position, threat.position()) <= scared {
                    self.transition(TargetState::HopStart, clock);
                }
                None
            }
            TargetState::HopStart => {
                let plan = self.plan_hop(clock, threat, bounds);
                self.transition(TargetState::Hop, clock);
                Some(plan)
            }
            TargetState::Hop => {
                let step = clock.dt * self.params().hop_speed;
                self.pose.position =
                    move_towards(self.pose.position, self.runtime.hop_end_position, step);

                if clock.now >= self.runtime.hop_start_time + self.params().hop_duration {
                    self.transition(TargetState::Idle, clock);
                }
                None
            }
            TargetState::Caught => None,
        }
    }

    fn plan_hop<T: Threat>(&mut self, clock: &FrameClock, threat: &T, bounds: &Bounds) -> HopPlan {
        let origin = self.pose.position;
        let hop_length = self.params().hop_length();
        let plan = self
            .planner
            .plan(&mut self.rng, origin, threat.position(), hop_length, bounds);

        self.runtime.hop_start_position = origin;
        self.runtime.hop_end_position = plan.destination;
        self.runtime.hop_start_time = clock.now;
        self.runtime.last_plan = Some(plan.outcome);

        let direction = plan.destination - origin;
        if direction.length() > ARRIVAL_EPSILON {
            self.pose.angle = angle_of(direction);
        }
        plan
    }
}
