//! Headless chase world
//!
//! Owns one player, any number of targets and the small pieces of scene graph
//! the controllers need: attachment of caught targets and an event log per
//! tick. Everything is deterministic for a given seed and input stream.

use std::collections::BTreeMap;
use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::evasion::PlanOutcome;
use super::motion::{ActorId, Pose};
use super::player::{PlayerController, PlayerState};
use super::target::{AttachRequest, TargetController, TargetState};
use super::visual::{Rgb, VisualState};
use crate::error::{Result, SimError};
use crate::settings::Settings;

/// Something that happened during the last tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PlayerStateChanged {
        from: PlayerState,
        to: PlayerState,
    },
    TargetStateChanged {
        target: ActorId,
        from: TargetState,
        to: TargetState,
    },
    HopPlanned {
        target: ActorId,
        destination: Vec2,
        outcome: PlanOutcome,
    },
    TargetCaught {
        target: ActorId,
    },
    AttachRequested(AttachRequest),
}

/// Parent/child links requested by caught targets
#[derive(Debug, Clone, Default)]
pub struct Attachments {
    /// child -> (parent, local offset)
    links: BTreeMap<ActorId, (ActorId, Vec2)>,
}

impl Attachments {
    pub fn attach(&mut self, request: AttachRequest) {
        self.links
            .insert(request.child, (request.parent, request.local_offset));
    }

    pub fn parent_of(&self, child: ActorId) -> Option<ActorId> {
        self.links.get(&child).map(|(parent, _)| *parent)
    }

    /// Snap every attached target under its parent
    pub fn apply(&self, player: &PlayerController, targets: &mut [TargetController]) {
        let parent = player.pose();
        for target in targets.iter_mut() {
            let link = self
                .links
                .get(&target.id())
                .filter(|(parent_id, _)| *parent_id == player.id());
            if let Some((_, offset)) = link {
                target.follow(&parent, *offset);
            }
        }
    }
}

/// Serializable per-actor view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub pose: Pose,
    pub state: String,
    pub color: Rgb,
}

/// Serializable view of the whole world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub time: f32,
    pub player: ActorSnapshot,
    pub targets: Vec<ActorSnapshot>,
    pub caught: usize,
}

/// Builder enforcing that every world has a player
#[derive(Debug, Clone)]
pub struct ChaseWorldBuilder {
    settings: Settings,
    player: Option<Pose>,
    targets: Vec<Pose>,
}

impl ChaseWorldBuilder {
    pub fn player(mut self, pose: Pose) -> Self {
        self.player = Some(pose);
        self
    }

    pub fn target(mut self, pose: Pose) -> Self {
        self.targets.push(pose);
        self
    }

    pub fn targets(mut self, poses: impl IntoIterator<Item = Pose>) -> Self {
        self.targets.extend(poses);
        self
    }

    pub fn build(self) -> Result<ChaseWorld> {
        self.settings.validate()?;
        let player_pose = self.player.ok_or(SimError::MissingPlayer)?;

        let settings = Arc::new(self.settings);
        let seed = settings.world.seed;
        let mut next_id = 1;
        let mut alloc = || {
            let id = ActorId(next_id);
            next_id += 1;
            id
        };

        let player = PlayerController::new(alloc(), Arc::clone(&settings), player_pose);
        let targets = self
            .targets
            .into_iter()
            .map(|pose| {
                let id = alloc();
                // One independent stream per target
                let target_seed = seed ^ (id.0 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
                TargetController::new(id, player.id(), Arc::clone(&settings), pose, target_seed)
            })
            .collect::<Vec<_>>();

        log::info!(
            "World built: player {:?}, {} target(s), seed {:#x}",
            player.id(),
            targets.len(),
            seed
        );

        Ok(ChaseWorld {
            settings,
            player,
            targets,
            attachments: Attachments::default(),
            events: Vec::new(),
            time_ticks: 0,
        })
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct ChaseWorld {
    settings: Arc<Settings>,
    pub(crate) player: PlayerController,
    /// Sorted by id for deterministic iteration
    pub(crate) targets: Vec<TargetController>,
    pub(crate) attachments: Attachments,
    pub(crate) events: Vec<GameEvent>,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl ChaseWorld {
    pub fn builder(settings: Settings) -> ChaseWorldBuilder {
        ChaseWorldBuilder {
            settings,
            player: None,
            targets: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    pub fn targets(&self) -> &[TargetController] {
        &self.targets
    }

    /// Mutable access for hosts that deliver their own overlap events
    pub fn targets_mut(&mut self) -> &mut [TargetController] {
        &mut self.targets
    }

    pub fn target(&self, id: ActorId) -> Option<&TargetController> {
        self.targets.iter().find(|t| t.id() == id)
    }

    pub fn attachments(&self) -> &Attachments {
        &self.attachments
    }

    /// Events produced by the most recent tick
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Simulation time of the next tick
    pub fn now(&self) -> f32 {
        (self.time_ticks as f64 * self.settings.world.fixed_dt as f64) as f32
    }

    pub fn caught_count(&self) -> usize {
        self.targets.iter().filter(|t| t.is_caught()).count()
    }

    pub fn all_caught(&self) -> bool {
        !self.targets.is_empty() && self.targets.iter().all(|t| t.is_caught())
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        let player_state = self.player.state();
        WorldSnapshot {
            tick: self.time_ticks,
            time: self.now(),
            player: ActorSnapshot {
                id: self.player.id(),
                pose: self.player.pose(),
                state: player_state.as_str().to_string(),
                color: player_state.color(),
            },
            targets: self
                .targets
                .iter()
                .map(|t| ActorSnapshot {
                    id: t.id(),
                    pose: t.pose(),
                    state: t.state().as_str().to_string(),
                    color: t.state().color(),
                })
                .collect(),
            caught: self.caught_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_player() {
        let err = ChaseWorld::builder(Settings::default())
            .target(Pose::default())
            .build()
            .unwrap_err();
        assert!(matches!(err, SimError::MissingPlayer));
    }

    #[test]
    fn test_build_rejects_bad_settings() {
        let mut settings = Settings::default();
        settings.world.fixed_dt = 0.0;
        let err = ChaseWorld::builder(settings)
            .player(Pose::default())
            .build()
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig { .. }));
    }

    #[test]
    fn test_ids_and_threat_wiring() {
        let world = ChaseWorld::builder(Settings::default())
            .player(Pose::default())
            .targets([Pose::default(), Pose::default()])
            .build()
            .unwrap();
        assert_eq!(world.player().id(), ActorId(1));
        let ids: Vec<_> = world.targets().iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![ActorId(2), ActorId(3)]);
        assert!(world.targets().iter().all(|t| t.threat_id() == ActorId(1)));
        assert!(world.target(ActorId(3)).is_some());
        assert!(!world.all_caught());
    }

    #[test]
    fn test_snapshot_reports_colors() {
        let world = ChaseWorld::builder(Settings::default())
            .player(Pose::default())
            .target(Pose::new(Vec2::new(5.0, 0.0), 0.0))
            .build()
            .unwrap();
        let snap = world.snapshot();
        assert_eq!(snap.player.state, "MovingSlow");
        assert_eq!(snap.player.color, Rgb::BLACK);
        assert_eq!(snap.targets[0].color, Rgb::RED);
        assert_eq!(snap.caught, 0);
        assert!(serde_json::to_string(&snap).is_ok());
    }

    #[test]
    fn test_attachments_follow_player() {
        let mut world = ChaseWorld::builder(Settings::default())
            .player(Pose::new(Vec2::new(1.0, 2.0), 0.0))
            .target(Pose::default())
            .build()
            .unwrap();
        let child = world.targets()[0].id();
        world.attachments.attach(AttachRequest {
            child,
            parent: world.player().id(),
            local_offset: Vec2::new(0.0, -0.5),
        });
        let ChaseWorld {
            player,
            targets,
            attachments,
            ..
        } = &mut world;
        attachments.apply(player, targets);

        assert_eq!(world.attachments().parent_of(child), Some(ActorId(1)));
        assert_eq!(world.targets()[0].pose().position, Vec2::new(1.0, 1.5));
    }
}
