//! Fixed timestep simulation tick
//!
//! One call to [`tick`] is one simulation step: player first, then every
//! target, then overlap/catch delivery, then attachment follow-up.

use glam::Vec2;

use super::evasion::Bounds;
use super::motion::distance;
use super::world::{ChaseWorld, GameEvent};

/// Time as seen by one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    /// Simulation time at the start of this tick (seconds)
    pub now: f32,
    /// Fixed step length (seconds)
    pub dt: f32,
}

impl FrameClock {
    pub fn new(now: f32, dt: f32) -> Self {
        Self { now, dt }
    }

    /// Clock for tick number `ticks`; multiplying avoids accumulated drift
    pub fn at_tick(ticks: u64, dt: f32) -> Self {
        Self::new((ticks as f64 * dt as f64) as f32, dt)
    }
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone)]
pub struct TickInput {
    /// Pointer position in world space
    pub pointer: Vec2,
    /// World-space extents used to normalize pointer distance
    pub pointer_extents: Vec2,
    /// Visible world rectangle; hops must land inside it
    pub viewport: Bounds,
    /// Dive button, sampled once per tick
    pub dive_requested: bool,
}

impl TickInput {
    /// Pointer extents default to the viewport's far corner
    pub fn new(pointer: Vec2, viewport: Bounds) -> Self {
        Self {
            pointer,
            pointer_extents: viewport.max,
            viewport,
            dive_requested: false,
        }
    }

    pub fn with_dive(mut self, dive: bool) -> Self {
        self.dive_requested = dive;
        self
    }
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut ChaseWorld, input: &TickInput) {
    let clock = FrameClock::at_tick(world.time_ticks, world.settings().world.fixed_dt);
    world.events.clear();

    // Player
    let before = world.player.state();
    world.player.tick(&clock, input);
    let after = world.player.state();
    if before != after {
        world.events.push(GameEvent::PlayerStateChanged {
            from: before,
            to: after,
        });
    }

    // Targets, in id order
    let player = &world.player;
    for target in world.targets.iter_mut() {
        let before = target.state();
        if let Some(plan) = target.tick(&clock, player, &input.viewport) {
            world.events.push(GameEvent::HopPlanned {
                target: target.id(),
                destination: plan.destination,
                outcome: plan.outcome,
            });
        }
        let after = target.state();
        if before != after {
            world.events.push(GameEvent::TargetStateChanged {
                target: target.id(),
                from: before,
                to: after,
            });
        }
    }

    // Overlaps are delivered after the per-tick switch
    let catch_radius = world.settings().world.catch_radius;
    for target in world.targets.iter_mut() {
        if target.is_caught()
            || !overlapping(player.pose().position, target.pose().position, catch_radius)
        {
            continue;
        }
        let before = target.state();
        if let Some(request) = target.on_overlap_persist(player.id(), player, &clock) {
            world.events.push(GameEvent::TargetStateChanged {
                target: target.id(),
                from: before,
                to: target.state(),
            });
            world.events.push(GameEvent::TargetCaught { target: target.id() });
            world.events.push(GameEvent::AttachRequested(request));
            world.attachments.attach(request);
        }
    }

    world.attachments.apply(player, &mut world.targets);
    world.time_ticks += 1;
}

/// Built-in overlap test standing in for a physics trigger
#[inline]
pub fn overlapping(a: Vec2, b: Vec2, radius: f32) -> bool {
    distance(a, b) <= radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::motion::Pose;
    use crate::sim::player::PlayerState;
    use crate::sim::target::TargetState;

    fn viewport() -> Bounds {
        Bounds::centered(Vec2::new(8.0, 5.0))
    }

    #[test]
    fn test_tick_advances_clock() {
        let mut world = ChaseWorld::builder(Settings::default())
            .player(Pose::default())
            .build()
            .unwrap();
        let input = TickInput::new(Vec2::ZERO, viewport());
        tick(&mut world, &input);
        tick(&mut world, &input);
        assert_eq!(world.time_ticks, 2);
        assert!((world.now() - 2.0 * world.settings().world.fixed_dt).abs() < 1e-6);
    }

    #[test]
    fn test_tick_emits_player_transition() {
        let mut world = ChaseWorld::builder(Settings::default())
            .player(Pose::default())
            .build()
            .unwrap();
        let input = TickInput::new(Vec2::new(-5.0, 0.0), viewport()).with_dive(true);
        tick(&mut world, &input);
        assert!(world.events().contains(&GameEvent::PlayerStateChanged {
            from: PlayerState::MovingSlow,
            to: PlayerState::Diving,
        }));
    }

    #[test]
    fn test_idle_player_does_not_catch() {
        // Player parked on top of the target, never diving
        let mut world = ChaseWorld::builder(Settings::default())
            .player(Pose::default())
            .target(Pose::new(Vec2::new(0.2, 0.0), 0.0))
            .build()
            .unwrap();
        let input = TickInput::new(Vec2::ZERO, viewport());
        for _ in 0..5 {
            tick(&mut world, &input);
        }
        assert!(world.targets().iter().all(|t| t.state() != TargetState::Caught));
    }

    #[test]
    fn test_determinism() {
        let build = || {
            ChaseWorld::builder(Settings::default())
                .player(Pose::default())
                .target(Pose::new(Vec2::new(2.0, 1.0), 0.0))
                .target(Pose::new(Vec2::new(-2.0, -1.0), 0.0))
                .build()
                .unwrap()
        };
        let mut a = build();
        let mut b = build();
        let inputs = [
            TickInput::new(Vec2::new(4.0, 2.0), viewport()),
            TickInput::new(Vec2::new(4.0, 2.0), viewport()).with_dive(true),
            TickInput::new(Vec2::new(-4.0, 0.0), viewport()),
        ];
        for _ in 0..30 {
            for input in &inputs {
                tick(&mut a, input);
                tick(&mut b, input);
            }
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_at_tick_no_drift() {
        let clock = FrameClock::at_tick(1_000, 0.125);
        assert_eq!(clock.now, 125.0);
    }
}
