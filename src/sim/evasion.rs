//! Evasive hop placement
//!
//! A hop destination is found by sampling random headings around the actor:
//! - candidates outside the bounds are thrown away
//! - the first candidate farther than `scared_distance` from the threat wins
//! - otherwise the in-bounds candidate farthest from the threat is kept
//!
//! `max_attempts` is a hard cap. A fully cornered actor gets its own origin
//! back and simply stays put for that hop.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::motion::{distance, heading, random_in_range};
use crate::settings::TargetMotionParams;

/// Axis-aligned rectangle a hop must land in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Screen-style extents: `[0, width] x [0, height]`
    pub fn from_extents(width: f32, height: f32) -> Self {
        Self::new(Vec2::ZERO, Vec2::new(width, height))
    }

    /// Rectangle centered on the origin with the given half extents
    pub fn centered(half_extents: Vec2) -> Self {
        Self::new(-half_extents, half_extents)
    }

    /// Inclusive containment test
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// How a plan was settled
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlanOutcome {
    /// A candidate cleared the scared distance (1-based attempt index)
    Safe { attempt: u32 },
    /// No candidate was safe; the farthest in-bounds one was taken
    BestEffort { clearance: f32 },
    /// Nothing landed in bounds; the hop is a no-op
    Exhausted,
}

/// Result of one planning call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HopPlan {
    pub destination: Vec2,
    pub outcome: PlanOutcome,
}

/// One sampled heading. Lives only for the duration of a `plan` call.
#[derive(Debug, Clone, Copy)]
struct HopCandidate {
    angle: f32,
    position: Vec2,
    in_bounds: bool,
    threat_distance: f32,
}

impl HopCandidate {
    fn sample<R: Rng + ?Sized>(
        rng: &mut R,
        origin: Vec2,
        threat: Vec2,
        hop_length: f32,
        bounds: &Bounds,
    ) -> Self {
        let angle = random_in_range(rng, 0.0, 360.0);
        let position = origin + heading(angle) * hop_length;
        Self {
            angle,
            position,
            in_bounds: bounds.contains(position),
            threat_distance: distance(position, threat),
        }
    }
}

/// Bounded random search for a hop destination away from a threat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvasionPlanner {
    pub scared_distance: f32,
    pub max_attempts: u32,
}

impl EvasionPlanner {
    pub fn new(scared_distance: f32, max_attempts: u32) -> Self {
        Self {
            scared_distance,
            max_attempts,
        }
    }

    pub fn from_params(params: &TargetMotionParams) -> Self {
        Self::new(params.scared_distance, params.max_placement_attempts)
    }

    /// Pick a hop destination `hop_length` away from `origin`
    pub fn plan<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        origin: Vec2,
        threat: Vec2,
        hop_length: f32,
        bounds: &Bounds,
    ) -> HopPlan {
        let mut best: Option<HopCandidate> = None;

        for attempt in 1..=self.max_attempts {
            let candidate = HopCandidate::sample(rng, origin, threat, hop_length, bounds);
            if !candidate.in_bounds {
                continue;
            }

            if candidate.threat_distance > self.scared_distance {
                log::debug!(
                    "Hop heading {:.1} clears threat on attempt {}",
                    candidate.angle,
                    attempt
                );
                return HopPlan {
                    destination: candidate.position,
                    outcome: PlanOutcome::Safe { attempt },
                };
            }

            // Strictly greater keeps the earliest of equally good candidates
            if best.is_none_or(|b| candidate.threat_distance > b.threat_distance) {
                best = Some(candidate);
            }
        }

        match best {
            Some(candidate) => HopPlan {
                destination: candidate.position,
                outcome: PlanOutcome::BestEffort {
                    clearance: candidate.threat_distance,
                },
            },
            None => {
                log::debug!(
                    "Hop planning exhausted after {} attempts at {:?}",
                    self.max_attempts,
                    origin
                );
                HopPlan {
                    destination: origin,
                    outcome: PlanOutcome::Exhausted,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn wide_bounds() -> Bounds {
        Bounds::new(Vec2::splat(-100.0), Vec2::splat(100.0))
    }

    #[test]
    fn test_plan_open_field_is_safe_and_on_circle() {
        let mut rng = Pcg32::seed_from_u64(42);
        let planner = EvasionPlanner::new(3.0, 50);
        let origin = Vec2::ZERO;
        let threat = Vec2::new(10.0, 0.0);

        let plan = planner.plan(&mut rng, origin, threat, 5.0, &wide_bounds());

        assert!((plan.destination.distance(origin) - 5.0).abs() < 1e-4);
        assert!(plan.destination.distance(threat) > 3.0);
        assert_eq!(plan.outcome, PlanOutcome::Safe { attempt: 1 });
    }

    #[test]
    fn test_plan_is_deterministic_for_seed() {
        let planner = EvasionPlanner::new(3.0, 50);
        let a = planner.plan(
            &mut Pcg32::seed_from_u64(7),
            Vec2::ZERO,
            Vec2::new(1.0, 1.0),
            1.3,
            &wide_bounds(),
        );
        let b = planner.plan(
            &mut Pcg32::seed_from_u64(7),
            Vec2::ZERO,
            Vec2::new(1.0, 1.0),
            1.3,
            &wide_bounds(),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_attempts_returns_origin() {
        let mut rng = Pcg32::seed_from_u64(1);
        let planner = EvasionPlanner::new(3.0, 0);
        let origin = Vec2::new(4.0, -2.0);
        let plan = planner.plan(&mut rng, origin, Vec2::ZERO, 5.0, &wide_bounds());
        assert_eq!(plan.destination, origin);
        assert_eq!(plan.outcome, PlanOutcome::Exhausted);
    }

    #[test]
    fn test_cornered_stays_put() {
        // Every heading leaves a 1x1 box when hopping 5 units
        let mut rng = Pcg32::seed_from_u64(3);
        let planner = EvasionPlanner::new(3.0, 50);
        let origin = Vec2::new(0.5, 0.5);
        let bounds = Bounds::from_extents(1.0, 1.0);
        let plan = planner.plan(&mut rng, origin, Vec2::ZERO, 5.0, &bounds);
        assert_eq!(plan.destination, origin);
        assert_eq!(plan.outcome, PlanOutcome::Exhausted);
    }

    #[test]
    fn test_best_effort_keeps_farthest_sample() {
        // Scared distance is unreachable, so every in-bounds sample competes on distance
        let planner = EvasionPlanner::new(1_000.0, 20);
        let origin = Vec2::ZERO;
        let threat = Vec2::new(2.0, 0.0);
        let plan = planner.plan(
            &mut Pcg32::seed_from_u64(11),
            origin,
            threat,
            1.0,
            &wide_bounds(),
        );

        // Replay the same sample stream
        let mut rng = Pcg32::seed_from_u64(11);
        let mut expected = origin;
        let mut best = f32::NEG_INFINITY;
        for _ in 0..20 {
            let angle = random_in_range(&mut rng, 0.0, 360.0);
            let p = origin + heading(angle) * 1.0;
            let d = p.distance(threat);
            if d > best {
                best = d;
                expected = p;
            }
        }

        assert_eq!(plan.destination, expected);
        assert_eq!(plan.outcome, PlanOutcome::BestEffort { clearance: best });
    }

    #[test]
    fn test_bounds_inclusive_edges() {
        let bounds = Bounds::from_extents(10.0, 5.0);
        assert!(bounds.contains(Vec2::ZERO));
        assert!(bounds.contains(Vec2::new(10.0, 5.0)));
        assert!(!bounds.contains(Vec2::new(10.01, 2.0)));
        assert!(!bounds.contains(Vec2::new(5.0, -0.01)));
        assert_eq!(Bounds::centered(Vec2::new(2.0, 1.0)).size(), Vec2::new(4.0, 2.0));
    }

    proptest! {
        #[test]
        fn prop_destination_in_bounds_or_origin(
            seed in any::<u64>(),
            ox in 0.0f32..20.0, oy in 0.0f32..10.0,
            tx in 0.0f32..20.0, ty in 0.0f32..10.0,
            hop in 0.1f32..6.0,
            attempts in 0u32..64,
        ) {
            let bounds = Bounds::from_extents(20.0, 10.0);
            let origin = Vec2::new(ox, oy);
            let planner = EvasionPlanner::new(3.0, attempts);
            let plan = planner.plan(
                &mut Pcg32::seed_from_u64(seed),
                origin,
                Vec2::new(tx, ty),
                hop,
                &bounds,
            );
            match plan.outcome {
                PlanOutcome::Exhausted => prop_assert_eq!(plan.destination, origin),
                PlanOutcome::Safe { attempt } => {
                    prop_assert!(bounds.contains(plan.destination));
                    prop_assert!(attempt >= 1 && attempt <= attempts);
                }
                PlanOutcome::BestEffort { .. } => prop_assert!(bounds.contains(plan.destination)),
            }
        }
    }
}
