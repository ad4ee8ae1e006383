//! Hop Chase headless driver
//!
//! Runs the simulation with a scripted pointer through the same fixed-step
//! accumulator a windowed host would use, then prints the final snapshot.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use glam::Vec2;

use hop_chase::consts::{MAX_SUBSTEPS, SIM_DT};
use hop_chase::sim::{Bounds, ChaseWorld, GameEvent, PlayerState, Pose, TickInput, tick};
use hop_chase::{FastPolicy, Settings};

/// Headless chase-and-catch simulation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of rendered frames to simulate
    #[arg(long, default_value_t = 3_000)]
    frames: u32,

    /// Host frame rate; the simulation still steps at its fixed rate
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Run seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of targets to scatter
    #[arg(long, default_value_t = 3)]
    targets: u32,

    /// Settings file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fast-move policy: hold or coast
    #[arg(long)]
    fast_policy: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let env = env_logger::Env::default().default_filter_or(level);
    // Only fails if a logger is already installed
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Scripted host: steers toward the nearest free target and dives when close
struct Autopilot {
    viewport: Bounds,
    dive_range: f32,
}

impl Autopilot {
    fn input(&self, world: &ChaseWorld) -> TickInput {
        let player = world.player();
        let position = player.pose().position;
        let nearest = world
            .targets()
            .iter()
            .filter(|t| !t.is_caught())
            .map(|t| t.pose().position)
            .min_by(|a, b| {
                a.distance(position)
                    .partial_cmp(&b.distance(position))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        let Some(goal) = nearest else {
            return TickInput::new(position, self.viewport);
        };

        // Aim past the target so the pointer never sits in the dead zone
        let lead = (goal - position).normalize_or_zero() * 2.0;
        let pointer = goal + lead;
        let dive = match player.state() {
            PlayerState::MovingFast => true,
            PlayerState::MovingSlow => goal.distance(position) <= self.dive_range,
            PlayerState::Diving | PlayerState::Recovering => false,
        };
        TickInput::new(pointer, self.viewport).with_dive(dive)
    }
}

fn scatter(count: u32, viewport: &Bounds, seed: u64) -> Vec<Pose> {
    use rand::{Rng, SeedableRng};
    let mut rng = rand_pcg::Pcg32::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let x = rng.random_range(viewport.min.x..viewport.max.x);
            let y = rng.random_range(viewport.min.y..viewport.max.y);
            Pose::new(Vec2::new(x, y), 0.0)
        })
        .collect()
}

fn run(args: Args) -> hop_chase::Result<()> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(seed) = args.seed {
        settings.world.seed = seed;
    }
    if let Some(policy) = &args.fast_policy {
        settings.player.fast_policy =
            FastPolicy::from_str(policy).ok_or_else(|| hop_chase::SimError::InvalidConfig {
                field: "player.fast_policy",
                reason: format!("unknown policy `{policy}`"),
            })?;
    }
    if (settings.world.fixed_dt - SIM_DT).abs() > f32::EPSILON {
        log::info!("Using fixed timestep {:.4}s", settings.world.fixed_dt);
    }

    let viewport = Bounds::centered(Vec2::new(8.0, 5.0));
    let autopilot = Autopilot {
        viewport,
        dive_range: settings.player.dive_distance,
    };
    let poses = scatter(args.targets, &viewport, settings.world.seed);
    let fixed_dt = settings.world.fixed_dt;
    let mut world = ChaseWorld::builder(settings)
        .player(Pose::default())
        .targets(poses)
        .build()?;

    log::info!("Simulating {} frames at {} fps", args.frames, args.fps);
    let frame_dt = 1.0 / args.fps.max(1.0);
    let mut accumulator = 0.0;

    'frames: for _ in 0..args.frames {
        accumulator += frame_dt.min(0.1);

        let mut substeps = 0;
        while accumulator >= fixed_dt && substeps < MAX_SUBSTEPS {
            let input = autopilot.input(&world);
            tick(&mut world, &input);
            accumulator -= fixed_dt;
            substeps += 1;

            for event in world.events() {
                if let GameEvent::TargetCaught { target } = event {
                    log::info!(
                        "Caught {:?} at t={:.2}s ({}/{})",
                        target,
                        world.now(),
                        world.caught_count(),
                        world.targets().len()
                    );
                }
            }

            if world.all_caught() {
                break 'frames;
            }
        }
    }

    let snapshot = world.snapshot();
    log::info!(
        "Finished after {} ticks, {} of {} caught",
        snapshot.tick,
        snapshot.caught,
        snapshot.targets.len()
    );
    let json = serde_json::to_string_pretty(&snapshot).map_err(hop_chase::SimError::from)?;
    println!("{json}");
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
