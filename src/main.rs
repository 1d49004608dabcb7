//! Jumping Frog entry point
//!
//! Runs the simulation headless with the autopilot at the wheel. Drawing and
//! keyboard capture belong to a terminal front end; this runner drives the
//! same core on a simulated clock and logs what happens.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;

use jumping_frog::Config;
use jumping_frog::persistence;
use jumping_frog::sim::{GameState, Outcome, TickInput, tick};

/// Headless Jumping Frog runner
#[derive(Parser, Debug)]
#[command(name = "jumping-frog", version, about)]
struct Args {
    /// `key=value` config file
    #[arg(long, value_name = "PATH", default_value = "config.txt")]
    config: PathBuf,
    /// Run seed (defaults to the current time)
    #[arg(long)]
    seed: Option<u64>,
    /// Maximum frames to simulate
    #[arg(long, default_value_t = 20_000)]
    frames: u64,
    /// Simulated seconds per frame
    #[arg(long = "frame-secs", value_name = "SECONDS", default_value_t = 0.1)]
    frame_secs: f64,
    /// Continue from a saved snapshot
    #[arg(long, value_name = "PATH")]
    resume: Option<PathBuf>,
    /// Write a snapshot here when the run stops
    #[arg(long, value_name = "PATH")]
    save: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("Error opening configuration file: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let seed = args.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default()
    });
    let mut state = GameState::new(&config, seed, 0.0);
    log::info!("Jumping Frog starting with seed: {}", seed);

    if let Some(path) = &args.resume {
        match persistence::load(path, &config) {
            Ok(saved) => state = saved,
            Err(err) => log::warn!("Could not resume from {:?}: {}", path, err),
        }
    }

    let mut now = state.progress.started_at + state.progress.elapsed;
    for _ in 0..args.frames {
        now += args.frame_secs;
        let report = tick(
            &mut state,
            &config,
            &TickInput {
                now,
                idle_mode: true,
                ..Default::default()
            },
        );

        match report.resolution.outcome {
            Outcome::HazardHit => log::info!("Hit by a car, {} lives left", state.progress.lives),
            Outcome::PursuerHit => log::info!("Caught by the stork, {} lives left", state.progress.lives),
            Outcome::ObstacleHit => log::debug!("Blocked by an obstacle"),
            Outcome::GoalReached => log::info!("Goal reached, score {}", state.progress.score),
            Outcome::None => {}
        }

        if state.is_over() {
            break;
        }
    }

    if let Some(path) = &args.save {
        if let Err(err) = persistence::save(&state, path) {
            log::warn!("Could not save to {:?}: {}", path, err);
        }
    }

    let summary = state.summary();
    if state.is_over() {
        println!("GAME OVER");
    }
    println!(
        "Final Score: {} | Level: {} | Time Played: {:.2} seconds",
        summary.score, summary.level, summary.seconds_played
    );
    ExitCode::SUCCESS
}
