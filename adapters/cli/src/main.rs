#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Pellet Chase session.

mod autopilot;
mod board;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pellet_chase_core::{Command, Difficulty, Event, Phase};
use pellet_chase_simulation::{Simulation, FRAME_INTERVAL};
use pellet_chase_system_pathfinding::Algorithm;
use pellet_chase_system_pursuit::{Pursuit, Tuning};
use pellet_chase_world::{query, Config, Layout, World};
use serde::Deserialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use autopilot::Autopilot;

/// Runs a Pellet Chase session driven by a scripted player.
#[derive(Parser, Debug)]
#[command(name = "pellet-chase")]
#[command(about = "Headless grid chase driven by a built-in autopilot")]
struct Args {
    /// Level file; the built-in level is used when omitted
    #[arg(long)]
    layout: Option<PathBuf>,

    /// TOML file with `[world]` and `[pursuit]` tables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Difficulty, which selects the pursuers' search strategy
    #[arg(long, value_enum, default_value_t = DifficultyArg::Medium)]
    difficulty: DifficultyArg,

    /// Seed for the pursuers' random decisions
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Maximum number of frames to simulate
    #[arg(long, default_value_t = 1_800)]
    frames: u64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Easy => Self::Easy,
            DifficultyArg::Medium => Self::Medium,
            DifficultyArg::Hard => Self::Hard,
        }
    }
}

/// Contents of the optional configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Settings {
    world: Config,
    pursuit: Tuning,
}

/// Entry point for the Pellet Chase command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = load_settings(args.config.as_ref())?;
    let layout = load_layout(args.layout.as_ref())?;
    let difficulty = Difficulty::from(args.difficulty);

    info!(
        seed = args.seed,
        algorithm = Algorithm::for_difficulty(difficulty).label(),
        "starting session"
    );

    let world = World::new(layout, settings.world);
    let mut simulation = Simulation::new(world, Pursuit::new(settings.pursuit), args.seed);
    run(&mut simulation, difficulty, args.frames);

    println!("{}", board::render(simulation.world()));
    if let Some(outcome) = query::outcome(simulation.world()) {
        println!("outcome {outcome:?}");
    }
    Ok(())
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn load_layout(path: Option<&PathBuf>) -> Result<Layout> {
    let Some(path) = path else {
        return Ok(Layout::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read layout {}", path.display()))?;
    Layout::parse(&text).with_context(|| format!("invalid layout {}", path.display()))
}

fn run(simulation: &mut Simulation, difficulty: Difficulty, frames: u64) {
    let mut autopilot = Autopilot::default();
    let mut events = Vec::new();
    simulation.submit(Command::StartGame { difficulty }, &mut events);
    report(&events);

    for frame in 0..frames {
        events.clear();

        let world = simulation.world();
        let player = query::player(world);
        let mut intents = Vec::new();
        autopilot.decide(
            frame,
            query::grid(world),
            player.cell,
            player.facing,
            &query::pursuer_view(world),
            &query::remaining_markers(world),
            &mut intents,
        );
        for intent in intents {
            simulation.submit(intent, &mut events);
        }
        simulation.advance(FRAME_INTERVAL, &mut events);
        report(&events);

        if query::phase(simulation.world()) != Phase::Playing {
            break;
        }
    }
}

fn report(events: &[Event]) {
    for event in events {
        match event {
            Event::PhaseChanged { from, to } => println!("phase {from:?} -> {to:?}"),
            Event::SessionEnded { outcome, score } => {
                println!("session ended: {outcome:?} with score {score}");
            }
            Event::PlayerDamaged { lives } => debug!(lives, "autopilot hit"),
            _ => {}
        }
    }
}
