#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Dream Plaza session.

mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dreamplaza_core::WELCOME_BANNER;
use dreamplaza_simulation::SimulationConfig;

use crate::session::{SessionOptions, SessionSummary};

#[derive(Parser, Debug)]
#[command(
    name = "dreamplaza",
    version,
    about = "Run a scripted, headless Dream Plaza session"
)]
struct Cli {
    /// Number of frames to simulate.
    #[arg(long, default_value_t = 1800)]
    frames: u64,

    /// Simulated frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Seed overriding both the terrain and spawning seeds.
    #[arg(long)]
    seed: Option<u64>,

    /// TOML configuration file; defaults apply to anything it omits.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frames between shots at the nearest agent.
    #[arg(long, default_value_t = 12)]
    fire_every: u64,

    /// Print the summary as JSON instead of text.
    #[arg(long)]
    json: bool,
}

/// Entry point for the Dream Plaza command-line interface.
fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_path(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.terrain.seed = seed;
        config.spawning.seed = seed;
    }

    let summary = session::run(
        &config,
        SessionOptions {
            frames: cli.frames,
            fps: cli.fps,
            fire_every: cli.fire_every,
            fire_range: 20.0,
            walk_radius: 12.0,
        },
    )
    .context("session failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("failed to encode summary")?
        );
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &SessionSummary) {
    println!("{WELCOME_BANNER}");
    println!(
        "frames: {} ({:.1}s simulated)",
        summary.frames, summary.simulated_seconds
    );
    println!(
        "player: {}/{} health, {}",
        summary.player_health,
        summary.max_health,
        if summary.survived { "survived" } else { "fell" }
    );
    println!(
        "combat: {} shots, {} hits, {} kills, {} strikes taken",
        summary.shots, summary.hits, summary.kills, summary.strikes
    );
    println!(
        "agents: {} alive across {} seeded chunks, {} route plans",
        summary.agents_alive, summary.seeded_chunks, summary.plans
    );
    println!("published view revision: {}", summary.view_revision);
}
