#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Gauntlet session under an autopilot.

mod autopilot;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use gauntlet_core::TelemetryEvent;
use gauntlet_session::{Phase, Session, SessionConfig};
use gauntlet_system_telemetry::{digest_hex, TelemetrySummary};
use gauntlet_world::query;
use serde::Serialize;

use self::autopilot::Autopilot;

#[derive(Debug, Parser)]
#[command(name = "gauntlet")]
#[command(about = "Runs a deterministic Gauntlet session headless and reports the outcome")]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Maximum number of ticks to simulate.
    #[arg(long, default_value_t = 3_600)]
    ticks: u32,
    /// Length of one tick in milliseconds.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    /// Writes the telemetry stream and its summary as JSON.
    #[arg(long)]
    telemetry: Option<PathBuf>,
}

#[derive(Serialize)]
struct TelemetryExport<'a> {
    seed: u64,
    digest: String,
    summary: TelemetrySummary,
    events: &'a [TelemetryEvent],
}

/// Entry point for the Gauntlet command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if cli.tick_ms == 0 {
        bail!("--tick-ms must be greater than zero");
    }

    let mut config = match &cli.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let mut session = Session::new(&config);
    println!("{}", query::welcome_banner(session.world()));

    let autopilot = Autopilot::default();
    let dt = Duration::from_millis(cli.tick_ms);
    let mut ticks_run = 0_u32;
    for _ in 0..cli.ticks {
        let input = autopilot.decide(session.world());
        let report = session.tick(dt, input);
        ticks_run += 1;
        if report.phase == Phase::GameOver {
            break;
        }
    }

    let sink = session.telemetry_sink();
    let digest = digest_hex(&sink.digest());
    println!("ticks: {ticks_run}");
    println!("phase: {:?}", session.phase());
    println!("score: {}", session.score().score());
    println!("points: {}", session.score().points());
    println!(
        "pool capacity: {}",
        query::pool(session.world()).capacity()
    );
    println!("telemetry digest: {digest}");

    if let Some(path) = &cli.telemetry {
        let export = TelemetryExport {
            seed: config.seed,
            digest,
            summary: sink.summary(),
            events: sink.events(),
        };
        let json =
            serde_json::to_string_pretty(&export).context("failed to serialize telemetry")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write telemetry to {}", path.display()))?;
        log::info!("telemetry written to {}", path.display());
    }

    Ok(())
}
