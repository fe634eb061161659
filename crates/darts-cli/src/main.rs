use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use darts_cli::config::{MatchConfig, ResolvedOutputs};
use darts_cli::logging::init_logging;
use darts_cli::runner::{MatchRunner, leaderboard_report};
use darts_core::AppInfo;

/// Replays a scripted darts match and writes its event log and summary.
#[derive(Debug, Parser)]
#[command(
    name = "darts-cli",
    author,
    version,
    about = "Darts scorekeeper match replay"
)]
struct Cli {
    /// Path to the YAML match file.
    #[arg(short, long, value_name = "FILE", default_value = "demos/match.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Exit after validating the configuration (nothing is replayed).
    #[arg(long)]
    validate_only: bool,

    /// Print the standings from the configured store and exit.
    #[arg(long)]
    leaderboard: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = MatchConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let player_count = config.players.len();
    let steps = config.script.len();

    if cli.leaderboard {
        let store = outputs
            .store_json
            .as_ref()
            .context("--leaderboard needs outputs.store_json in the configuration")?;
        print!("{}", leaderboard_report(store)?);
        return Ok(());
    }

    println!(
        "{} {} ({})",
        AppInfo::name(),
        AppInfo::version(),
        AppInfo::codename()
    );
    println!(
        "Loaded match '{run_id}' with {player_count} player{} and {steps} scripted step{}",
        if player_count == 1 { "" } else { "s" },
        if steps == 1 { "" } else { "s" }
    );

    if cli.validate_only {
        println!("Validation-only mode: replay skipped.");
        return Ok(());
    }

    let logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let runner = MatchRunner::new(config, outputs);
    let summary = runner.run()?;

    match summary.winner.as_deref() {
        Some(winner) => println!("Match complete for '{run_id}': {winner} wins"),
        None => println!("Replay finished for '{run_id}': match still in progress"),
    }
    println!(
        "Events: {} rows ({} rejected) at {}",
        summary.steps_run,
        summary.rejected,
        summary.events_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(store) = summary.store_path.as_ref() {
        println!("Store: {}", store.display());
    }
    if let Some(err) = summary.store_error.as_ref() {
        eprintln!("WARN: match data was not fully saved: {err}");
    }
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}
