use std::path::PathBuf;

use clap::Parser;

use bisca_bench::config::{BenchmarkConfig, ResolvedOutputs};
use bisca_bench::logging::init_logging;
use bisca_bench::tournament::TournamentRunner;

/// Simulation harness pitting Bisca bots against each other.
#[derive(Debug, Parser)]
#[command(
    name = "bisca-bench",
    author,
    version,
    about = "Deterministic Bisca match harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of matches to play.
    #[arg(long, value_name = "MATCHES")]
    matches: Option<usize>,

    /// Override the RNG seed for match generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration.
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(matches) = cli.matches {
        config.deals.matches = matches;
    }

    if let Some(seed) = cli.seed {
        config.deals.seed = Some(seed);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let agent_count = config.agents.len();
    let run_id = config.run_id.clone();
    let matches = config.deals.matches;
    let hands = config.deals.hands_per_match;

    println!(
        "Loaded configuration '{run_id}' with {agent_count} agents ({matches} matches of {hands} hands)"
    );

    let logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = TournamentRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: no matches played.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Run complete for '{run_id}': {} matches, {} hands -> {} rows at {}",
        summary.matches_played,
        summary.hands_played,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    for row in &summary.standings {
        println!(
            "  {:<16} chips {:>4}  wins {:>3}/{}",
            row.name, row.chips, row.match_wins, row.matches
        );
    }
    if let Some(guard) = logging_guard.as_ref() {
        println!("Trace log: {}", guard.trace_path.display());
    }

    Ok(())
}
