//! Headless tower defense runner.
//!
//! This binary runs a match without graphics, either to completion or
//! controlled via JSON on stdin/stdout. Designed for balance work and CI.
//!
//! # Usage
//!
//! ```bash
//! # Run a match to completion
//! cargo run -p td_headless -- run --config game-config.json
//!
//! # Drive a match over the JSON-lines protocol
//! cargo run -p td_headless -- interactive --config game-config.json
//!
//! # Print the balance report
//! cargo run -p td_headless -- analyze --config game-config.json
//!
//! # Check that two runs agree tick for tick
//! cargo run -p td_headless -- verify --config game-config.json --ticks 3600
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information
//!
//! See the protocol module for command/response format.

use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use td_core::data::GameConfig;
use td_test_utils::determinism::run_lockstep;
use td_headless::{
    analyzer::analyze,
    protocol::WorldSnapshot,
    runner::{HeadlessConfig, HeadlessRunner, DEFAULT_DT, DEFAULT_MAX_TICKS},
    scenario::load_config,
};

#[derive(Parser)]
#[command(name = "td_headless")]
#[command(about = "Headless tower defense runner for balance analysis and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a match until it is won, lost or out of ticks
    Run {
        /// Game configuration file (.json or .ron)
        #[arg(short, long)]
        config: PathBuf,

        /// Maximum number of ticks to simulate
        #[arg(short, long, default_value_t = DEFAULT_MAX_TICKS)]
        ticks: u64,

        /// Seconds per tick
        #[arg(long, default_value_t = DEFAULT_DT)]
        dt: f32,

        /// Output state after every tick
        #[arg(long)]
        auto_state: bool,
    },

    /// Drive a match with JSON commands on stdin
    Interactive {
        /// Game configuration file (.json or .ron)
        #[arg(short, long)]
        config: PathBuf,

        /// Seconds per tick when a command does not say
        #[arg(long, default_value_t = DEFAULT_DT)]
        dt: f32,
    },

    /// Print a balance report for a configuration
    Analyze {
        /// Game configuration file (.json or .ron)
        #[arg(short, long)]
        config: PathBuf,

        /// Emit JSON instead of markdown
        #[arg(long)]
        json: bool,
    },

    /// Verify determinism by running the same configuration twice
    Verify {
        /// Game configuration file (.json or .ron)
        #[arg(short, long)]
        config: PathBuf,

        /// Number of ticks to compare
        #[arg(short, long, default_value = "3600")]
        ticks: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Commands::Run {
            config,
            ticks,
            dt,
            auto_state,
        } => cmd_run(&config, ticks, dt, auto_state),
        Commands::Interactive { config, dt } => cmd_interactive(&config, dt),
        Commands::Analyze { config, json } => cmd_analyze(&config, json),
        Commands::Verify { config, ticks } => cmd_verify(&config, ticks),
    }
}

/// Load a config or exit with an error.
fn load_or_exit(path: &Path) -> GameConfig {
    match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, path = %path.display(), "Failed to load config");
            std::process::exit(1);
        }
    }
}

/// Build a runner or exit with an error.
fn runner_or_exit(game: GameConfig, config: HeadlessConfig) -> HeadlessRunner {
    match HeadlessRunner::new(game, config) {
        Ok(runner) => runner,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start match");
            std::process::exit(1);
        }
    }
}

/// Run a match to completion
fn cmd_run(path: &Path, max_ticks: u64, dt: f32, auto_state: bool) {
    let game = load_or_exit(path);
    let mut runner = runner_or_exit(game, HeadlessConfig { dt, max_ticks });

    tracing::info!(max_ticks, dt, "Starting run");
    let summary = runner.run_to_completion(|world| {
        if auto_state {
            print_json(&WorldSnapshot::capture(world));
        }
    });

    tracing::info!(
        state = %summary.game_state,
        ticks = summary.ticks,
        lives = summary.lives,
        budget = summary.budget,
        "Run finished"
    );
    print_json(&summary);
}

/// Serve the JSON-lines protocol on stdin/stdout
fn cmd_interactive(path: &Path, dt: f32) {
    let game = load_or_exit(path);
    let config = HeadlessConfig {
        dt,
        ..HeadlessConfig::default()
    };
    let mut runner = runner_or_exit(game, config);

    tracing::info!("Starting interactive session");
    let stdin = io::stdin();
    if let Err(e) = runner.serve(stdin.lock(), io::stdout().lock()) {
        tracing::error!(error = %e, "Protocol IO failed");
        std::process::exit(1);
    }
}

/// Print the balance report
fn cmd_analyze(path: &Path, json: bool) {
    let game = load_or_exit(path);
    let report = match analyze(&game) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Analysis failed");
            std::process::exit(1);
        }
    };

    if json {
        match report.to_json() {
            Ok(text) => println!("{text}"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize report");
                std::process::exit(1);
            }
        }
    } else {
        println!("{}", report.to_markdown());
    }

    if report.has_warnings() {
        tracing::warn!("Balance warnings found");
    }
}

/// Run the config twice and compare hashes
fn cmd_verify(path: &Path, ticks: u64) {
    let game = load_or_exit(path);
    tracing::info!(ticks, "Verifying determinism");

    let report = match run_lockstep(&game, ticks, DEFAULT_DT) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start match");
            std::process::exit(1);
        }
    };

    if report.is_deterministic() {
        eprintln!("PASS: both runs produced hash {:#018x} after {} ticks", report.hashes[0], ticks);
    } else {
        eprintln!(
            "FAIL: Non-determinism detected at tick {}",
            report.first_divergence.unwrap_or(ticks)
        );
        std::process::exit(1);
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::error!(error = %e, "Failed to serialize output"),
    }
}
