//! Headless tower defense runner for balance work and CI verification.
//!
//! This crate drives a [`td_core::world::GameWorld`] without graphics. It can:
//!
//! - **Run** a configuration to completion at a fixed step
//! - **Serve** a JSON-lines protocol so an external controller can play
//! - **Analyze** a configuration's tower and wave balance statically
//! - **Verify** that two runs of the same configuration agree tick for tick
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands from controller (tick, place, upgrade, etc.)
//! - **stdout**: Snapshots and responses (JSON)
//! - **stderr**: Debug logs (human-readable)
//!
//! See the [`protocol`] module for the command and response formats.
//!
//! # Example
//!
//! ```bash
//! # Drive a match interactively
//! echo '{"cmd":"tick","count":60}' | cargo run -p td_headless -- interactive --config game-config.json
//!
//! # Balance report as JSON
//! cargo run -p td_headless -- analyze --config game-config.ron --json
//! ```

#![warn(missing_docs)]

pub mod analyzer;
pub mod protocol;
pub mod runner;
pub mod scenario;

pub use analyzer::{analyze, BalanceReport, Recommendation};
pub use protocol::{Command, Response, WorldSnapshot};
pub use runner::{HeadlessConfig, HeadlessRunner, RunSummary};
pub use scenario::{load_config, ScenarioError};
