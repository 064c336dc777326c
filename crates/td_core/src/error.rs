//! Error types for the tower defense simulation.

use thiserror::Error;

use crate::tower::TowerId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all simulation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    /// A path was built from an empty waypoint list.
    #[error("Path must have at least one waypoint")]
    EmptyPath,

    /// Waypoint lookup outside the path.
    #[error("Waypoint index out of bounds: {index} (path has {count} waypoints)")]
    WaypointOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of waypoints on the path.
        count: usize,
    },

    /// Malformed configuration data.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No tower type with this identifier is configured.
    #[error("Unknown tower type: {0}")]
    UnknownTowerType(u32),

    /// No placed tower with this identifier.
    #[error("Tower not found: {0}")]
    TowerNotFound(TowerId),

    /// The budget cannot cover a purchase.
    #[error("Insufficient funds: need {required}, have {available}")]
    InsufficientFunds {
        /// Cost of the purchase.
        required: i32,
        /// Budget at the time of the attempt.
        available: i32,
    },

    /// Placement rules reject this point.
    #[error("Invalid tower placement at ({x}, {y})")]
    InvalidPlacement {
        /// Requested x coordinate.
        x: f32,
        /// Requested y coordinate.
        y: f32,
    },

    /// The configuration carries no upgrade table.
    #[error("No upgrades are configured")]
    UpgradesNotConfigured,

    /// Strategy index outside the known strategies.
    #[error("Invalid targeting strategy index: {0}")]
    InvalidStrategyIndex(usize),
}
