//! JSON protocol for headless game communication.
//!
//! The headless runner communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin):** Commands from the controller
//! **Output (stdout):** World snapshots and responses
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready",...}`
//! 2. Controller sends commands as JSON lines
//! 3. Runner answers every command with exactly one line
//! 4. `quit` is acknowledged and ends the session
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","tick":0,"total_waves":3,"path_length":1960.0}
//! -> {"cmd":"place","x":150,"y":250,"tower_type":1}
//! <- {"type":"placed","tower_id":0,"budget":450}
//! -> {"cmd":"tick","count":60}
//! <- {"type":"state","tick":60,"game_state":"playing",...}
//! -> {"cmd":"strategy","tower_id":0,"strategy":"weakest"}
//! <- {"type":"ack","cmd":"strategy"}
//! -> {"cmd":"quit"}
//! <- {"type":"ack","cmd":"quit"}
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use td_core::targeting::TargetingStrategy;
use td_core::tower::UpgradeStat;
use td_core::world::{GameState, GameWorld};

/// Protocol version reported in the ready line.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Error type for protocol input.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Line was blank.
    #[error("Empty command line")]
    Empty,
    /// Line was not a known command.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

// ============================================================================
// Input Commands (Controller -> Runner)
// ============================================================================

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Advance simulation by N ticks (default: 1).
    Tick {
        /// Ticks to run.
        #[serde(default = "default_tick_count")]
        count: u32,
        /// Step length in seconds; the runner default when absent.
        #[serde(default)]
        dt: Option<f32>,
    },

    /// Query current world state without advancing time.
    Query,

    /// Buy a tower of `tower_type` at `(x, y)`.
    Place {
        /// World x coordinate.
        x: f32,
        /// World y coordinate.
        y: f32,
        /// Configured tower type id.
        tower_type: u32,
    },

    /// Buy one configured upgrade step for a tower.
    Upgrade {
        /// Tower to upgrade.
        tower_id: u32,
        /// Stat to raise.
        stat: UpgradeStat,
    },

    /// Set a tower's targeting strategy.
    Strategy {
        /// Tower to retarget.
        tower_id: u32,
        /// New targeting strategy.
        strategy: TargetingStrategy,
    },

    /// Freeze the simulation.
    Pause,

    /// Unfreeze the simulation.
    Resume,

    /// End the session.
    Quit,
}

fn default_tick_count() -> u32 {
    1
}

// ============================================================================
// Output Responses (Runner -> Controller)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready {
        /// Protocol version.
        version: String,
        /// Current tick, zero for a fresh match.
        tick: u64,
        /// Number of configured waves.
        total_waves: usize,
        /// Length of the enemy path in world units.
        path_length: f32,
    },

    /// Acknowledgment of a command.
    Ack {
        /// Name of the acknowledged command.
        cmd: String,
    },

    /// Error processing a command.
    Error {
        /// Human-readable reason.
        message: String,
        /// Name of the failed command, if the line parsed.
        cmd: Option<String>,
    },

    /// A tower was bought.
    Placed {
        /// Id of the new tower.
        tower_id: u32,
        /// Budget left after the purchase.
        budget: i32,
    },

    /// Current world state.
    State(WorldSnapshot),
}

// ============================================================================
// State Types
// ============================================================================

/// Everything a controller can observe between ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Ticks simulated so far.
    pub tick: u64,
    /// Seconds of game time elapsed.
    pub game_time: f32,
    /// Match state.
    pub game_state: GameState,
    /// Lives left.
    pub lives: i32,
    /// Money available.
    pub budget: i32,
    /// Number of waves that have started.
    pub wave: u32,
    /// Number of configured waves.
    pub total_waves: usize,
    /// Whether every scheduled enemy has spawned.
    pub waves_complete: bool,
    /// Enemies still in the world, in id order.
    pub enemies: Vec<EnemyState>,
    /// Towers in placement order.
    pub towers: Vec<TowerState>,
    /// Projectiles in flight.
    pub projectiles: usize,
    /// Coins in flight.
    pub coins: usize,
    /// Deterministic state hash.
    pub hash: u64,
}

/// State of a single enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyState {
    /// Enemy id.
    pub id: u64,
    /// World x coordinate.
    pub x: f32,
    /// World y coordinate.
    pub y: f32,
    /// Remaining health, negative after overkill.
    pub health: i32,
    /// Normalized progress along the path.
    pub progress: f32,
}

/// State of a single tower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerState {
    /// Tower id.
    pub id: u32,
    /// Configured tower type id.
    pub tower_type: u32,
    /// World x coordinate.
    pub x: f32,
    /// World y coordinate.
    pub y: f32,
    /// Damage per projectile.
    pub damage: i32,
    /// Targeting radius.
    pub range: f32,
    /// Seconds between shots.
    pub attack_cooldown: f32,
    /// Targeting strategy in use.
    pub strategy: TargetingStrategy,
}

impl WorldSnapshot {
    /// Capture the observable state of `world`.
    #[must_use]
    pub fn capture(world: &GameWorld) -> Self {
        Self {
            tick: world.tick(),
            game_time: world.game_time(),
            game_state: world.state(),
            lives: world.lives(),
            budget: world.budget(),
            wave: world.current_wave_number(),
            total_waves: world.total_waves(),
            waves_complete: world.all_waves_complete(),
            enemies: world
                .enemies()
                .iter()
                .map(|enemy| EnemyState {
                    id: enemy.id().0,
                    x: enemy.position().x,
                    y: enemy.position().y,
                    health: enemy.health(),
                    progress: enemy.path_progress(),
                })
                .collect(),
            towers: world
                .towers()
                .iter()
                .map(|tower| TowerState {
                    id: tower.id().0,
                    tower_type: tower.type_id(),
                    x: tower.position().x,
                    y: tower.position().y,
                    damage: tower.damage(),
                    range: tower.range(),
                    attack_cooldown: tower.base_cooldown(),
                    strategy: tower.targeting_strategy(),
                })
                .collect(),
            projectiles: world.projectiles().len(),
            coins: world.coins().len(),
            hash: world.state_hash(),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response for a fresh world.
    pub fn ready(world: &GameWorld) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            tick: world.tick(),
            total_waves: world.total_waves(),
            path_length: world.path().length(),
        }
    }

    /// Create an acknowledgment.
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        let json = json.trim();
        if json.is_empty() {
            return Err(ProtocolError::Empty);
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Get command name for acknowledgment.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tick { .. } => "tick",
            Self::Query => "query",
            Self::Place { .. } => "place",
            Self::Upgrade { .. } => "upgrade",
            Self::Strategy { .. } => "strategy",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Quit => "quit",
        }
    }
}
