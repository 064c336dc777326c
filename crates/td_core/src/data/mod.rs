//! Configuration snapshot consumed by the simulation.
//!
//! Plain data structures mirroring the game's JSON configuration
//! (camelCase field names). Every section is optional on the wire and falls
//! back to zero or empty values, so a loaded config must pass
//! [`GameConfig::validate`] before a world is built from it.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! File loading is handled by `td_headless`.

mod game_config;
mod tower_data;
mod wave_data;

pub use game_config::{
    ColorConfig, GameConfig, PathConfig, TowerPlacementConfig, UpgradeConfig, VisualConfig,
    WaypointConfig, DEFAULT_COIN_SPEED, DEFAULT_MIN_DISTANCE_FROM_PATH, DEFAULT_MIN_TOWER_SPACING,
    DEFAULT_PROJECTILE_SPEED, DEFAULT_WORLD_HEIGHT, UI_MARGIN,
};
pub use tower_data::TowerTypeConfig;
pub use wave_data::{EnemyConfig, WaveConfig, WaveEnemyConfig};
