//! # TD Core
//!
//! Real-time tower defense simulation core.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO
//! - No clock (the caller supplies `dt`)
//! - No randomness
//!
//! This separation enables:
//! - Headless runners and balance tooling
//! - Determinism testing (same config and `dt` sequence, same state hash)
//! - Any frontend driving [`world::GameWorld`] through its accessors
//!
//! ## Crate Structure
//!
//! - [`path`] - Polyline and arc-length spline routes
//! - [`enemy`] - Path-walking enemies and the enemy roster
//! - [`movers`] - Projectiles and money coins
//! - [`targeting`] - Tower target selection
//! - [`tower`] - Towers and upgrades
//! - [`waves`] - Wave scheduling
//! - [`world`] - The match: tick order, placement and economy rules
//! - [`data`] - Configuration snapshot types

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod data;
pub mod economy;
pub mod enemy;
pub mod enemy_kind;
pub mod error;
pub mod math;
pub mod movers;
pub mod path;
pub mod targeting;
pub mod tower;
pub mod waves;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::data::{
        EnemyConfig, GameConfig, PathConfig, TowerPlacementConfig, TowerTypeConfig,
        UpgradeConfig, WaveConfig, WaveEnemyConfig,
    };
    pub use crate::economy::BudgetManager;
    pub use crate::enemy::{Enemy, EnemyId, EnemyRoster, EnemyStats, Facing};
    pub use crate::enemy_kind::EnemyKind;
    pub use crate::error::{GameError, Result};
    pub use crate::math::Position;
    pub use crate::movers::{MoneyCoin, MovingObject, Projectile};
    pub use crate::path::{Path, PathKind};
    pub use crate::targeting::TargetingStrategy;
    pub use crate::tower::{Tower, TowerId, Upgrade, UpgradeStat};
    pub use crate::waves::WaveManager;
    pub use crate::world::{GameState, GameWorld};
}
