//! Built-in enemy archetypes and generated waves.
//!
//! Configured waves carry explicit stats. The archetypes here give a fixed
//! roster for procedurally built waves:
//!
//! | Kind  | Health | Speed | Reward |
//! |-------|--------|-------|--------|
//! | Basic | 100    | 50    | 10     |
//! | Fast  | 50     | 100   | 15     |
//! | Tank  | 300    | 25    | 30     |
//! | Boss  | 1000   | 20    | 100    |
//!
//! # Example
//!
//! ```
//! use td_core::enemy_kind::EnemyKind;
//!
//! assert_eq!(EnemyKind::for_wave_slot(5, 0), EnemyKind::Boss);
//! assert_eq!(EnemyKind::from_name("TANK"), EnemyKind::Tank);
//! assert_eq!(EnemyKind::from_name("dragon"), EnemyKind::Basic);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::{WaveConfig, WaveEnemyConfig};
use crate::enemy::EnemyStats;

/// Enemy archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Balanced walker.
    #[default]
    Basic,
    /// Fragile runner.
    Fast,
    /// Slow and tough.
    Tank,
    /// Opens every fifth wave.
    Boss,
}

impl EnemyKind {
    /// Fixed stats for this archetype.
    #[must_use]
    pub const fn stats(self) -> EnemyStats {
        match self {
            Self::Basic => EnemyStats::new(100, 50.0, 10),
            Self::Fast => EnemyStats::new(50, 100.0, 15),
            Self::Tank => EnemyStats::new(300, 25.0, 30),
            Self::Boss => EnemyStats::new(1000, 20.0, 100),
        }
    }

    /// Parse a case-insensitive name. Unknown names are [`EnemyKind::Basic`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "fast" => Self::Fast,
            "tank" => Self::Tank,
            "boss" => Self::Boss,
            _ => Self::Basic,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Fast => "fast",
            Self::Tank => "tank",
            Self::Boss => "boss",
        }
    }

    /// Archetype for position `slot` of generated wave `wave`.
    #[must_use]
    pub const fn for_wave_slot(wave: u32, slot: u32) -> Self {
        if wave % 5 == 0 && slot == 0 {
            Self::Boss
        } else if wave >= 3 && slot % 4 == 0 {
            Self::Tank
        } else if wave >= 2 && slot % 3 == 0 {
            Self::Fast
        } else {
            Self::Basic
        }
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Build a wave of `count` archetype enemies spaced `interval` seconds apart.
#[must_use]
pub fn generate_wave(wave_number: u32, start_time: f32, count: u32, interval: f32) -> WaveConfig {
    let enemies = (0..count)
        .map(|slot| {
            let stats = EnemyKind::for_wave_slot(wave_number, slot).stats();
            WaveEnemyConfig {
                health: stats.health,
                speed: stats.speed,
                spawn_delay: slot as f32 * interval,
                reward: stats.reward,
            }
        })
        .collect();

    WaveConfig {
        wave_number,
        start_time,
        enemies,
    }
}
