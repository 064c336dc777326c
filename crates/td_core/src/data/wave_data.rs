//! Enemy and wave spawn definitions.

use serde::{Deserialize, Serialize};

use crate::enemy::EnemyStats;

/// An enemy present when the match starts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnemyConfig {
    /// Starting health.
    pub health: i32,

    /// Speed in world units per second.
    pub speed: f32,

    /// Informational. Initial enemies are all on the field at start.
    pub spawn_time: f32,

    /// Money dropped on death. Zero means the default reward.
    pub reward: i32,
}

impl EnemyConfig {
    /// Stats with the default reward applied.
    #[must_use]
    pub fn stats(&self) -> EnemyStats {
        EnemyStats::new(self.health, self.speed, self.reward).with_default_reward()
    }
}

/// One entry of a wave's spawn list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WaveEnemyConfig {
    /// Starting health.
    pub health: i32,

    /// Speed in world units per second.
    pub speed: f32,

    /// Seconds after the wave start.
    pub spawn_delay: f32,

    /// Money dropped on death. Zero means the default reward.
    pub reward: i32,
}

impl WaveEnemyConfig {
    /// Stats with the default reward applied.
    #[must_use]
    pub fn stats(&self) -> EnemyStats {
        EnemyStats::new(self.health, self.speed, self.reward).with_default_reward()
    }
}

/// A time-triggered batch of spawns.
///
/// # Example JSON
///
/// ```json
/// {
///   "waveNumber": 1,
///   "startTime": 2.0,
///   "enemies": [
///     { "health": 100, "speed": 50, "spawnDelay": 0.0, "reward": 10 },
///     { "health": 100, "speed": 50, "spawnDelay": 1.5 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WaveConfig {
    /// Number shown to the player.
    pub wave_number: u32,

    /// Game-clock second at which the wave begins.
    pub start_time: f32,

    /// Spawns, each relative to `start_time`.
    pub enemies: Vec<WaveEnemyConfig>,
}

impl WaveConfig {
    /// Sum of starting health across the wave.
    #[must_use]
    pub fn total_health(&self) -> i64 {
        self.enemies.iter().map(|e| i64::from(e.health)).sum()
    }

    /// Sum of rewards across the wave, with defaults applied.
    #[must_use]
    pub fn total_reward(&self) -> i64 {
        self.enemies.iter().map(|e| i64::from(e.stats().reward)).sum()
    }
}
