//! Time-driven wave spawning.
//!
//! All configured waves are flattened once into a single timetable of
//! `(absolute spawn time, stats)` entries. Each update advances the game
//! clock and releases every entry that has come due, in order.

use std::sync::Arc;

use crate::data::WaveConfig;
use crate::enemy::{EnemyRoster, EnemyStats};
use crate::path::Path;

/// One scheduled spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingSpawn {
    time: f32,
    stats: EnemyStats,
}

/// Releases scheduled enemies as the game clock passes their spawn times.
#[derive(Debug, Clone)]
pub struct WaveManager {
    /// `(wave_number, start_time)` in configured order.
    waves: Vec<(u32, f32)>,
    timetable: Vec<PendingSpawn>,
    cursor: usize,
    game_time: f32,
    complete: bool,
}

impl WaveManager {
    /// Flatten `waves` into a timetable sorted by spawn time.
    ///
    /// The sort is stable: spawns due at the same instant keep their
    /// configured order.
    #[must_use]
    pub fn new(waves: &[WaveConfig]) -> Self {
        let mut timetable: Vec<PendingSpawn> = waves
            .iter()
            .flat_map(|wave| {
                wave.enemies.iter().map(move |enemy| PendingSpawn {
                    time: wave.start_time + enemy.spawn_delay,
                    stats: enemy.stats(),
                })
            })
            .collect();
        timetable.sort_by(|a, b| a.time.total_cmp(&b.time));

        Self {
            waves: waves.iter().map(|w| (w.wave_number, w.start_time)).collect(),
            timetable,
            cursor: 0,
            game_time: 0.0,
            complete: false,
        }
    }

    /// Advance the clock by `dt` and spawn everything now due.
    ///
    /// Returns the number of enemies spawned.
    pub fn update(&mut self, dt: f32, enemies: &mut EnemyRoster, path: &Arc<Path>) -> usize {
        self.game_time += dt;

        if self.complete {
            return 0;
        }

        let mut spawned = 0;
        while let Some(pending) = self.timetable.get(self.cursor) {
            if pending.time > self.game_time {
                break;
            }
            let id = enemies.spawn(path, pending.stats);
            tracing::debug!(
                enemy = %id,
                health = pending.stats.health,
                speed = pending.stats.speed,
                at = pending.time,
                "Enemy spawned"
            );
            self.cursor += 1;
            spawned += 1;
        }

        if self.cursor >= self.timetable.len() {
            self.complete = true;
        }
        spawned
    }

    /// True once every scheduled spawn has been released. Never resets.
    #[must_use]
    pub fn all_waves_complete(&self) -> bool {
        self.complete
    }

    /// Number of the latest wave that has started.
    ///
    /// Before the first start this is 1; with no waves configured it is 0.
    #[must_use]
    pub fn current_wave_number(&self) -> u32 {
        if self.waves.is_empty() {
            return 0;
        }
        self.waves
            .iter()
            .rev()
            .find(|&&(_, start)| self.game_time >= start)
            .map_or(1, |&(number, _)| number)
    }

    /// Number of configured waves.
    #[must_use]
    pub fn total_waves(&self) -> usize {
        self.waves.len()
    }

    /// Seconds of game time elapsed.
    #[must_use]
    pub fn game_time(&self) -> f32 {
        self.game_time
    }

    /// Spawns not yet released.
    #[must_use]
    pub fn remaining_spawns(&self) -> usize {
        self.timetable.len() - self.cursor
    }
}
