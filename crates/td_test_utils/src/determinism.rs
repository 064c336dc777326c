//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! The world is deterministic for a given configuration and `dt` sequence.
//! Sources of non-determinism to guard against:
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Every entity collection is a `Vec` iterated in insertion order.
//!
//! - **System clock**: the core never reads time. The caller supplies `dt`.
//!
//! - **Unstable sorts**: the wave timetable uses a stable sort so equal
//!   spawn times keep their configured order.
//!
//! Floating point is used throughout; the same binary on the same target
//! reproduces bit-identical results, which is what these checks assert.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use td_core::data::GameConfig;
use td_core::error::Result;
use td_core::world::GameWorld;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one tick
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run two worlds built from `config` for `ticks` steps of `dt` and compare
/// their final state hashes.
///
/// # Errors
///
/// Returns the configuration error if the world cannot be built.
pub fn verify_world_determinism(
    config: &GameConfig,
    ticks: u64,
    dt: f32,
) -> Result<DeterminismResult> {
    // Fail on a bad config before running anything
    GameWorld::new(config.clone())?;

    Ok(verify_determinism(
        2,
        ticks,
        || GameWorld::new(config.clone()).ok(),
        |world| {
            if let Some(world) = world {
                world.update(dt);
            }
        },
        |world| world.as_ref().map_or(0, GameWorld::state_hash),
    ))
}

/// Run `num_worlds` copies of `config` on scoped threads and collect the
/// final hashes.
///
/// # Errors
///
/// Returns the configuration error if the world cannot be built.
///
/// # Panics
///
/// Re-raises a panic from any worker thread.
pub fn run_parallel_worlds(
    config: &GameConfig,
    num_worlds: usize,
    ticks: u64,
    dt: f32,
) -> Result<DeterminismResult> {
    let worlds = (0..num_worlds)
        .map(|_| GameWorld::new(config.clone()))
        .collect::<Result<Vec<_>>>()?;

    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = worlds
            .into_iter()
            .map(|mut world| {
                s.spawn(move || {
                    for _ in 0..ticks {
                        world.update(dt);
                    }
                    world.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    });

    Ok(DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks,
    })
}

/// Two worlds stepped side by side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockstepReport {
    /// Number of ticks simulated.
    pub ticks: u64,
    /// Final state hash of each world.
    pub hashes: [u64; 2],
    /// First tick whose hashes differed; `Some(0)` if the fresh worlds
    /// already disagreed.
    pub first_divergence: Option<u64>,
}

impl LockstepReport {
    /// Whether both worlds agreed on every tick.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.first_divergence.is_none() && self.hashes[0] == self.hashes[1]
    }
}

/// Run two worlds built from `config` in lockstep for `ticks` steps of `dt`,
/// comparing state hashes after every tick.
///
/// # Errors
///
/// Returns the configuration error if the world cannot be built.
pub fn run_lockstep(config: &GameConfig, ticks: u64, dt: f32) -> Result<LockstepReport> {
    let mut a = GameWorld::new(config.clone())?;
    let mut b = GameWorld::new(config.clone())?;
    let mut first_divergence = (a.state_hash() != b.state_hash()).then_some(0);

    for tick in 1..=ticks {
        a.update(dt);
        b.update(dt);

        if first_divergence.is_none() && a.state_hash() != b.state_hash() {
            tracing::warn!(tick, "Worlds diverged");
            first_divergence = Some(tick);
        }
    }

    Ok(LockstepReport {
        ticks,
        hashes: [a.state_hash(), b.state_hash()],
        first_divergence,
    })
}

/// Compare two runs tick-by-tick, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs agree (or the config is invalid), `Some(tick)` for the
/// first tick whose hashes differ.
#[must_use]
pub fn find_first_divergence(config: &GameConfig, ticks: u64, dt: f32) -> Option<u64> {
    run_lockstep(config, ticks, dt)
        .ok()
        .and_then(|report| report.first_divergence)
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for simulation inputs.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of paths, placement and the world.
pub mod strategies {
    use proptest::prelude::*;
    use td_core::data::{EnemyConfig, WaveConfig, WaveEnemyConfig};
    use td_core::math::Position;
    use td_core::path::PathKind;
    use td_core::targeting::TargetingStrategy;

    /// Generate a coordinate in half-unit steps.
    ///
    /// Range: -1000 to 1000
    pub fn arb_coordinate() -> impl Strategy<Value = f32> {
        (-2000i32..2000i32).prop_map(|n| n as f32 / 2.0)
    }

    /// Generate a position.
    pub fn arb_position() -> impl Strategy<Value = Position> {
        (arb_coordinate(), arb_coordinate()).prop_map(|(x, y)| Position::new(x, y))
    }

    /// Generate a waypoint list whose consecutive points are at least one
    /// unit apart.
    pub fn arb_waypoints(max_len: usize) -> impl Strategy<Value = Vec<Position>> {
        proptest::collection::vec(arb_position(), 2..max_len.max(3)).prop_filter(
            "consecutive waypoints must be distinct",
            |points| points.windows(2).all(|w| w[0].distance(w[1]) >= 1.0),
        )
    }

    /// Generate a zigzag route of 3 or more legs, 100 to 400 units each,
    /// turning 90 to 170 degrees at every interior corner.
    pub fn arb_sharp_route(max_legs: usize) -> impl Strategy<Value = Vec<Position>> {
        let leg = (100u32..400u32, 90u32..=170u32, any::<bool>());
        (
            arb_position(),
            0u32..360u32,
            proptest::collection::vec(leg, 3..max_legs.max(4)),
        )
            .prop_map(|(start, heading, legs)| {
                let mut heading = (heading as f32).to_radians();
                let mut at = start;
                let mut points = vec![start];
                for (i, (length, turn, left)) in legs.into_iter().enumerate() {
                    if i > 0 {
                        let turn = (turn as f32).to_radians();
                        heading += if left { turn } else { -turn };
                    }
                    let length = length as f32;
                    at = Position::new(at.x + heading.cos() * length, at.y + heading.sin() * length);
                    points.push(at);
                }
                points
            })
    }

    /// Generate a path layout.
    pub fn arb_path_kind() -> impl Strategy<Value = PathKind> {
        prop_oneof![Just(PathKind::Polyline), Just(PathKind::Spline)]
    }

    /// Generate normalized path progress.
    pub fn arb_progress() -> impl Strategy<Value = f32> {
        (0u32..=1000u32).prop_map(|n| n as f32 / 1000.0)
    }

    /// Generate a frame delta in seconds (1ms to 100ms).
    pub fn arb_dt() -> impl Strategy<Value = f32> {
        (1u32..=100u32).prop_map(|n| n as f32 / 1000.0)
    }

    /// Generate health values (1-1000).
    pub fn arb_health() -> impl Strategy<Value = i32> {
        1i32..1000i32
    }

    /// Generate damage values (1-100).
    pub fn arb_damage() -> impl Strategy<Value = i32> {
        1i32..100i32
    }

    /// Generate tower ranges (0-300).
    pub fn arb_range() -> impl Strategy<Value = f32> {
        (0u32..=300u32).prop_map(|n| n as f32)
    }

    /// Generate a targeting strategy.
    pub fn arb_strategy() -> impl Strategy<Value = TargetingStrategy> {
        prop_oneof![
            Just(TargetingStrategy::Nearest),
            Just(TargetingStrategy::Strongest),
            Just(TargetingStrategy::Weakest),
        ]
    }

    /// Generate an initial enemy.
    pub fn arb_enemy_config() -> impl Strategy<Value = EnemyConfig> {
        (arb_health(), 0u32..150u32, 0i32..50i32).prop_map(|(health, speed, reward)| EnemyConfig {
            health,
            speed: speed as f32,
            spawn_time: 0.0,
            reward,
        })
    }

    /// Generate a wave starting at `start_time`.
    pub fn arb_wave(wave_number: u32, start_time: f32) -> impl Strategy<Value = WaveConfig> {
        proptest::collection::vec((arb_health(), 10u32..120u32, 0u32..100u32), 1..10).prop_map(
            move |spawns| WaveConfig {
                wave_number,
                start_time,
                enemies: spawns
                    .into_iter()
                    .map(|(health, speed, delay)| WaveEnemyConfig {
                        health,
                        speed: speed as f32,
                        spawn_delay: delay as f32 / 10.0,
                        reward: 0,
                    })
                    .collect(),
            },
        )
    }
}
