//! Headless game runner implementation.

use std::io::{self, BufRead, Write};

use serde::{Deserialize, Serialize};

use td_core::data::GameConfig;
use td_core::error::Result;
use td_core::tower::TowerId;
use td_core::world::{GameState, GameWorld};

use crate::protocol::{Command, Response, WorldSnapshot};

/// Fixed simulation step: 60 ticks per second.
pub const DEFAULT_DT: f32 = 1.0 / 60.0;

/// Default tick budget for a batch run: ten minutes of game time.
pub const DEFAULT_MAX_TICKS: u64 = 10 * 60 * 60;

/// Headless runner configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadlessConfig {
    /// Seconds per tick.
    pub dt: f32,
    /// Tick limit for [`HeadlessRunner::run_to_completion`].
    pub max_ticks: u64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            dt: DEFAULT_DT,
            max_ticks: DEFAULT_MAX_TICKS,
        }
    }
}

/// Outcome of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Match state when the run stopped.
    pub game_state: GameState,
    /// Ticks simulated.
    pub ticks: u64,
    /// Seconds of game time elapsed.
    pub game_time: f32,
    /// Lives left.
    pub lives: i32,
    /// Money left.
    pub budget: i32,
    /// Waves that started.
    pub waves_started: u32,
    /// Waves configured.
    pub total_waves: usize,
    /// Towers standing.
    pub towers: usize,
    /// Final state hash.
    pub hash: u64,
}

/// Drives a [`GameWorld`] at a fixed step, in batch or over the JSON protocol.
pub struct HeadlessRunner {
    world: GameWorld,
    config: HeadlessConfig,
}

impl HeadlessRunner {
    /// Create a runner for a new match.
    pub fn new(game: GameConfig, config: HeadlessConfig) -> Result<Self> {
        let world = GameWorld::new(game)?;
        Ok(Self { world, config })
    }

    /// The simulated world.
    pub fn world(&self) -> &GameWorld {
        &self.world
    }

    /// Tick until the match ends or the tick limit is hit.
    ///
    /// `on_tick` sees the world after every tick.
    pub fn run_to_completion(&mut self, mut on_tick: impl FnMut(&GameWorld)) -> RunSummary {
        let mut last_wave = self.world.current_wave_number();

        while !self.world.state().is_terminal() && self.world.tick() < self.config.max_ticks {
            self.world.update(self.config.dt);
            on_tick(&self.world);

            let wave = self.world.current_wave_number();
            if wave != last_wave {
                tracing::info!(
                    wave,
                    tick = self.world.tick(),
                    lives = self.world.lives(),
                    budget = self.world.budget(),
                    "Wave started"
                );
                last_wave = wave;
            }
        }

        if !self.world.state().is_terminal() {
            tracing::warn!(ticks = self.config.max_ticks, "Tick limit reached before the match ended");
        }
        self.summary()
    }

    /// Summary of the match so far.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            game_state: self.world.state(),
            ticks: self.world.tick(),
            game_time: self.world.game_time(),
            lives: self.world.lives(),
            budget: self.world.budget(),
            waves_started: self.world.current_wave_number(),
            total_waves: self.world.total_waves(),
            towers: self.world.towers().len(),
            hash: self.world.state_hash(),
        }
    }

    /// Apply one protocol command and produce its response.
    pub fn execute(&mut self, command: &Command) -> Response {
        let name = command.name();
        let outcome = match *command {
            Command::Tick { count, dt } => {
                let dt = dt.unwrap_or(self.config.dt);
                if !dt.is_finite() || dt < 0.0 {
                    return Response::error(format!("Invalid dt {dt}"), Some(name));
                }
                for _ in 0..count {
                    self.world.update(dt);
                }
                return Response::State(WorldSnapshot::capture(&self.world));
            }
            Command::Query => return Response::State(WorldSnapshot::capture(&self.world)),
            Command::Place { x, y, tower_type } => {
                return match self.world.place_tower(x, y, tower_type) {
                    Ok(id) => Response::Placed {
                        tower_id: id.0,
                        budget: self.world.budget(),
                    },
                    Err(e) => Response::error(e.to_string(), Some(name)),
                };
            }
            Command::Upgrade { tower_id, stat } => {
                self.world.purchase_upgrade(TowerId(tower_id), stat)
            }
            Command::Strategy { tower_id, strategy } => {
                self.world.set_targeting_strategy(TowerId(tower_id), strategy)
            }
            Command::Pause => {
                self.world.set_game_state(GameState::Paused);
                Ok(())
            }
            Command::Resume => {
                self.world.set_game_state(GameState::Playing);
                Ok(())
            }
            Command::Quit => Ok(()),
        };

        match outcome {
            Ok(()) => Response::ack(name),
            Err(e) => Response::error(e.to_string(), Some(name)),
        }
    }

    /// Serve the JSON-lines protocol until `quit` or end of input.
    pub fn serve<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        write!(output, "{}", Response::ready(&self.world).to_json_line())?;
        output.flush()?;

        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let response = match Command::from_json(&line) {
                Ok(command) => {
                    tracing::debug!(cmd = command.name(), "Command received");
                    let response = self.execute(&command);
                    if command == Command::Quit {
                        write!(output, "{}", response.to_json_line())?;
                        output.flush()?;
                        return Ok(());
                    }
                    response
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Rejected command line");
                    Response::error(e.to_string(), None)
                }
            };

            write!(output, "{}", response.to_json_line())?;
            output.flush()?;
        }

        tracing::info!("Input closed");
        Ok(())
    }
}
