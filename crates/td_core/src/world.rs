//! The match: every live entity plus the rules that tie them together.
//!
//! [`GameWorld`] is the single owner of the path, the budget, the wave
//! scheduler and the four entity collections. The embedding application
//! calls [`GameWorld::update`] once per frame with its own `dt` and reads
//! the accessors between ticks.
//!
//! # Tick order
//!
//! 1. Wave scheduler spawns due enemies
//! 2. Enemies walk the path
//! 3. Dead enemies become money coins, escaped enemies cost a life
//! 4. Terminal state check
//! 5. Coins fly, crediting the budget on arrival
//! 6. Towers cool down and fire
//! 7. Projectiles fly, damaging on arrival
//!
//! While paused only step 4 runs. Won and Lost are sticky.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::{GameConfig, TowerTypeConfig};
use crate::economy::BudgetManager;
use crate::enemy::{Enemy, EnemyRoster};
use crate::error::{GameError, Result};
use crate::math::{distance_to_segment, Position};
use crate::movers::{MoneyCoin, MovingObject, Projectile};
use crate::path::Path;
use crate::targeting::TargetingStrategy;
use crate::tower::{Tower, TowerId, Upgrade, UpgradeStat};
use crate::waves::WaveManager;

/// Half-width of the square used to hit-test towers.
pub const TOWER_HIT_HALF_SIZE: f32 = 20.0;

/// Match state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    /// Simulation running.
    #[default]
    Playing,
    /// Simulation frozen.
    Paused,
    /// Every wave spawned and cleared.
    Won,
    /// Out of lives.
    Lost,
}

impl GameState {
    /// Whether the match is over.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Won => "Won",
            Self::Lost => "Lost",
        };
        f.write_str(name)
    }
}

/// A running match.
#[derive(Debug, Clone)]
pub struct GameWorld {
    config: GameConfig,
    path: Arc<Path>,
    budget: BudgetManager,
    waves: WaveManager,
    enemies: EnemyRoster,
    towers: Vec<Tower>,
    projectiles: Vec<Projectile>,
    coins: Vec<MoneyCoin>,
    lives: i32,
    state: GameState,
    tick: u64,
    next_tower_id: u32,
    selected_tower_type: Option<usize>,
    selected_tower: Option<TowerId>,
}

impl GameWorld {
    /// Start a match from `config`.
    ///
    /// Initial enemies are placed at the start of the path and the first
    /// tower type is preselected.
    ///
    /// # Errors
    ///
    /// Any configuration error from [`GameConfig::validate`] or from building
    /// the path.
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;

        let path = Arc::new(Path::new(config.path.kind, config.waypoints())?);
        let mut enemies = EnemyRoster::new();
        for initial in &config.initial_enemies {
            enemies.spawn(&path, initial.stats());
        }

        tracing::info!(
            kind = ?path.kind(),
            length = path.length(),
            waves = config.waves.len(),
            initial_enemies = enemies.len(),
            "World created"
        );

        Ok(Self {
            budget: BudgetManager::new(config.initial_budget),
            waves: WaveManager::new(&config.waves),
            lives: config.initial_lives,
            selected_tower_type: (!config.tower_types.is_empty()).then_some(0),
            config,
            path,
            enemies,
            towers: Vec::new(),
            projectiles: Vec::new(),
            coins: Vec::new(),
            state: GameState::Playing,
            tick: 0,
            next_tower_id: 0,
            selected_tower: None,
        })
    }

    /// Advance the match by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if self.state == GameState::Paused {
            self.check_game_state();
            return;
        }

        // 1. Wave System
        self.waves.update(dt, &mut self.enemies, &self.path);

        // 2. Enemy Movement
        for enemy in self.enemies.iter_mut() {
            enemy.update(dt);
        }

        // 3. Casualty System
        self.remove_finished_enemies();

        // 4. Terminal State
        self.check_game_state();

        // 5. Coin System
        for coin in &mut self.coins {
            coin.update(dt, &mut self.budget);
        }
        self.coins.retain(|coin| !coin.is_resolved());

        // 6. Tower System
        for tower in &mut self.towers {
            tower.update(dt, self.enemies.as_slice(), &mut self.projectiles);
        }

        // 7. Projectile System
        for projectile in &mut self.projectiles {
            projectile.update(dt, &mut self.enemies);
        }
        self.projectiles.retain(|projectile| !projectile.has_hit());

        self.tick += 1;

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick = self.tick, state_hash = hash, "World state hash");
        }
    }

    /// Turn dead enemies into coins and charge a life per escape.
    fn remove_finished_enemies(&mut self) {
        let anchor = self.config.coin_anchor();
        let speed = self.config.coin_speed();
        let coins = &mut self.coins;
        let mut escaped = 0;

        self.enemies.retain(|enemy| {
            if !enemy.is_alive() {
                coins.push(MoneyCoin::new(enemy.position(), anchor, speed, enemy.reward()));
                false
            } else if enemy.has_reached_end() {
                escaped += 1;
                false
            } else {
                true
            }
        });

        if escaped > 0 {
            self.lives -= escaped;
            tracing::debug!(escaped, lives = self.lives, "Enemies escaped");
        }
    }

    fn check_game_state(&mut self) {
        if self.state != GameState::Playing {
            return;
        }

        if self.lives <= 0 {
            self.transition(GameState::Lost);
        } else if self.waves.all_waves_complete() && self.enemies.is_empty() {
            self.transition(GameState::Won);
        }
    }

    fn transition(&mut self, state: GameState) {
        tracing::info!(from = %self.state, to = %state, tick = self.tick, "Game state changed");
        self.state = state;
    }

    /// Pause or resume. A finished match stays finished.
    pub fn set_game_state(&mut self, state: GameState) {
        if self.state.is_terminal() {
            tracing::warn!(current = %self.state, requested = %state, "Match is over");
            return;
        }
        if self.state != state {
            self.transition(state);
        }
    }

    /// Whether a tower with `candidate_range` may stand at `(x, y)`.
    ///
    /// The point must keep the minimum spacing from every tower, lie outside
    /// every tower's range, keep every tower outside its own range, and keep
    /// the minimum clearance from every path segment.
    #[must_use]
    pub fn is_valid_placement(&self, x: f32, y: f32, candidate_range: f32) -> bool {
        let point = Position::new(x, y);
        if !point.is_finite() {
            return false;
        }
        let rules = self.config.placement();

        let crowded = self.towers.iter().any(|tower| {
            let distance = point.distance(tower.position());
            distance < rules.min_tower_spacing
                || distance < tower.range()
                || distance < candidate_range
        });
        if crowded {
            return false;
        }

        self.path
            .segments()
            .all(|(start, end)| distance_to_segment(point, start, end) >= rules.min_distance_from_path)
    }

    /// Buy and place a tower of `tower_type` at `(x, y)`.
    ///
    /// Clears the tower type selection on success.
    ///
    /// # Errors
    ///
    /// [`GameError::UnknownTowerType`], [`GameError::InsufficientFunds`] or
    /// [`GameError::InvalidPlacement`]. Nothing changes on error.
    pub fn place_tower(&mut self, x: f32, y: f32, tower_type: u32) -> Result<TowerId> {
        let template = self
            .config
            .tower_type(tower_type)
            .ok_or(GameError::UnknownTowerType(tower_type))?;

        if !self.budget.can_afford(template.cost) {
            tracing::warn!(tower_type, cost = template.cost, budget = self.budget.budget(), "Cannot afford tower");
            return Err(GameError::InsufficientFunds {
                required: template.cost,
                available: self.budget.budget(),
            });
        }

        if !self.is_valid_placement(x, y, template.range) {
            tracing::warn!(x, y, tower_type, "Tower placement refused");
            return Err(GameError::InvalidPlacement { x, y });
        }

        let id = TowerId(self.next_tower_id);
        let speed = self.config.projectile_speed_for(template);
        let tower = Tower::new(id, template, Position::new(x, y), speed);
        self.budget.spend(template.cost);
        self.next_tower_id += 1;
        self.towers.push(tower);
        self.selected_tower_type = None;

        tracing::debug!(tower = %id, tower_type, x, y, budget = self.budget.budget(), "Tower placed");
        Ok(id)
    }

    /// Place a tower of the currently selected type.
    ///
    /// # Errors
    ///
    /// [`GameError::UnknownTowerType`] when nothing is selected, otherwise as
    /// [`GameWorld::place_tower`].
    pub fn place_selected_tower(&mut self, x: f32, y: f32) -> Result<TowerId> {
        let tower_type = self
            .selected_tower_type()
            .map(|t| t.id)
            .ok_or(GameError::UnknownTowerType(u32::MAX))?;
        self.place_tower(x, y, tower_type)
    }

    /// Pay `cost` and apply `upgrade` to `tower`.
    ///
    /// # Errors
    ///
    /// [`GameError::TowerNotFound`] or [`GameError::InsufficientFunds`].
    pub fn upgrade(&mut self, tower: TowerId, upgrade: Upgrade, cost: i32) -> Result<()> {
        let available = self.budget.budget();
        if !self.budget.can_afford(cost) {
            tracing::warn!(tower = %tower, ?upgrade, cost, budget = available, "Cannot afford upgrade");
            return Err(GameError::InsufficientFunds {
                required: cost,
                available,
            });
        }

        let target = self.tower_mut(tower)?;
        target.apply_upgrade(upgrade);
        self.budget.spend(cost);

        tracing::debug!(tower = %tower, ?upgrade, cost, "Tower upgraded");
        Ok(())
    }

    /// Buy one step of `stat` at the configured price.
    ///
    /// # Errors
    ///
    /// [`GameError::UpgradesNotConfigured`] without an upgrade table,
    /// otherwise as [`GameWorld::upgrade`].
    pub fn purchase_upgrade(&mut self, tower: TowerId, stat: UpgradeStat) -> Result<()> {
        let table = self.config.upgrades.ok_or(GameError::UpgradesNotConfigured)?;
        let upgrade = match stat {
            UpgradeStat::Damage => Upgrade::Damage(table.damage_amount),
            UpgradeStat::Range => Upgrade::Range(table.range_amount),
            UpgradeStat::Cooldown => Upgrade::Cooldown(table.cooldown_amount),
        };
        self.upgrade(tower, upgrade, table.cost(stat))
    }

    /// Set a tower's targeting strategy.
    ///
    /// # Errors
    ///
    /// [`GameError::TowerNotFound`].
    pub fn set_targeting_strategy(&mut self, tower: TowerId, strategy: TargetingStrategy) -> Result<()> {
        self.tower_mut(tower)?.set_targeting_strategy(strategy);
        Ok(())
    }

    /// Move a tower to the next strategy in the cycle and return it.
    ///
    /// # Errors
    ///
    /// [`GameError::TowerNotFound`].
    pub fn cycle_targeting_strategy(&mut self, tower: TowerId) -> Result<TargetingStrategy> {
        let target = self.tower_mut(tower)?;
        let next = target.targeting_strategy().next();
        target.set_targeting_strategy(next);
        Ok(next)
    }

    /// Select the tower type at `index`, or clear the selection if it is
    /// already selected.
    ///
    /// # Errors
    ///
    /// [`GameError::UnknownTowerType`] for an index past the configured types.
    pub fn toggle_tower_type_selection(&mut self, index: usize) -> Result<()> {
        if index >= self.config.tower_types.len() {
            return Err(GameError::UnknownTowerType(
                u32::try_from(index).unwrap_or(u32::MAX),
            ));
        }
        self.selected_tower_type = if self.selected_tower_type == Some(index) {
            None
        } else {
            Some(index)
        };
        Ok(())
    }

    /// Tower type chosen for the next placement.
    #[must_use]
    pub fn selected_tower_type(&self) -> Option<&TowerTypeConfig> {
        self.selected_tower_type
            .and_then(|i| self.config.tower_types.get(i))
    }

    /// Focus a placed tower, or clear the focus with `None`.
    ///
    /// # Errors
    ///
    /// [`GameError::TowerNotFound`].
    pub fn select_tower(&mut self, tower: Option<TowerId>) -> Result<()> {
        if let Some(id) = tower {
            self.tower(id)?;
        }
        self.selected_tower = tower;
        Ok(())
    }

    /// Focused tower.
    #[must_use]
    pub fn selected_tower(&self) -> Option<&Tower> {
        self.selected_tower.and_then(|id| self.tower(id).ok())
    }

    /// First tower whose hit box contains `(x, y)`.
    #[must_use]
    pub fn tower_at(&self, x: f32, y: f32) -> Option<&Tower> {
        self.towers.iter().find(|tower| {
            let p = tower.position();
            (x - p.x).abs() < TOWER_HIT_HALF_SIZE && (y - p.y).abs() < TOWER_HIT_HALF_SIZE
        })
    }

    /// Look up a tower.
    ///
    /// # Errors
    ///
    /// [`GameError::TowerNotFound`].
    pub fn tower(&self, id: TowerId) -> Result<&Tower> {
        self.towers
            .iter()
            .find(|t| t.id() == id)
            .ok_or(GameError::TowerNotFound(id))
    }

    fn tower_mut(&mut self, id: TowerId) -> Result<&mut Tower> {
        self.towers
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or(GameError::TowerNotFound(id))
    }

    /// Live enemies in spawn order.
    #[must_use]
    pub fn enemies(&self) -> &[Enemy] {
        self.enemies.as_slice()
    }

    /// Placed towers in placement order.
    #[must_use]
    pub fn towers(&self) -> &[Tower] {
        &self.towers
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Coins in flight.
    #[must_use]
    pub fn coins(&self) -> &[MoneyCoin] {
        &self.coins
    }

    /// Lives left. May be negative after several escapes in one tick.
    #[must_use]
    pub fn lives(&self) -> i32 {
        self.lives
    }

    /// Current money.
    #[must_use]
    pub fn budget(&self) -> i32 {
        self.budget.budget()
    }

    /// The budget ledger.
    #[must_use]
    pub fn budget_manager(&self) -> &BudgetManager {
        &self.budget
    }

    /// Match state.
    #[must_use]
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Latest started wave number.
    #[must_use]
    pub fn current_wave_number(&self) -> u32 {
        self.waves.current_wave_number()
    }

    /// Number of configured waves.
    #[must_use]
    pub fn total_waves(&self) -> usize {
        self.waves.total_waves()
    }

    /// Whether every scheduled enemy has spawned.
    #[must_use]
    pub fn all_waves_complete(&self) -> bool {
        self.waves.all_waves_complete()
    }

    /// Seconds of unpaused game time.
    #[must_use]
    pub fn game_time(&self) -> f32 {
        self.waves.game_time()
    }

    /// Ticks simulated, excluding paused ones.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// The route.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `count + 1` points along the route for drawing.
    #[must_use]
    pub fn path_samples(&self, count: usize) -> Vec<Position> {
        self.path.sample_points(count)
    }

    /// The configuration the match was started with.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Hash of all simulation state, for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.state.hash(&mut hasher);
        self.lives.hash(&mut hasher);
        self.budget.budget().hash(&mut hasher);
        self.waves.game_time().to_bits().hash(&mut hasher);

        self.enemies.len().hash(&mut hasher);
        for enemy in self.enemies.as_slice() {
            enemy.id().hash(&mut hasher);
            hash_position(enemy.position(), &mut hasher);
            enemy.health().hash(&mut hasher);
            enemy.path_progress().to_bits().hash(&mut hasher);
        }

        self.towers.len().hash(&mut hasher);
        for tower in &self.towers {
            tower.id().hash(&mut hasher);
            tower.damage().hash(&mut hasher);
            tower.range().to_bits().hash(&mut hasher);
            tower.cooldown().to_bits().hash(&mut hasher);
            tower.targeting_strategy().hash(&mut hasher);
        }

        self.projectiles.len().hash(&mut hasher);
        for projectile in &self.projectiles {
            projectile.target().hash(&mut hasher);
            hash_position(projectile.position(), &mut hasher);
        }

        self.coins.len().hash(&mut hasher);
        for coin in &self.coins {
            coin.reward().hash(&mut hasher);
            hash_position(coin.position(), &mut hasher);
        }

        hasher.finish()
    }
}

fn hash_position(position: Position, hasher: &mut impl Hasher) {
    position.x.to_bits().hash(hasher);
    position.y.to_bits().hash(hasher);
}
