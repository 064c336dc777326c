//! Top-level match configuration.

use serde::{Deserialize, Serialize};

use super::{EnemyConfig, TowerTypeConfig, WaveConfig};
use crate::error::{GameError, Result};
use crate::math::Position;
use crate::path::PathKind;
use crate::tower::UpgradeStat;

/// Fallback world height when the config leaves it unset.
pub const DEFAULT_WORLD_HEIGHT: f32 = 720.0;

/// Inset of the budget display from the top-left corner.
pub const UI_MARGIN: f32 = 10.0;

/// Fallback money coin speed.
pub const DEFAULT_COIN_SPEED: f32 = 200.0;

/// Fallback projectile speed.
pub const DEFAULT_PROJECTILE_SPEED: f32 = 300.0;

/// Fallback minimum distance between towers.
pub const DEFAULT_MIN_TOWER_SPACING: f32 = 40.0;

/// Fallback minimum distance between a tower and the path.
pub const DEFAULT_MIN_DISTANCE_FROM_PATH: f32 = 30.0;

/// A waypoint on the wire is just a point.
pub type WaypointConfig = Position;

/// The route definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PathConfig {
    /// Ordered waypoints.
    pub waypoints: Vec<WaypointConfig>,

    /// Layout built from the waypoints.
    pub kind: PathKind,
}

/// Placement geometry thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TowerPlacementConfig {
    /// Minimum distance between two towers.
    pub min_tower_spacing: f32,

    /// Minimum distance from any path segment.
    pub min_distance_from_path: f32,
}

impl Default for TowerPlacementConfig {
    fn default() -> Self {
        Self {
            min_tower_spacing: DEFAULT_MIN_TOWER_SPACING,
            min_distance_from_path: DEFAULT_MIN_DISTANCE_FROM_PATH,
        }
    }
}

/// Prices and step sizes of tower upgrades.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpgradeConfig {
    /// Price of a damage upgrade.
    pub damage_cost: i32,
    /// Damage added per upgrade.
    pub damage_amount: i32,
    /// Price of a range upgrade.
    pub range_cost: i32,
    /// Range added per upgrade.
    pub range_amount: f32,
    /// Price of a cooldown upgrade.
    pub cooldown_cost: i32,
    /// Seconds removed from the base cooldown per upgrade.
    pub cooldown_amount: f32,
}

impl UpgradeConfig {
    /// Price of one upgrade of `stat`.
    #[must_use]
    pub const fn cost(&self, stat: UpgradeStat) -> i32 {
        match stat {
            UpgradeStat::Damage => self.damage_cost,
            UpgradeStat::Range => self.range_cost,
            UpgradeStat::Cooldown => self.cooldown_cost,
        }
    }
}

/// RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

/// Render tuning. The simulation never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisualConfig {
    /// Clear color.
    pub background_color: ColorConfig,
    /// Alpha of tower range circles.
    pub range_circle_opacity: f32,
}

/// Everything needed to start a match.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Starting money.
    pub initial_budget: i32,

    /// Escapes allowed before the match is lost.
    pub initial_lives: i32,

    /// World width in world units.
    pub world_width: f32,

    /// World height in world units. Zero or less falls back to
    /// [`DEFAULT_WORLD_HEIGHT`].
    pub world_height: f32,

    /// The route enemies walk.
    pub path: PathConfig,

    /// Enemies on the field at start.
    pub initial_enemies: Vec<EnemyConfig>,

    /// Scheduled waves.
    pub waves: Vec<WaveConfig>,

    /// Purchasable tower types.
    pub tower_types: Vec<TowerTypeConfig>,

    /// World-wide projectile speed for tower types that leave theirs unset.
    pub projectile_speed: f32,

    /// Money coin speed.
    pub money_coin_speed: f32,

    /// Placement thresholds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tower_placement: Option<TowerPlacementConfig>,

    /// Upgrade price list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrades: Option<UpgradeConfig>,

    /// Render tuning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual: Option<VisualConfig>,
}

impl GameConfig {
    /// Check the configuration errors that must stop a match from starting.
    ///
    /// # Errors
    ///
    /// [`GameError::EmptyPath`] when there are no waypoints, otherwise
    /// [`GameError::InvalidConfig`] describing the first malformed entry.
    pub fn validate(&self) -> Result<()> {
        if self.path.waypoints.is_empty() {
            return Err(GameError::EmptyPath);
        }
        if let Some(i) = self.path.waypoints.iter().position(|p| !p.is_finite()) {
            return Err(invalid(format!("waypoint {i} has a non-finite coordinate")));
        }

        for (i, enemy) in self.initial_enemies.iter().enumerate() {
            check_enemy(&format!("initial enemy {i}"), enemy.health, enemy.speed)?;
        }

        for (w, wave) in self.waves.iter().enumerate() {
            if !is_time(wave.start_time) {
                return Err(invalid(format!(
                    "wave {w} has invalid start time {}",
                    wave.start_time
                )));
            }
            for (i, enemy) in wave.enemies.iter().enumerate() {
                let label = format!("wave {w} enemy {i}");
                if !is_time(enemy.spawn_delay) {
                    return Err(invalid(format!(
                        "{label} has invalid spawn delay {}",
                        enemy.spawn_delay
                    )));
                }
                check_enemy(&label, enemy.health, enemy.speed)?;
            }
        }

        for tower in &self.tower_types {
            if !tower.range.is_finite() || tower.range < 0.0 {
                return Err(invalid(format!(
                    "tower type {} has invalid range {}",
                    tower.id, tower.range
                )));
            }
            if !is_time(tower.attack_cooldown) {
                return Err(invalid(format!(
                    "tower type {} has invalid attack cooldown {}",
                    tower.id, tower.attack_cooldown
                )));
            }
        }

        Ok(())
    }

    /// Path waypoints as positions.
    #[must_use]
    pub fn waypoints(&self) -> Vec<Position> {
        self.path.waypoints.clone()
    }

    /// Effective world height.
    #[must_use]
    pub fn effective_world_height(&self) -> f32 {
        if self.world_height > 0.0 {
            self.world_height
        } else {
            DEFAULT_WORLD_HEIGHT
        }
    }

    /// Where money coins fly to: the budget display anchor.
    #[must_use]
    pub fn coin_anchor(&self) -> Position {
        Position::new(UI_MARGIN, self.effective_world_height() - UI_MARGIN)
    }

    /// Effective money coin speed.
    #[must_use]
    pub fn coin_speed(&self) -> f32 {
        if self.money_coin_speed > 0.0 {
            self.money_coin_speed
        } else {
            DEFAULT_COIN_SPEED
        }
    }

    /// Projectile speed for towers of `tower_type`: the type's own speed,
    /// then the world-wide speed, then [`DEFAULT_PROJECTILE_SPEED`].
    #[must_use]
    pub fn projectile_speed_for(&self, tower_type: &TowerTypeConfig) -> f32 {
        if tower_type.projectile_speed > 0.0 {
            tower_type.projectile_speed
        } else if self.projectile_speed > 0.0 {
            self.projectile_speed
        } else {
            DEFAULT_PROJECTILE_SPEED
        }
    }

    /// Effective placement thresholds.
    #[must_use]
    pub fn placement(&self) -> TowerPlacementConfig {
        self.tower_placement.unwrap_or_default()
    }

    /// Look up a tower type by id.
    #[must_use]
    pub fn tower_type(&self, id: u32) -> Option<&TowerTypeConfig> {
        self.tower_types.iter().find(|t| t.id == id)
    }
}

fn invalid(message: String) -> GameError {
    GameError::InvalidConfig(message)
}

fn is_time(value: f32) -> bool {
    value.is_finite() && value >= 0.0
}

fn check_enemy(label: &str, health: i32, speed: f32) -> Result<()> {
    if health <= 0 {
        return Err(invalid(format!("{label} has non-positive health {health}")));
    }
    if !speed.is_finite() || speed < 0.0 {
        return Err(invalid(format!("{label} has invalid speed {speed}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::WaveEnemyConfig;

    fn minimal() -> GameConfig {
        GameConfig {
            initial_budget: 100,
            initial_lives: 5,
            path: PathConfig {
                waypoints: vec![Position::new(0.0, 0.0), Position::new(100.0, 0.0)],
                kind: PathKind::Polyline,
            },
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_parse_original_layout() {
        let json = r#"{
            "initialBudget": 200,
            "initialLives": 10,
            "worldWidth": 1280,
            "worldHeight": 720,
            "path": { "waypoints": [ { "x": 0, "y": 360 }, { "x": 1280, "y": 360 } ] },
            "waves": [ { "waveNumber": 1, "startTime": 0, "enemies": [] } ],
            "towerTypes": [ { "id": 1, "name": "Arrow", "cost": 50, "range": 150,
                              "damage": 20, "attackCooldown": 1.0, "projectileSpeed": 0 } ],
            "towerPlacement": { "minTowerSpacing": 50, "minDistanceFromPath": 35 },
            "visual": { "backgroundColor": { "r": 0.1, "g": 0.1, "b": 0.1, "a": 1 },
                        "rangeCircleOpacity": 0.3 }
        }"#;
        let config: GameConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.initial_budget, 200);
        assert_eq!(config.path.kind, PathKind::Spline);
        assert_eq!(config.path.waypoints[1], Position::new(1280.0, 360.0));
        assert_eq!(config.placement().min_tower_spacing, 50.0);
        assert!(config.upgrades.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fallbacks() {
        let config = minimal();
        assert_eq!(config.coin_anchor(), Position::new(10.0, 710.0));
        assert_eq!(config.coin_speed(), DEFAULT_COIN_SPEED);
        assert_eq!(config.placement(), TowerPlacementConfig::default());

        let tower = TowerTypeConfig::default();
        assert_eq!(config.projectile_speed_for(&tower), DEFAULT_PROJECTILE_SPEED);

        let config = GameConfig {
            projectile_speed: 450.0,
            world_height: 600.0,
            ..minimal()
        };
        assert_eq!(config.projectile_speed_for(&tower), 450.0);
        assert_eq!(config.coin_anchor(), Position::new(10.0, 590.0));

        let fast = TowerTypeConfig {
            projectile_speed: 800.0,
            ..TowerTypeConfig::default()
        };
        assert_eq!(config.projectile_speed_for(&fast), 800.0);
    }

    #[test]
    fn test_validate_empty_path() {
        assert_eq!(GameConfig::default().validate(), Err(GameError::EmptyPath));
    }

    #[test]
    fn test_validate_rejects_bad_waves() {
        let mut config = minimal();
        config.waves.push(WaveConfig {
            wave_number: 1,
            start_time: 0.0,
            enemies: vec![WaveEnemyConfig {
                health: 0,
                speed: 50.0,
                spawn_delay: 0.0,
                reward: 0,
            }],
        });
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));

        config.waves[0].enemies[0].health = 10;
        config.waves[0].enemies[0].spawn_delay = f32::NAN;
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));

        config.waves[0].enemies[0].spawn_delay = 0.5;
        config.waves[0].start_time = -1.0;
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));

        config.waves[0].start_time = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_upgrade_costs() {
        let upgrades = UpgradeConfig {
            damage_cost: 30,
            range_cost: 40,
            cooldown_cost: 50,
            ..UpgradeConfig::default()
        };
        assert_eq!(upgrades.cost(UpgradeStat::Damage), 30);
        assert_eq!(upgrades.cost(UpgradeStat::Range), 40);
        assert_eq!(upgrades.cost(UpgradeStat::Cooldown), 50);
    }
}
