//! Test fixtures and helpers.
//!
//! Pre-built routes, tower types and match configurations
//! for consistent testing.

use td_core::data::{
    EnemyConfig, GameConfig, PathConfig, TowerPlacementConfig, TowerTypeConfig, UpgradeConfig,
    WaveConfig, WaveEnemyConfig,
};
use td_core::math::Position;
use td_core::path::PathKind;

/// Shorthand for a position.
#[must_use]
pub fn pos(x: f32, y: f32) -> Position {
    Position::new(x, y)
}

/// Two waypoints 100 units apart along the x axis.
#[must_use]
pub fn straight_waypoints() -> Vec<Position> {
    vec![pos(0.0, 0.0), pos(100.0, 0.0)]
}

/// A right-angle dog-leg with one sharp turn each way.
#[must_use]
pub fn dogleg_waypoints() -> Vec<Position> {
    vec![
        pos(0.0, 0.0),
        pos(100.0, 0.0),
        pos(100.0, 100.0),
        pos(200.0, 100.0),
    ]
}

/// A full-screen route across a 1280x720 world.
#[must_use]
pub fn winding_waypoints() -> Vec<Position> {
    vec![
        pos(0.0, 360.0),
        pos(300.0, 360.0),
        pos(300.0, 120.0),
        pos(700.0, 120.0),
        pos(700.0, 560.0),
        pos(1280.0, 560.0),
    ]
}

/// Cheap, fast-firing, short-range tower.
#[must_use]
pub fn arrow_tower() -> TowerTypeConfig {
    TowerTypeConfig {
        id: 1,
        name: "Arrow Tower".to_string(),
        cost: 50,
        range: 150.0,
        damage: 20,
        attack_cooldown: 0.5,
        projectile_speed: 400.0,
        ..TowerTypeConfig::default()
    }
}

/// Expensive, slow, long-range tower.
#[must_use]
pub fn cannon_tower() -> TowerTypeConfig {
    TowerTypeConfig {
        id: 2,
        name: "Cannon Tower".to_string(),
        cost: 120,
        range: 220.0,
        damage: 80,
        attack_cooldown: 2.0,
        projectile_speed: 0.0,
        ..TowerTypeConfig::default()
    }
}

/// A wave of identical enemies spaced `interval` seconds apart.
#[must_use]
pub fn uniform_wave(
    wave_number: u32,
    start_time: f32,
    count: u32,
    health: i32,
    speed: f32,
    interval: f32,
) -> WaveConfig {
    WaveConfig {
        wave_number,
        start_time,
        enemies: (0..count)
            .map(|i| WaveEnemyConfig {
                health,
                speed,
                spawn_delay: i as f32 * interval,
                reward: 0,
            })
            .collect(),
    }
}

/// Polyline config of `waypoints` with no enemies and no waves.
#[must_use]
pub fn empty_config(waypoints: Vec<Position>) -> GameConfig {
    GameConfig {
        initial_budget: 500,
        initial_lives: 10,
        world_width: 1280.0,
        world_height: 720.0,
        path: PathConfig {
            waypoints,
            kind: PathKind::Polyline,
        },
        tower_types: vec![arrow_tower(), cannon_tower()],
        ..GameConfig::default()
    }
}

/// One enemy at the start of a 100 unit straight path.
#[must_use]
pub fn single_enemy_config(health: i32, speed: f32, reward: i32) -> GameConfig {
    GameConfig {
        initial_enemies: vec![EnemyConfig {
            health,
            speed,
            spawn_time: 0.0,
            reward,
        }],
        ..empty_config(straight_waypoints())
    }
}

/// A complete match on the winding spline route: three waves, both tower
/// types, placement rules and an upgrade table.
#[must_use]
pub fn standard_config() -> GameConfig {
    GameConfig {
        path: PathConfig {
            waypoints: winding_waypoints(),
            kind: PathKind::Spline,
        },
        waves: vec![
            uniform_wave(1, 0.0, 5, 100, 60.0, 1.0),
            uniform_wave(2, 12.0, 8, 120, 70.0, 0.8),
            uniform_wave(3, 25.0, 10, 200, 50.0, 0.8),
        ],
        projectile_speed: 300.0,
        money_coin_speed: 200.0,
        tower_placement: Some(TowerPlacementConfig::default()),
        upgrades: Some(UpgradeConfig {
            damage_cost: 40,
            damage_amount: 10,
            range_cost: 30,
            range_amount: 20.0,
            cooldown_cost: 50,
            cooldown_amount: 0.1,
        }),
        ..empty_config(winding_waypoints())
    }
}

/// Tower spots along the winding route that satisfy the placement rules for
/// [`arrow_tower`] when built in order.
#[must_use]
pub fn standard_tower_spots() -> Vec<Position> {
    vec![pos(150.0, 250.0), pos(500.0, 250.0), pos(850.0, 420.0)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configs_validate() {
        assert!(empty_config(straight_waypoints()).validate().is_ok());
        assert!(single_enemy_config(50, 50.0, 10).validate().is_ok());
        assert!(standard_config().validate().is_ok());
    }

    #[test]
    fn test_uniform_wave() {
        let wave = uniform_wave(2, 5.0, 3, 80, 40.0, 0.5);
        assert_eq!(wave.enemies.len(), 3);
        assert_eq!(wave.enemies[2].spawn_delay, 1.0);
        assert_eq!(wave.total_health(), 240);
    }
}
