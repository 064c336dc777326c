//! Tower type templates.

use serde::{Deserialize, Serialize};

use super::ColorConfig;

/// A purchasable tower type.
///
/// # Example JSON
///
/// ```json
/// {
///   "id": 1,
///   "name": "Arrow Tower",
///   "cost": 50,
///   "range": 150,
///   "damage": 25,
///   "attackCooldown": 1.0,
///   "projectileSpeed": 300,
///   "color": { "r": 0.2, "g": 0.6, "b": 1.0, "a": 1.0 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TowerTypeConfig {
    /// Type identifier.
    pub id: u32,

    /// Display name.
    pub name: String,

    /// Purchase cost.
    pub cost: i32,

    /// Attack range in world units.
    pub range: f32,

    /// Damage per projectile.
    pub damage: i32,

    /// Seconds between shots.
    pub attack_cooldown: f32,

    /// Projectile speed. Zero or less defers to the world default.
    pub projectile_speed: f32,

    /// Render color, passed through untouched.
    pub color: ColorConfig,
}

impl TowerTypeConfig {
    /// Damage per second, or infinity for a zero cooldown.
    #[must_use]
    pub fn dps(&self) -> f32 {
        if self.attack_cooldown > 0.0 {
            self.damage as f32 / self.attack_cooldown
        } else {
            f32::INFINITY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_camel_case() {
        let json = r#"{
            "id": 2,
            "name": "Cannon",
            "cost": 120,
            "range": 180,
            "damage": 80,
            "attackCooldown": 2.0
        }"#;
        let tower: TowerTypeConfig = serde_json::from_str(json).unwrap();

        assert_eq!(tower.id, 2);
        assert_eq!(tower.range, 180.0);
        assert_eq!(tower.attack_cooldown, 2.0);
        assert_eq!(tower.projectile_speed, 0.0);
        assert_eq!(tower.color, ColorConfig::default());
    }

    #[test]
    fn test_dps() {
        let mut tower = TowerTypeConfig {
            damage: 50,
            attack_cooldown: 2.0,
            ..TowerTypeConfig::default()
        };
        assert_eq!(tower.dps(), 25.0);

        tower.attack_cooldown = 0.0;
        assert!(tower.dps().is_infinite());
    }
}
