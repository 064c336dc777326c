//! Player-placed towers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::TowerTypeConfig;
use crate::enemy::Enemy;
use crate::math::Position;
use crate::movers::Projectile;
use crate::targeting::TargetingStrategy;

/// Unique identifier of a placed tower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TowerId(pub u32);

impl fmt::Display for TowerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which stat an upgrade purchase improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeStat {
    /// Damage per projectile.
    Damage,
    /// Attack range.
    Range,
    /// Time between shots.
    Cooldown,
}

/// A stat change with its amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Upgrade {
    /// Add to damage.
    Damage(i32),
    /// Add to range.
    Range(f32),
    /// Subtract from the base cooldown.
    Cooldown(f32),
}

impl Upgrade {
    /// The stat this upgrade touches.
    #[must_use]
    pub const fn stat(self) -> UpgradeStat {
        match self {
            Self::Damage(_) => UpgradeStat::Damage,
            Self::Range(_) => UpgradeStat::Range,
            Self::Cooldown(_) => UpgradeStat::Cooldown,
        }
    }
}

/// A stationary shooter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tower {
    id: TowerId,
    type_id: u32,
    position: Position,
    cost: i32,
    range: f32,
    damage: i32,
    base_cooldown: f32,
    cooldown: f32,
    projectile_speed: f32,
    strategy: TargetingStrategy,
}

impl Tower {
    /// Build a tower of `template` at `position`.
    ///
    /// The first shot waits one full cooldown.
    #[must_use]
    pub fn new(
        id: TowerId,
        template: &TowerTypeConfig,
        position: Position,
        projectile_speed: f32,
    ) -> Self {
        Self {
            id,
            type_id: template.id,
            position,
            cost: template.cost,
            range: template.range,
            damage: template.damage,
            base_cooldown: template.attack_cooldown,
            cooldown: template.attack_cooldown,
            projectile_speed,
            strategy: TargetingStrategy::default(),
        }
    }

    /// Tick the cooldown and fire at most one projectile into `sink`.
    ///
    /// The cooldown keeps counting down while idle and is not clamped, so a
    /// tower that has waited long enough fires the moment a target appears.
    pub fn update(&mut self, dt: f32, enemies: &[Enemy], sink: &mut Vec<Projectile>) {
        self.cooldown -= dt;

        let Some(target) = self.strategy.select_target(self.position, self.range, enemies) else {
            return;
        };

        if self.cooldown <= 0.0 {
            sink.push(Projectile::new(
                self.position,
                target.id(),
                target.position(),
                self.projectile_speed,
                self.damage,
            ));
            self.cooldown = self.base_cooldown;
            tracing::debug!(
                tower = %self.id,
                target = %target.id(),
                damage = self.damage,
                "Projectile fired"
            );
        }
    }

    /// Add to damage.
    pub fn increase_damage(&mut self, amount: i32) {
        self.damage += amount;
    }

    /// Add to range.
    pub fn increase_range(&mut self, amount: f32) {
        self.range += amount;
    }

    /// Lower the base cooldown. The running timer is untouched until the next
    /// shot resets it.
    pub fn decrease_attack_cooldown(&mut self, amount: f32) {
        self.base_cooldown -= amount;
    }

    /// Apply an upgrade in place.
    pub fn apply_upgrade(&mut self, upgrade: Upgrade) {
        match upgrade {
            Upgrade::Damage(amount) => self.increase_damage(amount),
            Upgrade::Range(amount) => self.increase_range(amount),
            Upgrade::Cooldown(amount) => self.decrease_attack_cooldown(amount),
        }
    }

    /// Active targeting strategy.
    #[must_use]
    pub fn targeting_strategy(&self) -> TargetingStrategy {
        self.strategy
    }

    /// Swap the targeting strategy.
    pub fn set_targeting_strategy(&mut self, strategy: TargetingStrategy) {
        self.strategy = strategy;
    }

    /// Tower id.
    #[must_use]
    pub fn id(&self) -> TowerId {
        self.id
    }

    /// Tower type this was built from.
    #[must_use]
    pub fn type_id(&self) -> u32 {
        self.type_id
    }

    /// Fixed position.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Purchase cost.
    #[must_use]
    pub fn cost(&self) -> i32 {
        self.cost
    }

    /// Attack range.
    #[must_use]
    pub fn range(&self) -> f32 {
        self.range
    }

    /// Damage per projectile.
    #[must_use]
    pub fn damage(&self) -> i32 {
        self.damage
    }

    /// Cooldown a shot resets to.
    #[must_use]
    pub fn base_cooldown(&self) -> f32 {
        self.base_cooldown
    }

    /// Running cooldown timer. May be negative.
    #[must_use]
    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    /// Speed of emitted projectiles.
    #[must_use]
    pub fn projectile_speed(&self) -> f32 {
        self.projectile_speed
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::data::ColorConfig;
    use crate::enemy::{EnemyId, EnemyStats};
    use crate::movers::MovingObject;
    use crate::path::Path;

    fn template(cooldown: f32) -> TowerTypeConfig {
        TowerTypeConfig {
            id: 7,
            name: "Arrow".to_string(),
            cost: 50,
            range: 100.0,
            damage: 25,
            attack_cooldown: cooldown,
            projectile_speed: 300.0,
            color: ColorConfig::default(),
        }
    }

    fn enemy_at(id: u64, x: f32, health: i32) -> Enemy {
        let path = Arc::new(Path::polyline(vec![Position::new(x, 0.0)]).unwrap());
        Enemy::new(EnemyId(id), path, EnemyStats::new(health, 0.0, 10), 0.0)
    }

    #[test]
    fn test_new_from_template() {
        let tower = Tower::new(TowerId(1), &template(1.5), Position::new(5.0, 5.0), 300.0);
        assert_eq!(tower.type_id(), 7);
        assert_eq!(tower.cost(), 50);
        assert_eq!(tower.base_cooldown(), 1.5);
        assert_eq!(tower.cooldown(), 1.5);
        assert_eq!(tower.targeting_strategy(), TargetingStrategy::Nearest);
    }

    #[test]
    fn test_fires_when_ready() {
        let mut tower = Tower::new(TowerId(1), &template(0.0), Position::ORIGIN, 300.0);
        let enemies = vec![enemy_at(0, 50.0, 100)];
        let mut sink = Vec::new();

        tower.update(0.1, &enemies, &mut sink);

        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].target(), EnemyId(0));
        assert_eq!(sink[0].damage(), 25);
        assert_eq!(sink[0].position(), Position::ORIGIN);
        assert_eq!(tower.cooldown(), 0.0);
    }

    #[test]
    fn test_waits_for_cooldown() {
        let mut tower = Tower::new(TowerId(1), &template(1.0), Position::ORIGIN, 300.0);
        let enemies = vec![enemy_at(0, 50.0, 100)];
        let mut sink = Vec::new();

        tower.update(0.5, &enemies, &mut sink);
        assert!(sink.is_empty());

        tower.update(0.5, &enemies, &mut sink);
        assert_eq!(sink.len(), 1);
        assert_eq!(tower.cooldown(), 1.0);
    }

    #[test]
    fn test_idle_cooldown_goes_negative() {
        let mut tower = Tower::new(TowerId(1), &template(1.0), Position::ORIGIN, 300.0);
        let mut sink = Vec::new();

        tower.update(3.0, &[], &mut sink);
        assert!(sink.is_empty());
        assert_eq!(tower.cooldown(), -2.0);

        // Out of range enemy does not trigger a shot either
        tower.update(0.0, &[enemy_at(0, 150.0, 100)], &mut sink);
        assert!(sink.is_empty());

        tower.update(0.0, &[enemy_at(1, 60.0, 100)], &mut sink);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_upgrades() {
        let mut tower = Tower::new(TowerId(1), &template(1.0), Position::ORIGIN, 300.0);
        tower.apply_upgrade(Upgrade::Damage(10));
        tower.apply_upgrade(Upgrade::Range(25.0));
        tower.apply_upgrade(Upgrade::Cooldown(0.25));

        assert_eq!(tower.damage(), 35);
        assert_eq!(tower.range(), 125.0);
        assert_eq!(tower.base_cooldown(), 0.75);
        // Running timer unaffected until the next shot
        assert_eq!(tower.cooldown(), 1.0);
        assert_eq!(Upgrade::Range(1.0).stat(), UpgradeStat::Range);
    }

    #[test]
    fn test_cooldown_upgrade_applies_on_next_reset() {
        let mut tower = Tower::new(TowerId(1), &template(0.0), Position::ORIGIN, 300.0);
        tower.decrease_attack_cooldown(-0.5);
        let enemies = vec![enemy_at(0, 10.0, 100)];
        let mut sink = Vec::new();

        tower.update(0.0, &enemies, &mut sink);
        assert_eq!(sink.len(), 1);
        assert_eq!(tower.cooldown(), 0.5);
    }

    #[test]
    fn test_strategy_swap() {
        let mut tower = Tower::new(TowerId(1), &template(0.0), Position::ORIGIN, 300.0);
        let enemies = vec![enemy_at(0, 10.0, 20), enemy_at(1, 40.0, 80)];
        let mut sink = Vec::new();

        tower.set_targeting_strategy(TargetingStrategy::Strongest);
        tower.update(0.0, &enemies, &mut sink);

        assert_eq!(tower.targeting_strategy(), TargetingStrategy::Strongest);
        assert_eq!(sink[0].target(), EnemyId(1));
    }

    #[test]
    fn test_tower_id_display() {
        assert_eq!(TowerId(3).to_string(), "#3");
    }
}
