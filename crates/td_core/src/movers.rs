//! Entities that fly toward a point and react on arrival.
//!
//! Projectiles and money coins share the same motion: steer straight at a
//! target, stop without overshooting, and fire a one-shot reaction once within
//! a hit threshold. [`MovingObject`] provides that loop as a default method;
//! implementors only supply the two hooks that differ.

use serde::{Deserialize, Serialize};

use crate::economy::BudgetManager;
use crate::enemy::{EnemyId, EnemyRoster};
use crate::math::Position;

/// Arrival distance for projectiles.
pub const PROJECTILE_HIT_THRESHOLD: f32 = 5.0;

/// Arrival distance for money coins.
pub const COIN_HIT_THRESHOLD: f32 = 10.0;

/// Kinematic state shared by all movers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Current position.
    pub position: Position,
    /// Point being approached.
    pub target: Position,
    /// Speed in world units per second.
    pub speed: f32,
    /// Set once the mover has arrived or given up.
    pub resolved: bool,
}

impl Motion {
    /// Create an unresolved motion.
    #[must_use]
    pub const fn new(position: Position, target: Position, speed: f32) -> Self {
        Self {
            position,
            target,
            speed,
            resolved: false,
        }
    }
}

/// Approach-and-react behavior.
///
/// `Context` is whatever the reaction needs to touch: the enemy roster for a
/// projectile, the budget ledger for a coin.
pub trait MovingObject {
    /// State the hooks read and mutate.
    type Context: ?Sized;

    /// Distance under which the mover counts as arrived.
    const HIT_THRESHOLD: f32;

    /// Shared motion state.
    fn motion(&self) -> &Motion;

    /// Shared motion state, mutably.
    fn motion_mut(&mut self) -> &mut Motion;

    /// Re-aim before moving. May resolve the mover if there is nothing left to
    /// approach.
    fn refresh_target(&mut self, context: &Self::Context);

    /// One-shot reaction on arrival.
    fn on_arrival(&mut self, context: &mut Self::Context);

    /// Advance by `dt` seconds.
    fn update(&mut self, dt: f32, context: &mut Self::Context) {
        if self.motion().resolved {
            return;
        }

        self.refresh_target(context);
        if self.motion().resolved {
            return;
        }

        let Motion {
            position,
            target,
            speed,
            ..
        } = *self.motion();
        let distance = position.distance(target);

        if distance < Self::HIT_THRESHOLD {
            self.on_arrival(context);
            self.motion_mut().resolved = true;
        } else {
            let step = (speed * dt).min(distance);
            self.motion_mut().position = position.lerp(target, step / distance);
        }
    }

    /// Current position.
    fn position(&self) -> Position {
        self.motion().position
    }

    /// Whether the mover is finished and can be dropped.
    fn is_resolved(&self) -> bool {
        self.motion().resolved
    }
}

/// A homing shot bound to one enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    motion: Motion,
    target: EnemyId,
    damage: i32,
}

impl Projectile {
    /// Fire from `start` at an enemy currently standing at `aim`.
    #[must_use]
    pub const fn new(start: Position, target: EnemyId, aim: Position, speed: f32, damage: i32) -> Self {
        Self {
            motion: Motion::new(start, aim, speed),
            target,
            damage,
        }
    }

    /// Enemy this projectile is homing on.
    #[must_use]
    pub fn target(&self) -> EnemyId {
        self.target
    }

    /// Damage applied on hit.
    #[must_use]
    pub fn damage(&self) -> i32 {
        self.damage
    }

    /// Whether the projectile hit or fizzled.
    #[must_use]
    pub fn has_hit(&self) -> bool {
        self.motion.resolved
    }
}

impl MovingObject for Projectile {
    type Context = EnemyRoster;

    const HIT_THRESHOLD: f32 = PROJECTILE_HIT_THRESHOLD;

    fn motion(&self) -> &Motion {
        &self.motion
    }

    fn motion_mut(&mut self) -> &mut Motion {
        &mut self.motion
    }

    fn refresh_target(&mut self, enemies: &EnemyRoster) {
        match enemies.get(self.target) {
            Some(enemy) if enemy.is_alive() => self.motion.target = enemy.position(),
            // Target died or left the field; fizzle without damage
            _ => self.motion.resolved = true,
        }
    }

    fn on_arrival(&mut self, enemies: &mut EnemyRoster) {
        if let Some(enemy) = enemies.get_mut(self.target) {
            if enemy.is_alive() {
                enemy.take_damage(self.damage);
            }
        }
    }
}

/// A reward pickup flying from a kill to the budget display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoneyCoin {
    motion: Motion,
    reward: i32,
}

impl MoneyCoin {
    /// Launch a coin from `start` toward the fixed `anchor`.
    #[must_use]
    pub const fn new(start: Position, anchor: Position, speed: f32, reward: i32) -> Self {
        Self {
            motion: Motion::new(start, anchor, speed),
            reward,
        }
    }

    /// Money carried by this coin.
    #[must_use]
    pub fn reward(&self) -> i32 {
        self.reward
    }
}

impl MovingObject for MoneyCoin {
    type Context = BudgetManager;

    const HIT_THRESHOLD: f32 = COIN_HIT_THRESHOLD;

    fn motion(&self) -> &Motion {
        &self.motion
    }

    fn motion_mut(&mut self) -> &mut Motion {
        &mut self.motion
    }

    fn refresh_target(&mut self, _budget: &BudgetManager) {}

    fn on_arrival(&mut self, budget: &mut BudgetManager) {
        budget.earn(self.reward);
        tracing::debug!(reward = self.reward, budget = budget.budget(), "Coin collected");
    }
}
