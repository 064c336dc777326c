//! Tower target selection policies.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::enemy::Enemy;
use crate::error::{GameError, Result};
use crate::math::Position;

/// How a tower picks among the live enemies in its range.
///
/// Every policy skips dead enemies and anything farther than `range`
/// (a distance exactly equal to `range` is in range). Ties always go to the
/// enemy met first in iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetingStrategy {
    /// Closest enemy.
    #[default]
    Nearest,
    /// Enemy with the most health.
    Strongest,
    /// Enemy with the least health.
    Weakest,
}

impl TargetingStrategy {
    /// All strategies in cycle order.
    pub const ALL: [Self; 3] = [Self::Nearest, Self::Strongest, Self::Weakest];

    /// Pick a target for a tower at `origin`.
    #[must_use]
    pub fn select_target<'a>(
        self,
        origin: Position,
        range: f32,
        enemies: &'a [Enemy],
    ) -> Option<&'a Enemy> {
        let mut candidates = enemies
            .iter()
            .filter(|enemy| enemy.is_alive())
            .map(|enemy| (enemy, origin.distance(enemy.position())))
            .filter(|&(_, distance)| distance <= range);

        let (mut best, mut best_distance) = candidates.next()?;
        for (enemy, distance) in candidates {
            let better = match self {
                Self::Nearest => distance < best_distance,
                Self::Strongest => enemy.health() > best.health(),
                Self::Weakest => enemy.health() < best.health(),
            };
            if better {
                best = enemy;
                best_distance = distance;
            }
        }
        Some(best)
    }

    /// Next strategy in the Nearest, Strongest, Weakest cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Nearest => Self::Strongest,
            Self::Strongest => Self::Weakest,
            Self::Weakest => Self::Nearest,
        }
    }

    /// Strategy at `index` in [`Self::ALL`].
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidStrategyIndex`] for an index past the end.
    pub fn from_index(index: usize) -> Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(GameError::InvalidStrategyIndex(index))
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nearest => "Nearest",
            Self::Strongest => "Strongest",
            Self::Weakest => "Weakest",
        }
    }
}

impl fmt::Display for TargetingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::enemy::{EnemyId, EnemyStats};
    use crate::path::Path;

    /// One stationary enemy per `(x, health)` on a horizontal line.
    fn enemies_at(specs: &[(f32, i32)]) -> Vec<Enemy> {
        specs
            .iter()
            .enumerate()
            .map(|(i, &(x, health))| {
                let path = Arc::new(Path::polyline(vec![Position::new(x, 0.0)]).unwrap());
                Enemy::new(EnemyId(i as u64), path, EnemyStats::new(health, 0.0, 10), 0.0)
            })
            .collect()
    }

    #[test]
    fn test_nearest_picks_closest() {
        let mut enemies = enemies_at(&[(30.0, 100), (80.0, 100), (10.0, 100)]);
        let origin = Position::ORIGIN;

        let target = TargetingStrategy::Nearest.select_target(origin, 100.0, &enemies);
        assert_eq!(target.map(Enemy::id), Some(EnemyId(2)));

        enemies[2].take_damage(100);
        let target = TargetingStrategy::Nearest.select_target(origin, 100.0, &enemies);
        assert_eq!(target.map(Enemy::id), Some(EnemyId(0)));
    }

    #[test]
    fn test_range_boundary_is_inclusive() {
        let enemies = enemies_at(&[(100.0, 50), (100.5, 50)]);
        let target = TargetingStrategy::Nearest.select_target(Position::ORIGIN, 100.0, &enemies);
        assert_eq!(target.map(Enemy::id), Some(EnemyId(0)));

        let target = TargetingStrategy::Nearest.select_target(Position::ORIGIN, 99.0, &enemies);
        assert!(target.is_none());
    }

    #[test]
    fn test_strongest_and_weakest() {
        let enemies = enemies_at(&[(10.0, 40), (20.0, 90), (30.0, 20), (500.0, 1000)]);

        let strongest =
            TargetingStrategy::Strongest.select_target(Position::ORIGIN, 100.0, &enemies);
        assert_eq!(strongest.map(Enemy::id), Some(EnemyId(1)));

        let weakest = TargetingStrategy::Weakest.select_target(Position::ORIGIN, 100.0, &enemies);
        assert_eq!(weakest.map(Enemy::id), Some(EnemyId(2)));
    }

    #[test]
    fn test_ties_keep_first_found() {
        let enemies = enemies_at(&[(20.0, 60), (10.0, 60), (-20.0, 60)]);
        let origin = Position::ORIGIN;

        for strategy in [TargetingStrategy::Strongest, TargetingStrategy::Weakest] {
            let target = strategy.select_target(origin, 100.0, &enemies);
            assert_eq!(target.map(Enemy::id), Some(EnemyId(0)), "{strategy}");
        }

        // Equidistant pair: first in order wins
        let enemies = enemies_at(&[(-20.0, 60), (20.0, 60)]);
        let target = TargetingStrategy::Nearest.select_target(origin, 100.0, &enemies);
        assert_eq!(target.map(Enemy::id), Some(EnemyId(0)));
    }

    #[test]
    fn test_no_candidates() {
        let mut enemies = enemies_at(&[(10.0, 5)]);
        enemies[0].take_damage(10);

        for strategy in TargetingStrategy::ALL {
            assert!(strategy.select_target(Position::ORIGIN, 100.0, &enemies).is_none());
            assert!(strategy.select_target(Position::ORIGIN, 100.0, &[]).is_none());
        }
    }

    #[test]
    fn test_cycle_and_index() {
        let mut strategy = TargetingStrategy::default();
        assert_eq!(strategy, TargetingStrategy::Nearest);
        strategy = strategy.next();
        assert_eq!(strategy, TargetingStrategy::Strongest);
        strategy = strategy.next();
        assert_eq!(strategy, TargetingStrategy::Weakest);
        assert_eq!(strategy.next(), TargetingStrategy::Nearest);

        assert_eq!(TargetingStrategy::from_index(1), Ok(TargetingStrategy::Strongest));
        assert_eq!(
            TargetingStrategy::from_index(3),
            Err(GameError::InvalidStrategyIndex(3))
        );
    }
}
