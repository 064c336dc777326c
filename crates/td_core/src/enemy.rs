//! Path-walking, damageable enemies.
//!
//! An enemy is alive and on the path until one of two terminal states:
//! dead (`health <= 0`) or escaped (`path_progress >= 1`). The world checks
//! death first, so a dead enemy is never counted as escaped.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::math::Position;
use crate::path::Path;

/// Reward used when a template specifies none.
pub const DEFAULT_REWARD: i32 = 10;

/// Extra progress sampled ahead of the enemy to derive its heading.
pub const LOOK_AHEAD: f32 = 0.01;

/// Stable handle to an enemy. Ids are handed out in increasing order and
/// never reused within a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnemyId(pub u64);

impl fmt::Display for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Four-way facing used to pick a sprite row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Moving toward -y.
    #[default]
    Down,
    /// Moving toward -x.
    Left,
    /// Moving toward +x.
    Right,
    /// Moving toward +y.
    Up,
}

impl Facing {
    /// Bucket a heading in degrees (`[0, 360)`) into a facing.
    ///
    /// Down and left own `[225, 315)` and `[135, 225)`, right wraps across
    /// zero as `[315, 360) ∪ [0, 45)`, and up takes whatever is left.
    #[must_use]
    pub fn from_heading(degrees: f32) -> Self {
        if (225.0..315.0).contains(&degrees) {
            Self::Down
        } else if (135.0..225.0).contains(&degrees) {
            Self::Left
        } else if degrees >= 315.0 || degrees < 45.0 {
            Self::Right
        } else {
            Self::Up
        }
    }

    /// Sprite sheet row for this facing.
    #[must_use]
    pub const fn row(self) -> usize {
        match self {
            Self::Down => 0,
            Self::Left => 1,
            Self::Right => 2,
            Self::Up => 3,
        }
    }
}

/// The stats an enemy is spawned with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    /// Starting health.
    pub health: i32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Money granted when killed.
    pub reward: i32,
}

impl EnemyStats {
    /// Create a stat block.
    #[must_use]
    pub const fn new(health: i32, speed: f32, reward: i32) -> Self {
        Self {
            health,
            speed,
            reward,
        }
    }

    /// Replace a zero reward with [`DEFAULT_REWARD`].
    #[must_use]
    pub fn with_default_reward(mut self) -> Self {
        if self.reward == 0 {
            self.reward = DEFAULT_REWARD;
        }
        self
    }
}

/// An enemy walking the shared path.
#[derive(Debug, Clone)]
pub struct Enemy {
    id: EnemyId,
    position: Position,
    health: i32,
    speed: f32,
    path: Arc<Path>,
    path_progress: f32,
    reward: i32,
    animation_time: f32,
    facing: Facing,
}

impl Enemy {
    /// Create an enemy at `progress` along `path` (clamped to `[0, 1]`).
    #[must_use]
    pub fn new(id: EnemyId, path: Arc<Path>, stats: EnemyStats, progress: f32) -> Self {
        let path_progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        let position = path.position_at(path_progress);

        Self {
            id,
            position,
            health: stats.health,
            speed: stats.speed,
            path,
            path_progress,
            reward: stats.reward,
            animation_time: 0.0,
            facing: Facing::default(),
        }
    }

    /// Create an enemy standing on waypoint `index`.
    #[must_use]
    pub fn at_waypoint(id: EnemyId, path: Arc<Path>, stats: EnemyStats, index: usize) -> Self {
        let count = path.waypoint_count();
        let progress = if index == 0 {
            0.0
        } else if index >= count {
            1.0
        } else {
            index as f32 / (count - 1).max(1) as f32
        };
        Self::new(id, path, stats, progress)
    }

    /// Advance along the path by `speed * dt`.
    ///
    /// Animation time always advances. Position only changes while the enemy
    /// is alive and has not reached the end.
    pub fn update(&mut self, dt: f32) {
        self.animation_time += dt;

        if !self.is_alive() || self.has_reached_end() {
            return;
        }

        let length = self.path.length();
        if length <= 0.0 {
            return;
        }

        self.path_progress = (self.path_progress + self.speed * dt / length).min(1.0);
        self.position = self.path.position_at(self.path_progress);

        // At the very end the look-ahead lands on our own position; keep the
        // previous facing in that case.
        let ahead = self.path.position_at((self.path_progress + LOOK_AHEAD).min(1.0));
        if ahead != self.position {
            self.facing = Facing::from_heading(self.position.heading_degrees_to(ahead));
        }
    }

    /// Reduce health. Health may go negative.
    pub fn take_damage(&mut self, amount: i32) {
        self.health -= amount;
    }

    /// Whether health is above zero.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Whether the enemy has walked the whole path.
    #[must_use]
    pub fn has_reached_end(&self) -> bool {
        self.path_progress >= 1.0
    }

    /// Handle of this enemy.
    #[must_use]
    pub fn id(&self) -> EnemyId {
        self.id
    }

    /// Current world position.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Current health.
    #[must_use]
    pub fn health(&self) -> i32 {
        self.health
    }

    /// Movement speed.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Normalized progress along the path.
    #[must_use]
    pub fn path_progress(&self) -> f32 {
        self.path_progress
    }

    /// Money granted when killed.
    #[must_use]
    pub fn reward(&self) -> i32 {
        self.reward
    }

    /// Seconds since spawn, for animation frame selection.
    #[must_use]
    pub fn animation_time(&self) -> f32 {
        self.animation_time
    }

    /// Current facing.
    #[must_use]
    pub fn facing(&self) -> Facing {
        self.facing
    }
}

/// Owning collection of live enemies, kept sorted by id.
#[derive(Debug, Clone, Default)]
pub struct EnemyRoster {
    enemies: Vec<Enemy>,
    next_id: u64,
}

impl EnemyRoster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn an enemy at the start of `path` and return its id.
    pub fn spawn(&mut self, path: &Arc<Path>, stats: EnemyStats) -> EnemyId {
        self.spawn_at_progress(path, stats, 0.0)
    }

    /// Spawn an enemy at `progress` along `path`.
    pub fn spawn_at_progress(
        &mut self,
        path: &Arc<Path>,
        stats: EnemyStats,
        progress: f32,
    ) -> EnemyId {
        let id = EnemyId(self.next_id);
        self.next_id += 1;
        self.enemies
            .push(Enemy::new(id, Arc::clone(path), stats, progress));
        id
    }

    /// Look up an enemy by id.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies
            .binary_search_by_key(&id, Enemy::id)
            .ok()
            .map(|i| &self.enemies[i])
    }

    /// Look up an enemy mutably by id.
    pub fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        match self.enemies.binary_search_by_key(&id, Enemy::id) {
            Ok(i) => Some(&mut self.enemies[i]),
            Err(_) => None,
        }
    }

    /// All live enemies in spawn order.
    #[must_use]
    pub fn as_slice(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Iterate mutably in spawn order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Enemy> {
        self.enemies.iter_mut()
    }

    /// Keep only enemies matching `keep`. Order is preserved.
    pub fn retain(&mut self, keep: impl FnMut(&Enemy) -> bool) {
        self.enemies.retain(keep);
    }

    /// Number of live enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    /// Check if no enemies remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(from: (f32, f32), to: (f32, f32)) -> Arc<Path> {
        Arc::new(
            Path::polyline(vec![Position::new(from.0, from.1), Position::new(to.0, to.1)])
                .unwrap(),
        )
    }

    fn enemy_on(path: Arc<Path>, speed: f32) -> Enemy {
        Enemy::new(EnemyId(0), path, EnemyStats::new(100, speed, 10), 0.0)
    }

    #[test]
    fn test_spawns_at_path_start() {
        let enemy = enemy_on(line((10.0, 20.0), (110.0, 20.0)), 50.0);
        assert_eq!(enemy.position(), Position::new(10.0, 20.0));
        assert_eq!(enemy.path_progress(), 0.0);
        assert_eq!(enemy.facing(), Facing::Down);
    }

    #[test]
    fn test_update_advances_by_speed() {
        let mut enemy = enemy_on(line((0.0, 0.0), (100.0, 0.0)), 50.0);
        enemy.update(1.0);
        assert_eq!(enemy.path_progress(), 0.5);
        assert_eq!(enemy.position(), Position::new(50.0, 0.0));
    }

    #[test]
    fn test_overkill_leaves_negative_health() {
        let mut enemy = enemy_on(line((0.0, 0.0), (100.0, 0.0)), 50.0);
        enemy.take_damage(130);
        assert_eq!(enemy.health(), -30);
        assert!(!enemy.is_alive());
    }

    #[test]
    fn test_dead_enemy_does_not_move() {
        let mut enemy = enemy_on(line((0.0, 0.0), (100.0, 0.0)), 50.0);
        enemy.take_damage(100);
        enemy.update(1.0);
        assert_eq!(enemy.path_progress(), 0.0);
        assert_eq!(enemy.animation_time(), 1.0);
    }

    #[test]
    fn test_progress_clamps_and_stops_at_end() {
        let mut enemy = enemy_on(line((0.0, 0.0), (100.0, 0.0)), 50.0);
        enemy.update(5.0);
        assert_eq!(enemy.path_progress(), 1.0);
        assert!(enemy.has_reached_end());
        assert_eq!(enemy.position(), Position::new(100.0, 0.0));

        enemy.update(1.0);
        assert_eq!(enemy.position(), Position::new(100.0, 0.0));
    }

    #[test]
    fn test_facing_keeps_last_heading_at_end() {
        let mut enemy = enemy_on(line((100.0, 0.0), (0.0, 0.0)), 50.0);
        enemy.update(0.1);
        assert_eq!(enemy.facing(), Facing::Left);
        enemy.update(10.0);
        assert!(enemy.has_reached_end());
        assert_eq!(enemy.facing(), Facing::Left);
    }

    #[test]
    fn test_facing_from_movement() {
        let cases = [
            (((0.0, 0.0), (100.0, 0.0)), Facing::Right),
            (((100.0, 0.0), (0.0, 0.0)), Facing::Left),
            (((0.0, 0.0), (0.0, 100.0)), Facing::Up),
            (((0.0, 100.0), (0.0, 0.0)), Facing::Down),
        ];
        for ((from, to), expected) in cases {
            let mut enemy = enemy_on(line(from, to), 100.0);
            enemy.update(0.1);
            assert_eq!(enemy.facing(), expected, "path {from:?} -> {to:?}");
        }
    }

    #[test]
    fn test_facing_sector_boundaries() {
        assert_eq!(Facing::from_heading(0.0), Facing::Right);
        assert_eq!(Facing::from_heading(44.9), Facing::Right);
        assert_eq!(Facing::from_heading(45.0), Facing::Up);
        assert_eq!(Facing::from_heading(135.0), Facing::Left);
        assert_eq!(Facing::from_heading(225.0), Facing::Down);
        assert_eq!(Facing::from_heading(315.0), Facing::Right);
        assert_eq!(Facing::from_heading(359.9), Facing::Right);
        assert_eq!(Facing::Down.row(), 0);
        assert_eq!(Facing::Up.row(), 3);
    }

    #[test]
    fn test_animation_time_accumulates() {
        let mut enemy = enemy_on(line((0.0, 0.0), (100.0, 0.0)), 10.0);
        enemy.update(0.5);
        enemy.update(0.25);
        assert!((enemy.animation_time() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_at_waypoint_progress() {
        let path = Arc::new(
            Path::polyline(vec![
                Position::new(0.0, 0.0),
                Position::new(100.0, 0.0),
                Position::new(200.0, 0.0),
            ])
            .unwrap(),
        );
        let stats = EnemyStats::new(10, 1.0, 1);
        let mid = Enemy::at_waypoint(EnemyId(0), Arc::clone(&path), stats, 1);
        assert_eq!(mid.path_progress(), 0.5);
        let past = Enemy::at_waypoint(EnemyId(1), path, stats, 7);
        assert!(past.has_reached_end());
    }

    #[test]
    fn test_default_reward() {
        assert_eq!(EnemyStats::new(1, 1.0, 0).with_default_reward().reward, 10);
        assert_eq!(EnemyStats::new(1, 1.0, 3).with_default_reward().reward, 3);
    }

    #[test]
    fn test_roster_lookup_after_removal() {
        let path = line((0.0, 0.0), (100.0, 0.0));
        let mut roster = EnemyRoster::new();
        let a = roster.spawn(&path, EnemyStats::new(10, 1.0, 1));
        let b = roster.spawn(&path, EnemyStats::new(20, 1.0, 1));
        let c = roster.spawn(&path, EnemyStats::new(30, 1.0, 1));

        roster.retain(|e| e.id() != b);

        assert_eq!(roster.len(), 2);
        assert_eq!(roster.get(a).map(Enemy::health), Some(10));
        assert!(roster.get(b).is_none());
        assert_eq!(roster.get(c).map(Enemy::health), Some(30));
    }
}
