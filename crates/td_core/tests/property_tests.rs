//! Property-based tests for path geometry and simulation invariants.

use std::sync::Arc;

use proptest::prelude::*;
use td_core::prelude::*;
use td_test_utils::fixtures;
use td_test_utils::strategies::{
    arb_damage, arb_dt, arb_health, arb_path_kind, arb_position, arb_progress, arb_range,
    arb_sharp_route, arb_strategy, arb_wave, arb_waypoints,
};

const STEP: f32 = 0.001;

proptest! {
    // =========================================================================
    // Path geometry
    // =========================================================================

    /// Both ends of every route are hit exactly.
    #[test]
    fn prop_path_endpoints_exact(waypoints in arb_waypoints(8), kind in arb_path_kind()) {
        let path = Path::new(kind, waypoints.clone()).unwrap();
        prop_assert_eq!(path.position_at(0.0), waypoints[0]);
        prop_assert_eq!(path.position_at(1.0), waypoints[waypoints.len() - 1]);
    }

    /// Progress outside [0, 1] clamps to the endpoints.
    #[test]
    fn prop_path_clamps(waypoints in arb_waypoints(6), kind in arb_path_kind(), over in 0.0f32..10.0) {
        let path = Path::new(kind, waypoints).unwrap();
        prop_assert_eq!(path.position_at(-over), path.position_at(0.0));
        prop_assert_eq!(path.position_at(1.0 + over), path.position_at(1.0));
    }

    /// A small progress step never jumps further than the arc it covers.
    #[test]
    fn prop_polyline_is_continuous(waypoints in arb_waypoints(8), t in 0.0f32..0.999) {
        let path = Path::polyline(waypoints).unwrap();
        let step = path.position_at(t).distance(path.position_at(t + STEP));
        let bound = STEP * path.length() * 1.001 + 0.1;
        prop_assert!(step <= bound, "step {} exceeds {}", step, bound);
    }

    /// Spline steps stay within a small factor of the arc they cover; the
    /// arc-length table is piecewise linear so exact equality is not expected.
    #[test]
    fn prop_spline_is_continuous(waypoints in arb_waypoints(8), t in 0.0f32..0.999) {
        let path = Path::spline(waypoints).unwrap();
        let step = path.position_at(t).distance(path.position_at(t + STEP));
        let bound = STEP * path.length() * 4.0 + 1.0;
        prop_assert!(step <= bound, "step {} exceeds {}", step, bound);
    }

    /// Equal progress steps cover equal arc length, hairpin corners
    /// included. The arc of each step is walked in fine chords, which
    /// measures the curve itself rather than its parameterization.
    #[test]
    fn prop_spline_constant_speed(route in arb_sharp_route(8), step in 0u32..16) {
        const STEPS: u32 = 16;
        const SUBSTEPS: u32 = 64;

        let path = Path::spline(route).unwrap();
        let expected = path.length() / STEPS as f32;
        let t0 = step as f32 / STEPS as f32;
        let dt = 1.0 / (STEPS * SUBSTEPS) as f32;

        let mut arc = 0.0;
        let mut prev = path.position_at(t0);
        for k in 1..=SUBSTEPS {
            let next = path.position_at(t0 + dt * k as f32);
            arc += prev.distance(next);
            prev = next;
        }

        let tolerance = expected * 0.02 + 5.0;
        prop_assert!(
            (arc - expected).abs() <= tolerance,
            "step {} covered {} units, expected {} +/- {}", step, arc, expected, tolerance
        );
    }

    /// Sampling yields `count + 1` finite points.
    #[test]
    fn prop_samples_are_finite(waypoints in arb_waypoints(8), kind in arb_path_kind(), count in 1usize..64) {
        let path = Path::new(kind, waypoints).unwrap();
        let samples = path.sample_points(count);
        prop_assert_eq!(samples.len(), count + 1);
        prop_assert!(samples.iter().all(|p| p.is_finite()));
    }

    // =========================================================================
    // Math
    // =========================================================================

    /// Distance is symmetric and never negative.
    #[test]
    fn prop_distance_symmetric(a in arb_position(), b in arb_position()) {
        prop_assert_eq!(a.distance(b), b.distance(a));
        prop_assert!(a.distance(b) >= 0.0);
    }

    /// Segment distance is bounded by the distance to either endpoint.
    #[test]
    fn prop_segment_distance_bounded(p in arb_position(), s in arb_position(), e in arb_position()) {
        let d = td_core::math::distance_to_segment(p, s, e);
        prop_assert!(d <= p.distance(s) + 0.01);
        prop_assert!(d <= p.distance(e) + 0.01);
    }

    // =========================================================================
    // Enemies and targeting
    // =========================================================================

    /// Progress only moves forward and never leaves [0, 1].
    #[test]
    fn prop_enemy_progress_monotone(
        waypoints in arb_waypoints(6),
        kind in arb_path_kind(),
        speed in 0u32..500,
        dts in proptest::collection::vec(arb_dt(), 1..200),
    ) {
        let path = Arc::new(Path::new(kind, waypoints).unwrap());
        let mut enemy = Enemy::new(EnemyId(0), path, EnemyStats::new(10, speed as f32, 1), 0.0);

        let mut last = enemy.path_progress();
        for dt in dts {
            enemy.update(dt);
            let progress = enemy.path_progress();
            prop_assert!(progress >= last);
            prop_assert!((0.0..=1.0).contains(&progress));
            last = progress;
        }
    }

    /// The chosen target is alive, in range and best by the strategy's key.
    #[test]
    fn prop_targeting_picks_best_candidate(
        spawns in proptest::collection::vec((arb_progress(), arb_health(), arb_damage()), 0..12),
        origin in arb_position(),
        range in arb_range(),
        strategy in arb_strategy(),
    ) {
        let path = Arc::new(
            Path::polyline(vec![Position::new(-500.0, 0.0), Position::new(500.0, 0.0)]).unwrap(),
        );
        let mut roster = EnemyRoster::new();
        for (progress, health, damage) in spawns {
            let id = roster.spawn_at_progress(&path, EnemyStats::new(health, 0.0, 1), progress);
            if let Some(enemy) = roster.get_mut(id) {
                enemy.take_damage(damage);
            }
        }

        let enemies = roster.as_slice();
        let in_range: Vec<&Enemy> = enemies
            .iter()
            .filter(|e| e.is_alive() && origin.distance(e.position()) <= range)
            .collect();

        match strategy.select_target(origin, range, enemies) {
            None => prop_assert!(in_range.is_empty()),
            Some(target) => {
                prop_assert!(target.is_alive());
                let distance = origin.distance(target.position());
                prop_assert!(distance <= range);
                for other in &in_range {
                    match strategy {
                        TargetingStrategy::Nearest => {
                            prop_assert!(origin.distance(other.position()) >= distance);
                        }
                        TargetingStrategy::Strongest => prop_assert!(other.health() <= target.health()),
                        TargetingStrategy::Weakest => prop_assert!(other.health() >= target.health()),
                    }
                }
            }
        }
    }

    // =========================================================================
    // World rules
    // =========================================================================

    /// Shrinking the candidate range never turns a valid spot invalid.
    #[test]
    fn prop_placement_monotone_in_range(spot in arb_position(), small in arb_range(), extra in arb_range()) {
        let mut world = GameWorld::new(fixtures::empty_config(fixtures::winding_waypoints())).unwrap();
        let anchor = fixtures::standard_tower_spots()[0];
        world.place_tower(anchor.x, anchor.y, 1).unwrap();

        if world.is_valid_placement(spot.x, spot.y, small + extra) {
            prop_assert!(world.is_valid_placement(spot.x, spot.y, small));
        }
    }

    /// Without towers the budget is untouched and lives only go down.
    #[test]
    fn prop_undefended_world_only_loses_lives(
        first in arb_wave(1, 0.0),
        second in arb_wave(2, 5.0),
        ticks in 1usize..300,
    ) {
        let mut config = fixtures::empty_config(fixtures::dogleg_waypoints());
        config.waves = vec![first, second];
        let mut world = GameWorld::new(config).unwrap();

        let mut lives = world.lives();
        for _ in 0..ticks {
            world.update(0.05);
            prop_assert!(world.lives() <= lives);
            prop_assert_eq!(world.budget(), 500);
            prop_assert!(world.coins().is_empty());
            lives = world.lives();
        }
    }
}
