//! Routes that enemies walk.
//!
//! A [`Path`] maps normalized progress `t ∈ [0, 1]` to a world position. Two
//! layouts share that contract:
//!
//! - [`Path::Polyline`] interpolates linearly along cumulative segment length.
//! - [`Path::Spline`] runs a Catmull-Rom style curve through the waypoints and
//!   reparameterizes it by arc length, so equal steps in `t` cover equal
//!   distances even through tight corners.
//!
//! Both are immutable after construction. The spline does all of its sampling
//! up front; queries only search the precomputed tables.
//!
//! # Example
//!
//! ```
//! use td_core::math::Position;
//! use td_core::path::Path;
//!
//! let path = Path::polyline(vec![Position::new(0.0, 0.0), Position::new(100.0, 0.0)]).unwrap();
//! assert_eq!(path.length(), 100.0);
//! assert_eq!(path.position_at(0.25), Position::new(25.0, 0.0));
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::Position;

/// Default curve tension for [`Path::spline`].
pub const DEFAULT_TENSION: f32 = 0.5;

/// Curve samples taken per segment when building arc-length tables.
pub const SAMPLES_PER_SEGMENT: usize = 100;

/// Which path layout to build from a waypoint list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PathKind {
    /// Straight segments between waypoints.
    Polyline,
    /// Smooth constant-speed curve through the waypoints.
    #[default]
    Spline,
}

/// A route through an ordered, non-empty list of waypoints.
#[derive(Debug, Clone, PartialEq)]
pub enum Path {
    /// Straight-line segments.
    Polyline(Polyline),
    /// Arc-length parameterized curve.
    Spline(Spline),
}

impl Path {
    /// Build a path of the given kind.
    pub fn new(kind: PathKind, waypoints: Vec<Position>) -> Result<Self> {
        match kind {
            PathKind::Polyline => Self::polyline(waypoints),
            PathKind::Spline => Self::spline(waypoints),
        }
    }

    /// Build a polyline path.
    pub fn polyline(waypoints: Vec<Position>) -> Result<Self> {
        Polyline::new(waypoints).map(Self::Polyline)
    }

    /// Build a spline path with the default tension.
    pub fn spline(waypoints: Vec<Position>) -> Result<Self> {
        Self::spline_with_tension(waypoints, DEFAULT_TENSION)
    }

    /// Build a spline path with a custom tension.
    pub fn spline_with_tension(waypoints: Vec<Position>, tension: f32) -> Result<Self> {
        Spline::new(waypoints, tension).map(Self::Spline)
    }

    /// Layout of this path.
    #[must_use]
    pub fn kind(&self) -> PathKind {
        match self {
            Self::Polyline(_) => PathKind::Polyline,
            Self::Spline(_) => PathKind::Spline,
        }
    }

    fn points(&self) -> &[Position] {
        match self {
            Self::Polyline(p) => &p.waypoints,
            Self::Spline(s) => &s.waypoints,
        }
    }

    /// Copy of the waypoint list.
    #[must_use]
    pub fn waypoints(&self) -> Vec<Position> {
        self.points().to_vec()
    }

    /// Number of waypoints.
    #[must_use]
    pub fn waypoint_count(&self) -> usize {
        self.points().len()
    }

    /// Waypoint at `index`.
    pub fn point_at_index(&self, index: usize) -> Result<Position> {
        let points = self.points();
        points
            .get(index)
            .copied()
            .ok_or(GameError::WaypointOutOfRange {
                index,
                count: points.len(),
            })
    }

    /// Consecutive waypoint pairs. A single-waypoint path yields one
    /// zero-length segment so distance queries still see it.
    pub fn segments(&self) -> impl Iterator<Item = (Position, Position)> + '_ {
        let points = self.points();
        let single = (points.len() == 1).then(|| (points[0], points[0]));
        points
            .windows(2)
            .map(|w| (w[0], w[1]))
            .chain(single)
    }

    /// Total traversal length.
    #[must_use]
    pub fn length(&self) -> f32 {
        match self {
            Self::Polyline(p) => p.length,
            Self::Spline(s) => s.length,
        }
    }

    /// World position at normalized progress `t`, clamped to `[0, 1]`.
    #[must_use]
    pub fn position_at(&self, t: f32) -> Position {
        let points = self.points();
        let first = points[0];
        let last = points[points.len() - 1];

        if points.len() == 1 || t <= 0.0 || t.is_nan() {
            return first;
        }
        if t >= 1.0 {
            return last;
        }

        match self {
            Self::Polyline(p) => p.position_at(t),
            Self::Spline(s) => s.position_at(t),
        }
    }

    /// `count + 1` points spaced evenly in `t`, for drawing the route.
    #[must_use]
    pub fn sample_points(&self, count: usize) -> Vec<Position> {
        let count = count.max(1);
        (0..=count)
            .map(|i| self.position_at(i as f32 / count as f32))
            .collect()
    }
}

fn validate_waypoints(waypoints: &[Position]) -> Result<()> {
    if waypoints.is_empty() {
        return Err(GameError::EmptyPath);
    }
    if let Some(bad) = waypoints.iter().position(|p| !p.is_finite()) {
        return Err(GameError::InvalidConfig(format!(
            "waypoint {bad} has a non-finite coordinate"
        )));
    }
    Ok(())
}

/// Straight segments with cumulative-length parameterization.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    waypoints: Vec<Position>,
    length: f32,
}

impl Polyline {
    fn new(waypoints: Vec<Position>) -> Result<Self> {
        validate_waypoints(&waypoints)?;
        let length = waypoints.windows(2).map(|w| w[0].distance(w[1])).sum();
        Ok(Self { waypoints, length })
    }

    fn position_at(&self, t: f32) -> Position {
        let target = self.length * t;
        let mut accumulated = 0.0;

        for w in self.waypoints.windows(2) {
            let segment = w[0].distance(w[1]);
            if accumulated + segment >= target {
                if segment == 0.0 {
                    return w[0];
                }
                return w[0].lerp(w[1], (target - accumulated) / segment);
            }
            accumulated += segment;
        }

        self.waypoints[self.waypoints.len() - 1]
    }
}

/// One entry of a segment's arc-length table.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ArcSample {
    t: f32,
    distance: f32,
}

/// Catmull-Rom style curve with per-segment arc-length tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Spline {
    waypoints: Vec<Position>,
    tension: f32,
    segment_lengths: Vec<f32>,
    tables: Vec<Vec<ArcSample>>,
    length: f32,
}

impl Spline {
    fn new(waypoints: Vec<Position>, tension: f32) -> Result<Self> {
        validate_waypoints(&waypoints)?;

        let mut spline = Self {
            waypoints,
            tension,
            segment_lengths: Vec::new(),
            tables: Vec::new(),
            length: 0.0,
        };
        spline.build_tables();
        Ok(spline)
    }

    /// Curve tension.
    #[must_use]
    pub fn tension(&self) -> f32 {
        self.tension
    }

    fn build_tables(&mut self) {
        let segments = self.waypoints.len().saturating_sub(1);
        self.segment_lengths.reserve(segments);
        self.tables.reserve(segments);

        for segment in 0..segments {
            let mut table = Vec::with_capacity(SAMPLES_PER_SEGMENT + 1);
            table.push(ArcSample {
                t: 0.0,
                distance: 0.0,
            });

            let mut prev = self.point_on_curve(segment, 0.0);
            let mut travelled = 0.0;
            for j in 1..=SAMPLES_PER_SEGMENT {
                let t = j as f32 / SAMPLES_PER_SEGMENT as f32;
                let current = self.point_on_curve(segment, t);
                travelled += prev.distance(current);
                table.push(ArcSample {
                    t,
                    distance: travelled,
                });
                prev = current;
            }

            self.segment_lengths.push(travelled);
            self.tables.push(table);
            self.length += travelled;
        }
    }

    /// Curve point on `segment` at local parameter `t`. The first and last
    /// waypoints double as the virtual outer control points.
    fn point_on_curve(&self, segment: usize, t: f32) -> Position {
        let last = self.waypoints.len() - 1;
        let p0 = self.waypoints[segment.saturating_sub(1)];
        let p1 = self.waypoints[segment];
        let p2 = self.waypoints[segment + 1];
        let p3 = self.waypoints[(segment + 2).min(last)];

        catmull_rom(p0, p1, p2, p3, t.clamp(0.0, 1.0), self.tension)
    }

    /// Invert the arc-length table of `segment`: local distance to local `t`.
    fn find_t_for_distance(&self, segment: usize, distance: f32) -> f32 {
        let table = &self.tables[segment];
        let segment_length = self.segment_lengths[segment];

        if distance <= 0.0 {
            return 0.0;
        }
        if distance >= segment_length {
            return 1.0;
        }

        // First sample at or beyond the target distance
        let upper = table.partition_point(|s| s.distance < distance);
        if upper == 0 || upper >= table.len() {
            return 1.0;
        }

        let a = table[upper - 1];
        let b = table[upper];
        let span = b.distance - a.distance;
        if span <= 0.0 {
            return b.t;
        }
        a.t + (b.t - a.t) * ((distance - a.distance) / span)
    }

    fn position_at(&self, t: f32) -> Position {
        let target = self.length * t;
        let mut accumulated = 0.0;

        for (segment, &segment_length) in self.segment_lengths.iter().enumerate() {
            if accumulated + segment_length >= target {
                let local_t = self.find_t_for_distance(segment, target - accumulated);
                return self.point_on_curve(segment, local_t);
            }
            accumulated += segment_length;
        }

        self.waypoints[self.waypoints.len() - 1]
    }
}

/// Cardinal-spline basis with tension `a`. At `t = 0` the result is `p1`, at
/// `t = 1` it is `p2`.
fn catmull_rom(p0: Position, p1: Position, p2: Position, p3: Position, t: f32, a: f32) -> Position {
    let t2 = t * t;
    let t3 = t2 * t;

    let b0 = -a * t3 + 2.0 * a * t2 - a * t;
    let b1 = (2.0 - a) * t3 + (a - 3.0) * t2 + 1.0;
    let b2 = (a - 2.0) * t3 + (3.0 - 2.0 * a) * t2 + a * t;
    let b3 = a * t3 - a * t2;

    Position::new(
        b0 * p0.x + b1 * p1.x + b2 * p2.x + b3 * p3.x,
        b0 * p0.y + b1 * p1.y + b2 * p2.y + b3 * p3.y,
    )
}
