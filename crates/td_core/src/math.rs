//! 2D geometry primitives shared by every part of the simulation.
//!
//! Positions are plain `f32` pairs copied by value. The helpers here are the
//! only place that divides by a length, so degenerate inputs (zero-length
//! vectors and segments) are handled once.

use serde::{Deserialize, Serialize};

/// An immutable point in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The world origin.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Linearly interpolate between two points.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Heading from this point to `other` in degrees, normalized to `[0, 360)`.
    #[must_use]
    pub fn heading_degrees_to(self, other: Self) -> f32 {
        let angle = (other.y - self.y).atan2(other.x - self.x).to_degrees();
        if angle < 0.0 {
            angle + 360.0
        } else {
            angle
        }
    }

    /// Check that both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Shortest distance from `point` to the segment `start..end`.
///
/// Uses the clamped projection onto the segment. A zero-length segment is
/// treated as the single point `start`.
#[must_use]
pub fn distance_to_segment(point: Position, start: Position, end: Position) -> f32 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let len_sq = dx * dx + dy * dy;

    if len_sq == 0.0 {
        return point.distance(start);
    }

    let param = ((point.x - start.x) * dx + (point.y - start.y) * dy) / len_sq;
    let closest = if param < 0.0 {
        start
    } else if param > 1.0 {
        end
    } else {
        Position::new(start.x + param * dx, start.y + param * dy)
    };

    let distance = point.distance(closest);
    if distance.is_finite() {
        distance
    } else {
        f32::MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_symmetric() {
        let a = Position::new(3.0, 0.0);
        let b = Position::new(0.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(b.distance(a), 5.0);
        assert_eq!(a.distance(a), 0.0);
    }

    #[test]
    fn test_lerp() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(10.0, 20.0);
        assert_eq!(a.lerp(b, 0.5), Position::new(5.0, 10.0));
    }

    #[test]
    fn test_heading_quadrants() {
        let origin = Position::ORIGIN;
        assert!((origin.heading_degrees_to(Position::new(1.0, 0.0)) - 0.0).abs() < 1e-4);
        assert!((origin.heading_degrees_to(Position::new(0.0, 1.0)) - 90.0).abs() < 1e-4);
        assert!((origin.heading_degrees_to(Position::new(-1.0, 0.0)) - 180.0).abs() < 1e-4);
        assert!((origin.heading_degrees_to(Position::new(0.0, -1.0)) - 270.0).abs() < 1e-4);
    }

    #[test]
    fn test_segment_distance_projection() {
        let start = Position::new(0.0, 0.0);
        let end = Position::new(100.0, 0.0);

        // Perpendicular foot inside the segment
        assert_eq!(distance_to_segment(Position::new(50.0, 30.0), start, end), 30.0);
        // Beyond either end clamps to the endpoint
        assert_eq!(distance_to_segment(Position::new(-3.0, 4.0), start, end), 5.0);
        assert_eq!(distance_to_segment(Position::new(103.0, -4.0), start, end), 5.0);
    }

    #[test]
    fn test_segment_distance_degenerate() {
        let p = Position::new(10.0, 10.0);
        let d = distance_to_segment(Position::new(13.0, 14.0), p, p);
        assert_eq!(d, 5.0);
    }
}
