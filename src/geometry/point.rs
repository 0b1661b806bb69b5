//! Points in (x, y, t) space

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A point (or displacement vector) in (x, y, t) space-time.
///
/// Ordering is lexicographic by (x, y, t), which the union-find layer relies
/// on for deterministic root election.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
    pub t: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0, t: 0 };

    pub fn new(x: i32, y: i32, t: i32) -> Self {
        Self { x, y, t }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y, self.t + other.t)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y, self.t - other.t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(1, 2, 3);
        let b = Point::new(10, -2, 1);

        assert_eq!(a + b, Point::new(11, 0, 4));
        assert_eq!(a - b, Point::new(-9, 4, 2));
        assert_eq!(a + Point::ORIGIN, a);
    }

    #[test]
    fn test_point_ordering() {
        // Lexicographic by (x, y, t)
        assert!(Point::new(0, 9, 9) < Point::new(1, 0, 0));
        assert!(Point::new(1, 0, 9) < Point::new(1, 1, 0));
        assert!(Point::new(1, 1, 0) < Point::new(1, 1, 1));
    }
}
