//! Affine transformations on (x, y, t) space

use super::Point;
use serde::{Deserialize, Serialize};

/// The map v -> Av + b, where A is a 2x2 integer matrix acting on (x, y)
/// only and b is a displacement in (x, y, t). The t component is never mixed
/// with space: it is shifted by `dt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AffineTransform {
    pub a11: i32,
    pub a12: i32,
    pub a21: i32,
    pub a22: i32,
    pub dx: i32,
    pub dy: i32,
    pub dt: i32,
}

impl AffineTransform {
    pub const IDENTITY: AffineTransform = AffineTransform {
        a11: 1,
        a12: 0,
        a21: 0,
        a22: 1,
        dx: 0,
        dy: 0,
        dt: 0,
    };

    pub fn new(a11: i32, a12: i32, a21: i32, a22: i32, dx: i32, dy: i32, dt: i32) -> Self {
        Self {
            a11,
            a12,
            a21,
            a22,
            dx,
            dy,
            dt,
        }
    }

    /// A pure translation by (dx, dy, dt).
    pub fn translation(dx: i32, dy: i32, dt: i32) -> Self {
        Self::new(1, 0, 0, 1, dx, dy, dt)
    }

    /// 180-degree rotation about the spatial point (cx, cy), leaving t fixed.
    pub fn rotation_180(cx: i32, cy: i32) -> Self {
        Self::new(-1, 0, 0, -1, 2 * cx, 2 * cy, 0)
    }

    /// Apply the transformation to a point.
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a11 * p.x + self.a12 * p.y + self.dx,
            self.a21 * p.x + self.a22 * p.y + self.dy,
            p.t + self.dt,
        )
    }

    /// True when the transformation does not move points in time.
    pub fn is_spatial(&self) -> bool {
        self.dt == 0
    }
}
