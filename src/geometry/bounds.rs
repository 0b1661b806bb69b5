//! Rectangular bounds in (x, y, t) space

use super::{AffineTransform, Point};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::{Add, Sub};

/// An inclusive integer interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Limits {
    pub lo: i32,
    pub hi: i32,
}

impl Limits {
    pub fn new(lo: i32, hi: i32) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, v: i32) -> bool {
        v >= self.lo && v <= self.hi
    }

    pub fn len(&self) -> usize {
        (self.hi - self.lo + 1).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.hi < self.lo
    }
}

/// Inclusive rectangular bounds in (x, y, t) space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub x: Limits,
    pub y: Limits,
    pub t: Limits,
}

impl Bounds {
    pub const EMPTY: Bounds = Bounds {
        x: Limits { lo: 0, hi: -1 },
        y: Limits { lo: 0, hi: -1 },
        t: Limits { lo: 0, hi: -1 },
    };

    pub fn new(x: Limits, y: Limits, t: Limits) -> Self {
        Self { x, y, t }
    }

    /// A width x height grid spanning generations 0..=max_gen.
    pub fn grid(width: i32, height: i32, max_gen: i32) -> Self {
        Self::new(
            Limits::new(0, width - 1),
            Limits::new(0, height - 1),
            Limits::new(0, max_gen),
        )
    }

    pub fn contains(&self, p: Point) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.t.contains(p.t)
    }

    pub fn cell_count(&self) -> usize {
        self.x.len() * self.y.len() * self.t.len()
    }

    /// True when p lies on the spatial edge of the bounds.
    pub fn on_spatial_boundary(&self, p: Point) -> bool {
        p.x == self.x.lo || p.x == self.x.hi || p.y == self.y.lo || p.y == self.y.hi
    }
}

impl Add<Point> for Bounds {
    type Output = Bounds;

    fn add(self, d: Point) -> Bounds {
        Bounds::new(
            Limits::new(self.x.lo + d.x, self.x.hi + d.x),
            Limits::new(self.y.lo + d.y, self.y.hi + d.y),
            Limits::new(self.t.lo + d.t, self.t.hi + d.t),
        )
    }
}

impl Sub<Point> for Bounds {
    type Output = Bounds;

    fn sub(self, d: Point) -> Bounds {
        self + Point::new(-d.x, -d.y, -d.t)
    }
}

/// Compute the closure of `start` under the given transformations, restricted
/// to `bounds`: the smallest set containing `start` that is closed under
/// applying each transformation to each element. Images that fall outside the
/// bounds are dropped, which models the pattern boundary. Terminates because
/// the bounds are finite.
pub fn image_closure(
    start: Point,
    transforms: &[AffineTransform],
    bounds: Bounds,
) -> BTreeSet<Point> {
    let mut images = BTreeSet::new();
    images.insert(start);
    let mut frontier = vec![start];
    while let Some(p) = frontier.pop() {
        for transf in transforms {
            let img = transf.apply(p);
            if bounds.contains(img) && images.insert(img) {
                frontier.push(img);
            }
        }
    }
    images
}
