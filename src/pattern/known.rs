//! Fully-determined patterns built from a seed plus forward simulation

use crate::geometry::{Bounds, Limits, Point};
use crate::rule::conway;
use anyhow::{bail, Result};
use std::collections::HashSet;

/// A pattern whose every cell state is determined.
///
/// The live cells are stored in unshifted coordinates with the seed at t=0;
/// `shift` translates the whole pattern, queries included. Generations
/// 1..=max_gen are produced by a naive forward simulator over the growing
/// bounding rectangle. Any position outside the live set reads as dead.
#[derive(Debug, Clone)]
pub struct KnownPattern {
    on_cells: HashSet<Point>,
    bounds: Bounds,
    shift: Point,
}

impl KnownPattern {
    /// The empty pattern.
    pub fn empty() -> Self {
        Self {
            on_cells: HashSet::new(),
            bounds: Bounds::EMPTY,
            shift: Point::ORIGIN,
        }
    }

    /// Parse an RLE string as generation 0 and simulate forward to max_gen.
    ///
    /// Lines starting with `x` or `#` are metadata and skipped. The body is
    /// runs of an optional decimal count followed by `b` (dead), `o`
    /// (alive), `$` (next row) or `!` (end); a missing count means one.
    pub fn from_rle(rle: &str, max_gen: i32) -> Result<Self> {
        let mut on_cells = HashSet::new();
        let (mut x, mut y) = (0i32, 0i32);
        let mut max_x = 0i32;
        let mut count: i32 = 0;
        let mut done = false;

        for line in rle.lines() {
            if done {
                break;
            }
            let trimmed = line.trim_start();
            if trimmed.starts_with('x') || trimmed.starts_with('#') {
                continue;
            }
            for c in line.chars() {
                match c {
                    '0'..='9' => {
                        count = count * 10 + (c as i32 - '0' as i32);
                    }
                    'b' => {
                        x += run_length(&mut count);
                    }
                    'o' => {
                        for _ in 0..run_length(&mut count) {
                            on_cells.insert(Point::new(x, y, 0));
                            max_x = max_x.max(x);
                            x += 1;
                        }
                    }
                    '$' => {
                        y += run_length(&mut count);
                        x = 0;
                    }
                    '!' => {
                        done = true;
                        break;
                    }
                    c if c.is_whitespace() => {}
                    c => bail!("invalid RLE: unexpected character '{}'", c),
                }
            }
        }

        let mut pattern = Self {
            on_cells,
            bounds: Bounds::new(
                Limits::new(0, max_x),
                Limits::new(0, y),
                Limits::new(0, max_gen),
            ),
            shift: Point::ORIGIN,
        };
        for gen in 1..=max_gen {
            pattern.advance_generation(gen);
        }
        Ok(pattern)
    }

    /// Build a pattern from explicit live cells at t=0 and simulate forward.
    pub fn from_cells(cells: &[(i32, i32)], max_gen: i32) -> Self {
        if cells.is_empty() {
            let mut pattern = Self::empty();
            pattern.bounds.t = Limits::new(0, max_gen);
            return pattern;
        }
        let mut xs = Limits::new(cells[0].0, cells[0].0);
        let mut ys = Limits::new(cells[0].1, cells[0].1);
        for &(x, y) in cells {
            xs = Limits::new(xs.lo.min(x), xs.hi.max(x));
            ys = Limits::new(ys.lo.min(y), ys.hi.max(y));
        }
        let mut pattern = Self {
            on_cells: cells.iter().map(|&(x, y)| Point::new(x, y, 0)).collect(),
            bounds: Bounds::new(xs, ys, Limits::new(0, max_gen)),
            shift: Point::ORIGIN,
        };
        for gen in 1..=max_gen {
            pattern.advance_generation(gen);
        }
        pattern
    }

    /// The bounding box of all live cells so far, with the shift applied.
    pub fn bounds(&self) -> Bounds {
        self.bounds + self.shift
    }

    /// Translate the pattern (queries included) by the given vector.
    pub fn shift_by(&mut self, rel_shift: Point) {
        self.shift = self.shift + rel_shift;
    }

    /// The state at p. Positions outside the live set are dead regardless of
    /// bounds.
    pub fn state(&self, p: Point) -> bool {
        self.on_cells.contains(&(p - self.shift))
    }

    /// Number of live cells in the given generation.
    pub fn live_count(&self, gen: i32) -> usize {
        self.on_cells.iter().filter(|p| p.t == gen).count()
    }

    /// Compute generation `gen` from `gen - 1` under the Life rule, scanning
    /// one cell beyond the current bounding rectangle on each side. Bounds
    /// only ever grow.
    fn advance_generation(&mut self, gen: i32) {
        let rule = conway();
        let mut xs = self.bounds.x;
        let mut ys = self.bounds.y;
        let mut births = Vec::new();
        for x in self.bounds.x.lo - 1..=self.bounds.x.hi + 1 {
            for y in self.bounds.y.lo - 1..=self.bounds.y.hi + 1 {
                let mut neighborhood = 0u16;
                let mut bit = 0;
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        if self.on_cells.contains(&Point::new(x + dx, y + dy, gen - 1)) {
                            neighborhood |= 1 << bit;
                        }
                        bit += 1;
                    }
                }
                if rule.successor(neighborhood) {
                    births.push(Point::new(x, y, gen));
                    xs = Limits::new(xs.lo.min(x), xs.hi.max(x));
                    ys = Limits::new(ys.lo.min(y), ys.hi.max(y));
                }
            }
        }
        self.on_cells.extend(births);
        self.bounds = Bounds::new(xs, ys, Limits::new(0, gen));
    }

    /// ASCII rendering of one generation, with axis marks through the
    /// origin.
    pub fn render_generation(&self, gen: i32) -> String {
        let bounds = self.bounds();
        let mut out = String::new();
        for y in bounds.y.lo..=bounds.y.hi {
            for x in bounds.x.lo..=bounds.x.hi {
                out.push(if self.state(Point::new(x, y, gen)) {
                    'o'
                } else if x == 0 && y == 0 {
                    '+'
                } else if x == 0 {
                    '|'
                } else if y == 0 {
                    '-'
                } else {
                    '.'
                });
            }
            out.push('\n');
        }
        out
    }
}

fn run_length(count: &mut i32) -> i32 {
    let run = if *count == 0 { 1 } else { *count };
    *count = 0;
    run
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rle_block() {
        // 2x2 block still life
        let pattern = KnownPattern::from_rle("2o$2o!", 2).unwrap();
        for gen in 0..=2 {
            assert_eq!(pattern.live_count(gen), 4);
            for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                assert!(pattern.state(Point::new(x, y, gen)));
            }
        }
        assert_eq!(pattern.bounds(), Bounds::grid(2, 2, 2));
    }

    #[test]
    fn test_rle_header_and_comments_skipped() {
        let rle = "#N Blinker\n#C period 2\nx = 3, y = 1, rule = B3/S23\n3o!";
        let pattern = KnownPattern::from_rle(rle, 2).unwrap();
        assert_eq!(pattern.live_count(0), 3);
        // Horizontal blinker becomes vertical
        assert!(pattern.state(Point::new(1, -1, 1)));
        assert!(pattern.state(Point::new(1, 0, 1)));
        assert!(pattern.state(Point::new(1, 1, 1)));
        assert_eq!(pattern.live_count(1), 3);
        // And back again
        for x in 0..3 {
            assert!(pattern.state(Point::new(x, 0, 2)));
        }
    }

    #[test]
    fn test_rle_run_counts_and_rows() {
        let pattern = KnownPattern::from_rle("3b2o$5o!", 0).unwrap();
        assert_eq!(pattern.live_count(0), 7);
        assert!(pattern.state(Point::new(3, 0, 0)));
        assert!(pattern.state(Point::new(4, 0, 0)));
        assert!(!pattern.state(Point::new(2, 0, 0)));
        for x in 0..5 {
            assert!(pattern.state(Point::new(x, 1, 0)));
        }
    }

    #[test]
    fn test_rle_multi_row_skip() {
        let pattern = KnownPattern::from_rle("o3$o!", 0).unwrap();
        assert!(pattern.state(Point::new(0, 0, 0)));
        assert!(pattern.state(Point::new(0, 3, 0)));
        assert_eq!(pattern.live_count(0), 2);
    }

    #[test]
    fn test_rle_invalid_character() {
        assert!(KnownPattern::from_rle("2o$zz!", 0).is_err());
    }

    #[test]
    fn test_glider_displacement() {
        // The glider returns to its shape displaced by (+1, +1) every four
        // generations.
        let pattern = KnownPattern::from_rle("bo$2bo$3o!", 4).unwrap();
        let gen0: Vec<Point> = [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)]
            .iter()
            .map(|&(x, y)| Point::new(x, y, 0))
            .collect();
        for &p in &gen0 {
            assert!(pattern.state(p));
            assert!(
                pattern.state(p + Point::new(1, 1, 4)),
                "missing glider cell at {:?}",
                p + Point::new(1, 1, 4)
            );
        }
        assert_eq!(pattern.live_count(0), 5);
        assert_eq!(pattern.live_count(4), 5);
    }

    #[test]
    fn test_shift() {
        let mut pattern = KnownPattern::from_rle("2o$2o!", 1).unwrap();
        pattern.shift_by(Point::new(10, -5, 0));
        assert!(pattern.state(Point::new(10, -5, 0)));
        assert!(!pattern.state(Point::new(0, 0, 0)));
        assert_eq!(pattern.bounds(), Bounds::grid(2, 2, 1) + Point::new(10, -5, 0));

        pattern.shift_by(Point::new(-10, 5, 0));
        assert!(pattern.state(Point::new(0, 0, 0)));
    }

    #[test]
    fn test_from_cells_boat() {
        let boat = KnownPattern::from_cells(&[(0, 0), (1, 0), (0, 1), (2, 1), (1, 2)], 3);
        // The boat is a still life
        for gen in 0..=3 {
            assert_eq!(boat.live_count(gen), 5);
            assert!(boat.state(Point::new(0, 0, gen)));
            assert!(boat.state(Point::new(2, 1, gen)));
            assert!(!boat.state(Point::new(1, 1, gen)));
        }
    }

    #[test]
    fn test_render_generation() {
        let pattern = KnownPattern::from_rle("2o$2o!", 0).unwrap();
        assert_eq!(pattern.render_generation(0), "oo\noo\n");
    }

    #[test]
    fn test_empty_pattern() {
        let pattern = KnownPattern::empty();
        assert!(!pattern.state(Point::ORIGIN));
        assert_eq!(pattern.live_count(0), 0);
    }
}
