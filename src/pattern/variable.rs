//! Patterns with unknown cells and symmetry constraints

use super::{Cell, CellGroup};
use crate::geometry::{image_closure, AffineTransform, Bounds, Point};
use crate::rule::conway;
use crate::sat::clause::{transition_clauses, ClauseList};
use crate::utils::UnionFind;
use anyhow::{bail, Result};

/// Union-find key space for the build step. The sentinels order below every
/// cell position, so they always win root election and the dead sentinel
/// wins over the alive one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum EquivKey {
    Dead,
    Alive,
    Cell(Point),
}

/// A dense grid of cells over a bounds, with symmetry constraints encoded by
/// cell groups.
///
/// Populate the pattern (group assignment, known marking), then call
/// [`build`](Self::build) to compute variable codes: union-find merges every
/// cell with its images under its group's transformations, and each
/// equivalence class receives one code (0 = dead, 1 = alive, >= 2 = fresh
/// local variable). Mutating the pattern invalidates the built state.
#[derive(Debug)]
pub struct VariablePattern {
    bounds: Bounds,
    cells: Vec<Cell>,
    groups: Vec<CellGroup>,
    codes: Vec<i32>,
    variable_count: usize,
    built: bool,
}

impl VariablePattern {
    pub fn new(bounds: Bounds) -> Self {
        let mut cells = Vec::with_capacity(bounds.cell_count());
        for t in bounds.t.lo..=bounds.t.hi {
            for y in bounds.y.lo..=bounds.y.hi {
                for x in bounds.x.lo..=bounds.x.hi {
                    cells.push(Cell::unknown(Point::new(x, y, t)));
                }
            }
        }
        Self {
            bounds,
            cells,
            groups: Vec::new(),
            codes: Vec::new(),
            variable_count: 0,
            built: false,
        }
    }

    /// A width x height grid spanning generations 0..=max_gen.
    pub fn grid(width: i32, height: i32, max_gen: i32) -> Self {
        Self::new(Bounds::grid(width, height, max_gen))
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Flat index of p in (t, y, x) lexicographic order.
    fn index(&self, p: Point) -> Option<usize> {
        if !self.bounds.contains(p) {
            return None;
        }
        let sz_x = self.bounds.x.len();
        let sz_y = self.bounds.y.len();
        let lx = (p.x - self.bounds.x.lo) as usize;
        let ly = (p.y - self.bounds.y.lo) as usize;
        let lt = (p.t - self.bounds.t.lo) as usize;
        Some(lt * sz_y * sz_x + ly * sz_x + lx)
    }

    /// The cell at p, or a default unknown cell for out-of-bounds positions.
    pub fn cell(&self, p: Point) -> Cell {
        match self.index(p) {
            Some(i) => self.cells[i],
            None => Cell::unknown(p),
        }
    }

    pub fn is_boundary(&self, p: Point) -> bool {
        self.bounds.on_spatial_boundary(p)
    }

    /// Translate the pattern and all its cells. Invalidates the built state.
    pub fn shift_by(&mut self, rel_shift: Point) {
        self.bounds = self.bounds + rel_shift;
        for cell in &mut self.cells {
            cell.position = cell.position + rel_shift;
        }
        self.built = false;
    }

    /// Register a cell group, returning its index. Later groups take
    /// priority over earlier ones.
    pub fn add_group(&mut self, group: CellGroup) -> usize {
        self.groups.push(group);
        self.built = false;
        self.groups.len() - 1
    }

    /// Register a cell group with only a time transformation.
    pub fn add_temporal_group(&mut self, time_transformation: AffineTransform) -> usize {
        self.add_group(CellGroup::new(time_transformation))
    }

    pub fn set_group(&mut self, p: Point, group: usize) {
        if let Some(i) = self.index(p) {
            self.cells[i].group = Some(group);
            self.built = false;
        }
    }

    pub fn set_group_if(&mut self, group: usize, predicate: impl Fn(&Cell) -> bool) {
        for cell in &mut self.cells {
            if predicate(cell) {
                cell.group = Some(group);
            }
        }
        self.built = false;
    }

    pub fn set_known(&mut self, p: Point, state: bool) {
        if let Some(i) = self.index(p) {
            self.cells[i].known = true;
            self.cells[i].state = state;
            self.built = false;
        }
    }

    pub fn set_dead(&mut self, p: Point) {
        self.set_known(p, false);
    }

    pub fn set_alive(&mut self, p: Point) {
        self.set_known(p, true);
    }

    pub fn set_known_if(&mut self, state: bool, predicate: impl Fn(&Cell) -> bool) {
        for cell in &mut self.cells {
            if predicate(cell) {
                cell.known = true;
                cell.state = state;
            }
        }
        self.built = false;
    }

    pub fn set_follows_rules(&mut self, p: Point, follows: bool) {
        if let Some(i) = self.index(p) {
            self.cells[i].follows_rules = follows;
            self.built = false;
        }
    }

    pub fn set_follows_rules_if(&mut self, follows: bool, predicate: impl Fn(&Cell) -> bool) {
        for cell in &mut self.cells {
            if predicate(cell) {
                cell.follows_rules = follows;
            }
        }
        self.built = false;
    }

    /// Compute the variable codes.
    ///
    /// Every cell and two sentinels enter a union-find; known cells unite
    /// with the matching sentinel. Each grouped cell then unites with its
    /// images under the group's spatial closure and time transformation,
    /// but only toward images whose group index is at most its own (the
    /// priority rule) and never toward group-less cells. A merge that joins
    /// the dead and alive classes is a contradiction and fails the build.
    pub fn build(&mut self) -> Result<()> {
        let mut uf: UnionFind<EquivKey> = UnionFind::with_capacity(self.cells.len() + 2);
        uf.make_set(EquivKey::Dead);
        uf.make_set(EquivKey::Alive);

        for cell in &self.cells {
            let key = EquivKey::Cell(cell.position);
            uf.make_set(key);
            if cell.is_live() {
                uf.unite(key, EquivKey::Alive);
            } else if cell.is_dead() {
                uf.unite(key, EquivKey::Dead);
            }
        }

        for cell in &self.cells {
            let Some(group_idx) = cell.group else {
                continue;
            };
            let group = &self.groups[group_idx];
            let source = EquivKey::Cell(cell.position);

            for image in image_closure(cell.position, &group.spatial_transformations, self.bounds)
            {
                let target = self.cell(image);
                if matches!(target.group, Some(g) if g <= group_idx) {
                    uf.unite(source, EquivKey::Cell(image));
                }
            }

            let time_image = group.time_transformation.apply(cell.position);
            if self.bounds.contains(time_image) && time_image != cell.position {
                let target = self.cell(time_image);
                if matches!(target.group, Some(g) if g <= group_idx) {
                    uf.unite(source, EquivKey::Cell(time_image));
                }
            }

            if uf.same(EquivKey::Dead, EquivKey::Alive) {
                bail!(
                    "contradictory known cells: symmetry at {:?} links a dead cell to an alive one",
                    cell.position
                );
            }
        }

        let mut repr_to_code = std::collections::HashMap::new();
        repr_to_code.insert(uf.find(EquivKey::Dead), 0);
        repr_to_code.insert(uf.find(EquivKey::Alive), 1);
        let mut next_code = 2;

        self.codes = vec![0; self.cells.len()];
        for (i, cell) in self.cells.iter().enumerate() {
            let root = uf.find(EquivKey::Cell(cell.position));
            let code = *repr_to_code.entry(root).or_insert_with(|| {
                let code = next_code;
                next_code += 1;
                code
            });
            self.codes[i] = code;
        }

        self.variable_count = (next_code - 2) as usize;
        self.built = true;
        Ok(())
    }

    /// Number of distinct local variables (codes >= 2) after build.
    pub fn num_variables(&self) -> usize {
        debug_assert!(self.built);
        self.variable_count
    }

    /// The local code at p: 0 = dead, 1 = alive, >= 2 = local variable.
    /// Out-of-bounds positions read as dead.
    pub fn cell_value(&self, p: Point) -> i32 {
        debug_assert!(self.built);
        match self.index(p) {
            Some(i) => self.codes[i],
            None => 0,
        }
    }

    pub fn is_known(&self, p: Point) -> bool {
        self.cell(p).known
    }

    pub fn state(&self, p: Point) -> bool {
        self.cell(p).state
    }

    pub fn follows_rules(&self, p: Point) -> bool {
        self.cell(p).follows_rules
    }

    /// Transition clauses internal to this pattern, local codes offset into
    /// the caller's index space by `base` (code c >= 2 becomes base + c - 2).
    /// Out-of-bounds neighborhood positions read as constant dead.
    pub fn clauses(&self, base: i32) -> ClauseList {
        debug_assert!(self.built);
        let rule = conway();
        let mut clauses = ClauseList::new();
        let to_global = |local: i32| if local < 2 { local } else { base + (local - 2) };

        let mut context = [0i32; 10];
        for t in self.bounds.t.lo..self.bounds.t.hi {
            for y in self.bounds.y.lo..=self.bounds.y.hi {
                for x in self.bounds.x.lo..=self.bounds.x.hi {
                    let successor = Point::new(x, y, t + 1);
                    if !self.follows_rules(successor) {
                        continue;
                    }
                    let mut i = 0;
                    for dy in -1..=1 {
                        for dx in -1..=1 {
                            context[i] = to_global(self.cell_value(Point::new(x + dx, y + dy, t)));
                            i += 1;
                        }
                    }
                    context[9] = to_global(self.cell_value(successor));
                    transition_clauses(&context, rule, &mut clauses);
                }
            }
        }
        clauses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::clause::Clause;

    // Exhaustively check every assignment of up to `vars` variables against
    // the clause list, returning the satisfying assignments as bitmasks
    // (bit k-1 holds variable k).
    fn satisfying_assignments(clauses: &[Clause], vars: u32) -> Vec<u32> {
        (0..1u32 << vars)
            .filter(|a| {
                clauses
                    .iter()
                    .all(|c| c.satisfied_by(|v| a >> (v - 1) & 1 == 1))
            })
            .collect()
    }

    #[test]
    fn test_build_assigns_sentinel_codes() {
        let mut pattern = VariablePattern::grid(2, 2, 0);
        pattern.set_alive(Point::new(0, 0, 0));
        pattern.set_dead(Point::new(1, 0, 0));
        pattern.build().unwrap();

        assert_eq!(pattern.cell_value(Point::new(0, 0, 0)), 1);
        assert_eq!(pattern.cell_value(Point::new(1, 0, 0)), 0);
        assert!(pattern.cell_value(Point::new(0, 1, 0)) >= 2);
        assert_eq!(pattern.num_variables(), 2);
        // Out of bounds reads as dead
        assert_eq!(pattern.cell_value(Point::new(5, 5, 0)), 0);
    }

    #[test]
    fn test_codes_assigned_in_scan_order() {
        let mut pattern = VariablePattern::grid(2, 1, 1);
        pattern.build().unwrap();
        assert_eq!(pattern.cell_value(Point::new(0, 0, 0)), 2);
        assert_eq!(pattern.cell_value(Point::new(1, 0, 0)), 3);
        assert_eq!(pattern.cell_value(Point::new(0, 0, 1)), 4);
        assert_eq!(pattern.cell_value(Point::new(1, 0, 1)), 5);
    }

    #[test]
    fn test_temporal_link_shares_codes() {
        // A stable group (t -> t+1) collapses each column of time onto one
        // variable.
        let mut pattern = VariablePattern::grid(3, 3, 2);
        let group = pattern.add_temporal_group(AffineTransform::translation(0, 0, 1));
        pattern.set_group_if(group, |_| true);
        pattern.build().unwrap();

        for y in 0..3 {
            for x in 0..3 {
                let code = pattern.cell_value(Point::new(x, y, 0));
                assert_eq!(code, pattern.cell_value(Point::new(x, y, 1)));
                assert_eq!(code, pattern.cell_value(Point::new(x, y, 2)));
            }
        }
        assert_eq!(pattern.num_variables(), 9);
    }

    #[test]
    fn test_skewed_temporal_symmetry() {
        // Temporal transform (x, y, t) -> (x+1, -y, t+2): every in-bounds
        // pair must share a code.
        let bounds = Bounds::new(
            crate::geometry::Limits::new(0, 5),
            crate::geometry::Limits::new(-2, 2),
            crate::geometry::Limits::new(0, 2),
        );
        let mut pattern = VariablePattern::new(bounds);
        let transf = AffineTransform::new(1, 0, 0, -1, 1, 0, 2);
        let group = pattern.add_temporal_group(transf);
        pattern.set_group_if(group, |_| true);
        pattern.build().unwrap();

        let mut linked = 0;
        for y in -2..=2 {
            for x in 0..=5 {
                let p = Point::new(x, y, 0);
                let image = transf.apply(p);
                if bounds.contains(image) {
                    assert_eq!(
                        pattern.cell_value(p),
                        pattern.cell_value(image),
                        "codes differ for {:?} and {:?}",
                        p,
                        image
                    );
                    linked += 1;
                }
            }
        }
        assert!(linked > 0);
    }

    #[test]
    fn test_spatial_symmetry_closure() {
        // 180-degree rotation about the grid center pairs opposite cells.
        let mut pattern = VariablePattern::grid(3, 3, 0);
        let group = pattern.add_group(
            CellGroup::new(AffineTransform::IDENTITY)
                .with_spatial(AffineTransform::rotation_180(1, 1)),
        );
        pattern.set_group_if(group, |_| true);
        pattern.build().unwrap();

        assert_eq!(
            pattern.cell_value(Point::new(0, 0, 0)),
            pattern.cell_value(Point::new(2, 2, 0))
        );
        assert_eq!(
            pattern.cell_value(Point::new(2, 0, 0)),
            pattern.cell_value(Point::new(0, 2, 0))
        );
        // Center is its own image: 4 orbit pairs + the center = 5 variables
        assert_eq!(pattern.num_variables(), 5);
    }

    #[test]
    fn test_priority_rule_breaks_symmetry_upward() {
        // A symmetric low-priority background next to an asymmetric
        // high-priority perturbation. The background cell never links toward
        // a higher group index, and the perturbation carries no spatial
        // transformations of its own, so the mirror symmetry is broken at
        // the perturbation.
        let mut pattern = VariablePattern::grid(2, 1, 0);
        let mirror = AffineTransform::new(-1, 0, 0, 1, 1, 0, 0); // x -> 1 - x
        let low = pattern.add_group(
            CellGroup::new(AffineTransform::IDENTITY).with_spatial(mirror),
        );
        let high = pattern.add_group(CellGroup::default());
        pattern.set_group(Point::new(0, 0, 0), low);
        pattern.set_group(Point::new(1, 0, 0), high);
        pattern.build().unwrap();

        assert_ne!(
            pattern.cell_value(Point::new(0, 0, 0)),
            pattern.cell_value(Point::new(1, 0, 0))
        );

        // With equal groups the link is made.
        let mut symmetric = VariablePattern::grid(2, 1, 0);
        let g = symmetric.add_group(
            CellGroup::new(AffineTransform::IDENTITY).with_spatial(mirror),
        );
        symmetric.set_group_if(g, |_| true);
        symmetric.build().unwrap();
        assert_eq!(
            symmetric.cell_value(Point::new(0, 0, 0)),
            symmetric.cell_value(Point::new(1, 0, 0))
        );
    }

    #[test]
    fn test_higher_priority_absorbs_lower() {
        // A high-priority cell links toward lower-priority images.
        let mut pattern = VariablePattern::grid(2, 1, 0);
        let mirror = AffineTransform::new(-1, 0, 0, 1, 1, 0, 0);
        let low = pattern.add_group(CellGroup::default());
        let high = pattern.add_group(
            CellGroup::new(AffineTransform::IDENTITY).with_spatial(mirror),
        );
        pattern.set_group(Point::new(0, 0, 0), low);
        pattern.set_group(Point::new(1, 0, 0), high);
        pattern.build().unwrap();

        assert_eq!(
            pattern.cell_value(Point::new(0, 0, 0)),
            pattern.cell_value(Point::new(1, 0, 0))
        );
    }

    #[test]
    fn test_no_link_to_groupless_cells() {
        let mut pattern = VariablePattern::grid(2, 1, 0);
        let mirror = AffineTransform::new(-1, 0, 0, 1, 1, 0, 0);
        let g = pattern.add_group(
            CellGroup::new(AffineTransform::IDENTITY).with_spatial(mirror),
        );
        pattern.set_group(Point::new(0, 0, 0), g);
        // (1, 0, 0) has no group
        pattern.build().unwrap();
        assert_ne!(
            pattern.cell_value(Point::new(0, 0, 0)),
            pattern.cell_value(Point::new(1, 0, 0))
        );
    }

    #[test]
    fn test_contradiction_detected() {
        // A symmetry linking a known-dead cell to a known-alive one is an
        // over-constrained specification.
        let mut pattern = VariablePattern::grid(2, 1, 0);
        let mirror = AffineTransform::new(-1, 0, 0, 1, 1, 0, 0);
        let g = pattern.add_group(
            CellGroup::new(AffineTransform::IDENTITY).with_spatial(mirror),
        );
        pattern.set_group_if(g, |_| true);
        pattern.set_dead(Point::new(0, 0, 0));
        pattern.set_alive(Point::new(1, 0, 0));

        let err = pattern.build().unwrap_err();
        assert!(err.to_string().contains("contradictory"));
    }

    #[test]
    fn test_known_cells_inherit_sentinels_through_symmetry() {
        // Linking an unknown cell to a known one makes the whole class known.
        let mut pattern = VariablePattern::grid(2, 1, 0);
        let mirror = AffineTransform::new(-1, 0, 0, 1, 1, 0, 0);
        let g = pattern.add_group(
            CellGroup::new(AffineTransform::IDENTITY).with_spatial(mirror),
        );
        pattern.set_group_if(g, |_| true);
        pattern.set_alive(Point::new(0, 0, 0));
        pattern.build().unwrap();
        assert_eq!(pattern.cell_value(Point::new(1, 0, 0)), 1);
        assert_eq!(pattern.num_variables(), 0);
    }

    #[test]
    fn test_shift_invalidates_and_translates() {
        let mut pattern = VariablePattern::grid(2, 2, 0);
        pattern.set_alive(Point::new(0, 0, 0));
        pattern.build().unwrap();
        pattern.shift_by(Point::new(3, 4, 0));
        assert_eq!(pattern.bounds(), Bounds::grid(2, 2, 0) + Point::new(3, 4, 0));
        pattern.build().unwrap();
        assert_eq!(pattern.cell_value(Point::new(3, 4, 0)), 1);
    }

    // Exhaustive single-transition soundness at the sub-pattern level: a
    // 3x3x2 grid where only the t=1 center follows the rule and the t=1
    // border is known dead. Cell (x, y, 0) holds code 2 + 3y + x, so SAT
    // variable 3y + x + 1 is neighborhood bit 3y + x; the t=1 center (code
    // 11, variable 10) is the successor bit.
    #[test]
    fn test_single_transition_clauses_sound() {
        let rule = conway();
        let mut pattern = VariablePattern::grid(3, 3, 1);
        pattern.set_follows_rules_if(false, |_| true);
        pattern.set_follows_rules(Point::new(1, 1, 1), true);
        pattern.set_known_if(false, |c| c.position.t == 1 && c.position != Point::new(1, 1, 1));
        pattern.build().unwrap();
        assert_eq!(pattern.num_variables(), 10);

        let clauses = pattern.clauses(2);
        assert!(!clauses.is_empty());
        for assignment in 0u32..1 << 10 {
            let accepted = clauses
                .iter()
                .all(|c| c.satisfied_by(|v| assignment >> (v - 1) & 1 == 1));
            assert_eq!(
                accepted,
                rule.accepts(assignment as u16),
                "assignment {:#012b}",
                assignment
            );
        }
    }

    // Round-trip of a known pattern: with t=0 fixed to the boat and t=1
    // unknown, the clauses admit exactly one assignment, the boat itself.
    #[test]
    fn test_known_seed_forces_unique_successor() {
        let boat = [(0, 0), (1, 0), (0, 1), (2, 1), (1, 2)];
        let mut pattern = VariablePattern::grid(3, 3, 1);
        for y in 0..3 {
            for x in 0..3 {
                pattern.set_known(Point::new(x, y, 0), boat.contains(&(x, y)));
            }
        }
        pattern.build().unwrap();
        assert_eq!(pattern.num_variables(), 9);

        let clauses = pattern.clauses(2);
        let solutions = satisfying_assignments(&clauses, 9);
        assert_eq!(solutions.len(), 1);
        let model = solutions[0];
        for y in 0..3 {
            for x in 0..3 {
                let code = pattern.cell_value(Point::new(x, y, 1));
                let alive = model >> (code - 2) & 1 == 1;
                assert_eq!(alive, boat.contains(&(x, y)), "cell ({}, {})", x, y);
            }
        }
    }
}
