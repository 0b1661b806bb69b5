//! Composition of sub-patterns into a single SAT search problem

use super::clause::{transition_clauses, ClauseList};
use super::dimacs::Model;
use crate::geometry::{Bounds, Point};
use crate::pattern::SubPattern;
use crate::rule::conway;
use crate::utils::UnionFind;
use anyhow::{bail, Result};
use std::collections::HashMap;
use std::fmt::Write as _;

/// A sub-pattern plus the mask that routes composite positions to it.
struct ProblemEntry {
    pattern: SubPattern,
    mask: Box<dyn Fn(Point) -> bool>,
}

/// A search problem composed of masked sub-patterns over a shared bounds.
///
/// Entries are tested in order: the first mask that returns true owns the
/// position, and every position must have an owner. Building the problem
/// builds each sub-pattern, renumbers local variables into a global index
/// space via dense per-entry base offsets, and collapses variables whose
/// transition contexts are identical (signature deduplication). All
/// iteration is lexicographic by (t, y, x), so identical inputs produce
/// byte-identical CNF output.
pub struct SearchProblem {
    bounds: Bounds,
    entries: Vec<ProblemEntry>,
    built: bool,
    entry_bases: Vec<i32>,
    raw_variable_count: usize,
    variable_count: usize,
    raw_codes: Vec<i32>,
    rule_flags: Vec<bool>,
    codes: Vec<i32>,
}

impl SearchProblem {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            entries: Vec::new(),
            built: false,
            entry_bases: Vec::new(),
            raw_variable_count: 0,
            variable_count: 0,
            raw_codes: Vec::new(),
            rule_flags: Vec::new(),
            codes: Vec::new(),
        }
    }

    /// A width x height problem spanning generations 0..=max_gen.
    pub fn grid(width: i32, height: i32, max_gen: i32) -> Self {
        Self::new(Bounds::grid(width, height, max_gen))
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Append a sub-pattern entry, returning its index. Earlier entries take
    /// precedence where masks overlap.
    pub fn add_entry(
        &mut self,
        pattern: impl Into<SubPattern>,
        mask: impl Fn(Point) -> bool + 'static,
    ) -> usize {
        self.entries.push(ProblemEntry {
            pattern: pattern.into(),
            mask: Box::new(mask),
        });
        self.built = false;
        self.entries.len() - 1
    }

    /// The index of the entry owning p, if any. Out-of-bounds positions have
    /// no owner.
    pub fn owner(&self, p: Point) -> Option<usize> {
        if !self.bounds.contains(p) {
            return None;
        }
        self.entries.iter().position(|e| (e.mask)(p))
    }

    fn flat_index(&self, x: i32, y: i32, t: i32) -> usize {
        let sz_x = self.bounds.x.len();
        let sz_y = self.bounds.y.len();
        let lx = (x - self.bounds.x.lo) as usize;
        let ly = (y - self.bounds.y.lo) as usize;
        let lt = (t - self.bounds.t.lo) as usize;
        lt * sz_y * sz_x + ly * sz_x + lx
    }

    fn raw_value_at(&self, x: i32, y: i32, t: i32) -> i32 {
        if !self.bounds.contains(Point::new(x, y, t)) {
            return 0;
        }
        self.raw_codes[self.flat_index(x, y, t)]
    }

    fn value_at(&self, x: i32, y: i32, t: i32) -> i32 {
        if !self.bounds.contains(Point::new(x, y, t)) {
            return 0;
        }
        self.codes[self.flat_index(x, y, t)]
    }

    /// Build all sub-patterns and assign global variable codes.
    pub fn build(&mut self) -> Result<()> {
        let total_cells = self.bounds.cell_count();

        // Validate mask coverage up front and remember each cell's owner so
        // the masks are evaluated exactly once per position.
        let mut owners = vec![0usize; total_cells];
        let mut fi = 0;
        for t in self.bounds.t.lo..=self.bounds.t.hi {
            for y in self.bounds.y.lo..=self.bounds.y.hi {
                for x in self.bounds.x.lo..=self.bounds.x.hi {
                    let p = Point::new(x, y, t);
                    match self.entries.iter().position(|e| (e.mask)(p)) {
                        Some(owner) => owners[fi] = owner,
                        None => bail!("not all cells are covered by masks: no entry owns {:?}", p),
                    }
                    fi += 1;
                }
            }
        }

        for entry in &mut self.entries {
            entry.pattern.build()?;
        }

        // Dense base offsets into the global variable index space.
        self.entry_bases.clear();
        let mut next_base = 2i32;
        for entry in &self.entries {
            self.entry_bases.push(next_base);
            next_base += entry.pattern.num_variables() as i32;
        }
        self.raw_variable_count = (next_base - 2) as usize;

        // Raw global codes and rule flags, one pass in (t, y, x) order.
        self.raw_codes = vec![0; total_cells];
        self.rule_flags = vec![false; total_cells];
        let mut fi = 0;
        for t in self.bounds.t.lo..=self.bounds.t.hi {
            for y in self.bounds.y.lo..=self.bounds.y.hi {
                for x in self.bounds.x.lo..=self.bounds.x.hi {
                    let p = Point::new(x, y, t);
                    let owner = owners[fi];
                    let local = self.entries[owner].pattern.cell_value(p);
                    self.raw_codes[fi] = if local < 2 {
                        local
                    } else {
                        self.entry_bases[owner] + (local - 2)
                    };
                    self.rule_flags[fi] = self.entries[owner].pattern.follows_rules(p);
                    fi += 1;
                }
            }
        }

        let remap = self.deduplicate_transitions()?;
        self.codes = self
            .raw_codes
            .iter()
            .map(|&raw| if raw < 2 { raw } else { remap[(raw - 2) as usize] })
            .collect();

        self.built = true;
        Ok(())
    }

    /// Collapse output variables whose transition contexts are identical.
    ///
    /// Under any deterministic rule, two successors with the same (center,
    /// neighbor multiset) signature must take the same value, so their
    /// variables are merged before clause emission. Returns the remap table
    /// from raw codes to final codes.
    fn deduplicate_transitions(&mut self) -> Result<Vec<i32>> {
        let mut uf: UnionFind<i32> = UnionFind::with_capacity(self.raw_variable_count + 2);
        uf.make_set(0);
        uf.make_set(1);

        let mut signature_outputs: HashMap<(i32, [i32; 8]), i32> = HashMap::new();
        for t in self.bounds.t.lo..self.bounds.t.hi {
            for y in self.bounds.y.lo..=self.bounds.y.hi {
                for x in self.bounds.x.lo..=self.bounds.x.hi {
                    if !self.rule_flags[self.flat_index(x, y, t + 1)] {
                        continue;
                    }
                    let output = self.raw_value_at(x, y, t + 1);
                    let center = self.raw_value_at(x, y, t);
                    let mut neighbors = [0i32; 8];
                    let mut i = 0;
                    for dy in -1..=1 {
                        for dx in -1..=1 {
                            if dx == 0 && dy == 0 {
                                continue;
                            }
                            neighbors[i] = self.raw_value_at(x + dx, y + dy, t);
                            i += 1;
                        }
                    }
                    neighbors.sort_unstable();

                    match signature_outputs.entry((center, neighbors)) {
                        std::collections::hash_map::Entry::Vacant(slot) => {
                            slot.insert(output);
                        }
                        std::collections::hash_map::Entry::Occupied(slot) => {
                            let recorded = *slot.get();
                            if output >= 2 {
                                uf.unite(output, recorded);
                            } else if recorded >= 2 {
                                uf.unite(recorded, output);
                            } else if recorded != output {
                                bail!(
                                    "contradictory known outputs for one transition signature at \
                                     ({}, {}, {}): center {}, neighbors {:?}, output {} vs {}",
                                    x,
                                    y,
                                    t + 1,
                                    center,
                                    neighbors,
                                    output,
                                    recorded
                                );
                            }
                            if uf.same(0, 1) {
                                bail!(
                                    "contradictory known outputs for one transition signature at \
                                     ({}, {}, {}): dedup links dead to alive",
                                    x,
                                    y,
                                    t + 1
                                );
                            }
                        }
                    }
                }
            }
        }

        // Final numbering: known roots keep their sentinel value, fresh
        // roots are numbered in ascending order of first appearance.
        let mut remap = vec![0i32; self.raw_variable_count];
        let mut root_to_code: HashMap<i32, i32> = HashMap::new();
        let mut next_code = 2i32;
        for raw in 2..(2 + self.raw_variable_count as i32) {
            let root = uf.find(raw);
            remap[(raw - 2) as usize] = if root < 2 {
                root
            } else {
                *root_to_code.entry(root).or_insert_with(|| {
                    let code = next_code;
                    next_code += 1;
                    code
                })
            };
        }
        self.variable_count = (next_code - 2) as usize;
        Ok(remap)
    }

    /// Global code at p before deduplication.
    pub fn raw_cell_value(&self, p: Point) -> i32 {
        debug_assert!(self.built);
        self.raw_value_at(p.x, p.y, p.t)
    }

    /// Global code at p: 0 = dead, 1 = alive, >= 2 = global variable.
    /// Out-of-bounds positions read as dead.
    pub fn cell_value(&self, p: Point) -> i32 {
        debug_assert!(self.built);
        self.value_at(p.x, p.y, p.t)
    }

    /// Number of global variables after deduplication.
    pub fn num_variables(&self) -> usize {
        debug_assert!(self.built);
        self.variable_count
    }

    /// Number of global variables before deduplication.
    pub fn num_raw_variables(&self) -> usize {
        debug_assert!(self.built);
        self.raw_variable_count
    }

    pub fn follows_rules(&self, p: Point) -> bool {
        debug_assert!(self.built);
        if !self.bounds.contains(p) {
            return false;
        }
        self.rule_flags[self.flat_index(p.x, p.y, p.t)]
    }

    /// Emit the transition clauses for every rule-following successor in
    /// the composed grid.
    pub fn clauses(&self) -> ClauseList {
        debug_assert!(self.built);
        let rule = conway();
        let mut clauses = ClauseList::new();
        let mut context = [0i32; 10];
        for t in self.bounds.t.lo..self.bounds.t.hi {
            for y in self.bounds.y.lo..=self.bounds.y.hi {
                for x in self.bounds.x.lo..=self.bounds.x.hi {
                    if !self.rule_flags[self.flat_index(x, y, t + 1)] {
                        continue;
                    }
                    let mut i = 0;
                    for dy in -1..=1 {
                        for dx in -1..=1 {
                            context[i] = self.value_at(x + dx, y + dy, t);
                            i += 1;
                        }
                    }
                    context[9] = self.value_at(x, y, t + 1);
                    transition_clauses(&context, rule, &mut clauses);
                }
            }
        }
        clauses
    }

    /// Reconstruct a cell state from a solver model: code 0 is dead, code 1
    /// is alive, and code c >= 2 is alive iff SAT variable c - 1 is true.
    pub fn cell_state(&self, p: Point, model: &Model) -> bool {
        match self.cell_value(p) {
            0 => false,
            1 => true,
            code => model.is_true(code - 1),
        }
    }

    /// Check that a model obeys the rule at every rule-following successor.
    pub fn verify_model(&self, model: &Model) -> Result<()> {
        debug_assert!(self.built);
        let rule = conway();
        for t in self.bounds.t.lo..self.bounds.t.hi {
            for y in self.bounds.y.lo..=self.bounds.y.hi {
                for x in self.bounds.x.lo..=self.bounds.x.hi {
                    if !self.rule_flags[self.flat_index(x, y, t + 1)] {
                        continue;
                    }
                    let mut context = 0u16;
                    let mut bit = 0;
                    for dy in -1..=1 {
                        for dx in -1..=1 {
                            if self.cell_state(Point::new(x + dx, y + dy, t), model) {
                                context |= 1 << bit;
                            }
                            bit += 1;
                        }
                    }
                    if self.cell_state(Point::new(x, y, t + 1), model) {
                        context |= 1 << 9;
                    }
                    if !rule.accepts(context) {
                        bail!("model violates the rule at ({}, {}, {})", x, y, t + 1);
                    }
                }
            }
        }
        Ok(())
    }

    /// The variable grid as CSV: one generation block per time step,
    /// blank-line separated, cells comma-separated within each row.
    pub fn variable_grid_csv(&self) -> String {
        debug_assert!(self.built);
        let mut out = String::new();
        for t in self.bounds.t.lo..=self.bounds.t.hi {
            if t > self.bounds.t.lo {
                out.push('\n');
            }
            for y in self.bounds.y.lo..=self.bounds.y.hi {
                for x in self.bounds.x.lo..=self.bounds.x.hi {
                    if x > self.bounds.x.lo {
                        out.push(',');
                    }
                    let _ = write!(out, "{}", self.value_at(x, y, t));
                }
                out.push('\n');
            }
        }
        out
    }

    /// Human-readable rendering of the variable grid: `.` for known dead,
    /// `o` for known alive, `*` for cells exempt from the rule, numeric
    /// codes otherwise.
    pub fn render_variable_grid(&self) -> String {
        debug_assert!(self.built);
        let max_code = self.codes.iter().copied().max().unwrap_or(0);
        let width = max_code.to_string().len();
        let mut out = String::new();
        for t in self.bounds.t.lo..=self.bounds.t.hi {
            let _ = writeln!(out, "Generation {}:", t);
            for y in self.bounds.y.lo..=self.bounds.y.hi {
                for x in self.bounds.x.lo..=self.bounds.x.hi {
                    let code = self.value_at(x, y, t);
                    let follows = self.rule_flags[self.flat_index(x, y, t)];
                    if !follows {
                        let _ = write!(out, " {:>width$}", "*");
                    } else if code == 0 {
                        let _ = write!(out, " {:>width$}", ".");
                    } else if code == 1 {
                        let _ = write!(out, " {:>width$}", "o");
                    } else {
                        let _ = write!(out, " {:>width$}", code);
                    }
                }
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }
}
