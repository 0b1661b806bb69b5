//! Sub-patterns: regions of space-time with a uniform cell policy
//!
//! Two variants exist and the set is closed, so a tagged enum stands in for
//! dynamic dispatch:
//!
//! - [`KnownPattern`]: every cell state is determined, produced from a seed
//!   (usually RLE) plus forward simulation.
//! - [`VariablePattern`]: unknown cells with symmetry constraints expressed
//!   through cell groups; `build` runs union-find to assign variable codes.

pub mod known;
pub mod variable;

pub use known::KnownPattern;
pub use variable::VariablePattern;

use crate::geometry::{AffineTransform, Bounds, Point};
use crate::sat::clause::ClauseList;
use anyhow::Result;

/// Symmetry constraints shared by a group of cells.
///
/// The spatial transformations generate a symmetry group within each
/// generation (all must leave t unchanged). The time transformation states
/// that a cell has the same state as its image, typically in a later
/// generation (e.g. t -> t+1 for still lifes).
#[derive(Debug, Clone)]
pub struct CellGroup {
    pub spatial_transformations: Vec<AffineTransform>,
    pub time_transformation: AffineTransform,
}

impl CellGroup {
    pub fn new(time_transformation: AffineTransform) -> Self {
        Self {
            spatial_transformations: Vec::new(),
            time_transformation,
        }
    }

    pub fn with_spatial(mut self, transf: AffineTransform) -> Self {
        self.spatial_transformations.push(transf);
        self
    }
}

impl Default for CellGroup {
    fn default() -> Self {
        Self::new(AffineTransform::IDENTITY)
    }
}

/// One cell of a variable sub-pattern.
///
/// `follows_rules` is independent of the group: a cell can be symmetric yet
/// exempt from the transition equation (typical for boundary padding), and
/// vice versa. `state` is only meaningful when `known` is set.
#[derive(Debug, Clone, Copy)]
pub struct Cell {
    pub position: Point,
    pub group: Option<usize>,
    pub follows_rules: bool,
    pub known: bool,
    pub state: bool,
}

impl Cell {
    pub fn unknown(position: Point) -> Self {
        Self {
            position,
            group: None,
            follows_rules: true,
            known: false,
            state: false,
        }
    }

    pub fn is_live(&self) -> bool {
        self.known && self.state
    }

    pub fn is_dead(&self) -> bool {
        self.known && !self.state
    }
}

/// A sub-pattern of the composed search problem.
#[derive(Debug)]
pub enum SubPattern {
    Known(KnownPattern),
    Variable(VariablePattern),
}

impl SubPattern {
    pub fn bounds(&self) -> Bounds {
        match self {
            SubPattern::Known(p) => p.bounds(),
            SubPattern::Variable(p) => p.bounds(),
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        self.bounds().contains(p)
    }

    /// Prepare the pattern for querying. For known patterns this is a no-op;
    /// for variable patterns it runs the union-find equivalence computation.
    pub fn build(&mut self) -> Result<()> {
        match self {
            SubPattern::Known(_) => Ok(()),
            SubPattern::Variable(p) => p.build(),
        }
    }

    /// Number of distinct local variables after build (0 for known patterns).
    pub fn num_variables(&self) -> usize {
        match self {
            SubPattern::Known(_) => 0,
            SubPattern::Variable(p) => p.num_variables(),
        }
    }

    /// Local variable code at p: 0 = dead, 1 = alive, >= 2 = local variable.
    /// Out-of-bounds positions read as dead.
    pub fn cell_value(&self, p: Point) -> i32 {
        match self {
            SubPattern::Known(pat) => i32::from(pat.state(p)),
            SubPattern::Variable(pat) => pat.cell_value(p),
        }
    }

    pub fn is_known(&self, p: Point) -> bool {
        match self {
            SubPattern::Known(_) => true,
            SubPattern::Variable(pat) => pat.is_known(p),
        }
    }

    /// The known state at p. Only meaningful when `is_known(p)` holds.
    pub fn state(&self, p: Point) -> bool {
        match self {
            SubPattern::Known(pat) => pat.state(p),
            SubPattern::Variable(pat) => pat.state(p),
        }
    }

    pub fn follows_rules(&self, p: Point) -> bool {
        match self {
            SubPattern::Known(_) => true,
            SubPattern::Variable(pat) => pat.follows_rules(p),
        }
    }

    /// Transition clauses internal to this sub-pattern, with local variables
    /// offset by `base`. A known pattern satisfies every transition by
    /// construction and emits nothing.
    pub fn clauses(&self, base: i32) -> ClauseList {
        match self {
            SubPattern::Known(_) => ClauseList::new(),
            SubPattern::Variable(pat) => pat.clauses(base),
        }
    }
}

impl From<KnownPattern> for SubPattern {
    fn from(p: KnownPattern) -> Self {
        SubPattern::Known(p)
    }
}

impl From<VariablePattern> for SubPattern {
    fn from(p: VariablePattern) -> Self {
        SubPattern::Variable(p)
    }
}
