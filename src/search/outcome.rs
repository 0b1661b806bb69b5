//! Search outcome representation

use crate::geometry::{Limits, Point};
use crate::sat::{Model, SearchProblem};
use crate::utils::format_duration;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Satisfiable,
    Unsatisfiable,
}

/// One generation of cell states reconstructed from a solver model.
#[derive(Debug, Clone, Serialize)]
pub struct Generation {
    pub index: i32,
    pub x: Limits,
    pub y: Limits,
    cells: Vec<bool>,
}

impl Generation {
    /// Read generation `index` of the composed problem back through the
    /// model.
    pub fn extract(problem: &SearchProblem, model: &Model, index: i32) -> Self {
        let bounds = problem.bounds();
        let mut cells = Vec::with_capacity(bounds.x.len() * bounds.y.len());
        for y in bounds.y.lo..=bounds.y.hi {
            for x in bounds.x.lo..=bounds.x.hi {
                cells.push(problem.cell_state(Point::new(x, y, index), model));
            }
        }
        Self {
            index,
            x: bounds.x,
            y: bounds.y,
            cells,
        }
    }

    pub fn get(&self, x: i32, y: i32) -> bool {
        if !self.x.contains(x) || !self.y.contains(y) {
            return false;
        }
        let ix = (x - self.x.lo) as usize;
        let iy = (y - self.y.lo) as usize;
        self.cells[iy * self.x.len() + ix]
    }

    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|&&alive| alive).count()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for y in self.y.lo..=self.y.hi {
            for x in self.x.lo..=self.x.hi {
                out.push(if self.get(x, y) { 'o' } else { '.' });
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Statistics about one compile-and-solve run.
#[derive(Debug, Clone, Serialize)]
pub struct SearchStatistics {
    pub variables_before_dedup: usize,
    pub variables: usize,
    pub clauses: usize,
    #[serde(skip)]
    pub build_time: Duration,
    #[serde(skip)]
    pub solve_time: Duration,
}

impl fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Search Statistics:")?;
        writeln!(
            f,
            "  Variables: {} ({} before deduplication)",
            self.variables, self.variables_before_dedup
        )?;
        writeln!(f, "  Clauses: {}", self.clauses)?;
        writeln!(f, "  Build time: {}", format_duration(self.build_time))?;
        writeln!(f, "  Solve time: {}", format_duration(self.solve_time))?;
        Ok(())
    }
}

/// The result of a search: the verdict, the reconstructed generations when
/// satisfiable, and run statistics.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub status: SearchStatus,
    pub generations: Vec<Generation>,
    pub statistics: SearchStatistics,
}

impl SearchOutcome {
    pub fn is_satisfiable(&self) -> bool {
        self.status == SearchStatus::Satisfiable
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        match self.status {
            SearchStatus::Satisfiable => {
                out.push_str("SATISFIABLE\n\n");
                for generation in &self.generations {
                    out.push_str(&format!(
                        "Generation {} ({} alive):\n",
                        generation.index,
                        generation.live_count()
                    ));
                    out.push_str(&generation.render());
                    out.push('\n');
                }
            }
            SearchStatus::Unsatisfiable => {
                out.push_str("UNSATISFIABLE\n");
            }
        }
        out.push_str(&self.statistics.to_string());
        out
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize search outcome")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::KnownPattern;

    fn boat_problem() -> SearchProblem {
        let boat = [(0, 0), (1, 0), (0, 1), (2, 1), (1, 2)];
        let mut problem = SearchProblem::grid(3, 3, 1);
        problem.add_entry(KnownPattern::from_cells(&boat, 1), |_| true);
        problem.build().unwrap();
        problem
    }

    #[test]
    fn test_extract_generation() {
        let problem = boat_problem();
        let generation = Generation::extract(&problem, &Model::new(), 0);
        assert_eq!(generation.live_count(), 5);
        assert!(generation.get(0, 0));
        assert!(!generation.get(1, 1));
        assert!(!generation.get(99, 0));
        assert_eq!(generation.render(), "oo.\no.o\n.o.\n");
    }

    #[test]
    fn test_outcome_rendering() {
        let problem = boat_problem();
        let outcome = SearchOutcome {
            status: SearchStatus::Satisfiable,
            generations: vec![Generation::extract(&problem, &Model::new(), 0)],
            statistics: SearchStatistics {
                variables_before_dedup: 0,
                variables: 0,
                clauses: 0,
                build_time: Duration::from_millis(1),
                solve_time: Duration::from_millis(2),
            },
        };
        let text = outcome.render_text();
        assert!(text.contains("SATISFIABLE"));
        assert!(text.contains("Generation 0 (5 alive):"));
        assert!(text.contains("oo.\n"));

        let json = outcome.to_json().unwrap();
        assert!(json.contains("\"satisfiable\""));
    }
}
