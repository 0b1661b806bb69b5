//! End-to-end search orchestration: settings to solved outcome

use super::outcome::{Generation, SearchOutcome, SearchStatistics, SearchStatus};
use crate::config::{SearchConfig, Settings};
use crate::geometry::{AffineTransform, Bounds, Point};
use crate::pattern::{KnownPattern, VariablePattern};
use crate::sat::{
    dimacs_string, solve_dimacs, BigClause, SearchProblem, SolverInvocation, SolverVerdict,
};
use crate::utils::write_file_checked;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// Compiles a configured search into CNF and drives the external solver.
///
/// The search pattern is a single variable sub-pattern over the configured
/// grid: border cells are held dead and exempted from the rule so interior
/// neighborhoods see constant dead padding, and both border and interior
/// carry the configured temporal symmetry (translation by period). A seed
/// RLE, when present, fixes generation 0 completely.
pub struct SearchRunner {
    settings: Settings,
    problem: SearchProblem,
    extra_clauses: Vec<BigClause>,
    build_time: Duration,
}

impl SearchRunner {
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate().context("configuration validation failed")?;

        let build_start = Instant::now();
        let pattern = build_search_pattern(&settings.search)?;
        let mut problem = SearchProblem::new(pattern.bounds());
        problem.add_entry(pattern, |_| true);
        problem.build()?;

        let mut extra_clauses = Vec::new();
        if settings.search.require_live_cell && settings.search.seed_file.is_none() {
            if let Some(clause) = at_least_one_alive_clause(&problem) {
                extra_clauses.push(clause);
            }
        }
        let build_time = build_start.elapsed();

        Ok(Self {
            settings,
            problem,
            extra_clauses,
            build_time,
        })
    }

    pub fn problem(&self) -> &SearchProblem {
        &self.problem
    }

    pub fn extra_clauses(&self) -> &[BigClause] {
        &self.extra_clauses
    }

    /// The full DIMACS instance for the configured search.
    pub fn dimacs(&self) -> String {
        dimacs_string(
            &self.problem.clauses(),
            &self.extra_clauses,
            self.problem.num_variables(),
        )
    }

    /// Compile, optionally dump the instance, invoke the solver, and map the
    /// model back to cell states.
    pub fn run(&mut self) -> Result<SearchOutcome> {
        let clauses = self.problem.clauses();
        let num_variables = self.problem.num_variables();
        println!(
            "Generated {} clauses with {} variables ({} before deduplication)",
            clauses.len() + self.extra_clauses.len(),
            num_variables,
            self.problem.num_raw_variables()
        );

        let dimacs = dimacs_string(&clauses, &self.extra_clauses, num_variables);
        if let Some(path) = &self.settings.output.cnf_file {
            write_file_checked(path, &dimacs, self.settings.output.overwrite)?;
        }
        if let Some(path) = &self.settings.output.csv_file {
            write_file_checked(
                path,
                &self.problem.variable_grid_csv(),
                self.settings.output.overwrite,
            )?;
        }

        let invocation = SolverInvocation {
            name: self.settings.solver.name.clone(),
            path: self.settings.solver.path.clone(),
            timeout_seconds: self.settings.solver.timeout_seconds,
        };
        let solve_start = Instant::now();
        let verdict = solve_dimacs(&dimacs, &invocation)?;
        let solve_time = solve_start.elapsed();

        let statistics = SearchStatistics {
            variables_before_dedup: self.problem.num_raw_variables(),
            variables: num_variables,
            clauses: clauses.len() + self.extra_clauses.len(),
            build_time: self.build_time,
            solve_time,
        };

        match verdict {
            SolverVerdict::Satisfiable(model) => {
                self.problem
                    .verify_model(&model)
                    .context("solver model failed rule validation")?;
                let bounds = self.problem.bounds();
                let generations = (bounds.t.lo..=bounds.t.hi)
                    .map(|t| Generation::extract(&self.problem, &model, t))
                    .collect();
                Ok(SearchOutcome {
                    status: SearchStatus::Satisfiable,
                    generations,
                    statistics,
                })
            }
            SolverVerdict::Unsatisfiable => Ok(SearchOutcome {
                status: SearchStatus::Unsatisfiable,
                generations: Vec::new(),
                statistics,
            }),
        }
    }
}

/// Build the variable pattern for a configured search.
fn build_search_pattern(search: &SearchConfig) -> Result<VariablePattern> {
    let bounds = Bounds::grid(search.width, search.height, search.generations);
    let mut pattern = VariablePattern::new(bounds);

    let symmetry =
        AffineTransform::translation(search.translate_x, search.translate_y, search.period);
    // Border first so the interior group takes priority over it.
    let border = pattern.add_temporal_group(symmetry);
    let interior = pattern.add_temporal_group(symmetry);

    pattern.set_group_if(interior, |c| !bounds.on_spatial_boundary(c.position));
    pattern.set_group_if(border, |c| bounds.on_spatial_boundary(c.position));
    pattern.set_known_if(false, |c| bounds.on_spatial_boundary(c.position));
    pattern.set_follows_rules_if(false, |c| bounds.on_spatial_boundary(c.position));

    if let Some(seed_path) = &search.seed_file {
        let rle = std::fs::read_to_string(seed_path)
            .with_context(|| format!("failed to read seed file: {}", seed_path.display()))?;
        let seed = KnownPattern::from_rle(&rle, 0)
            .with_context(|| format!("failed to parse seed file: {}", seed_path.display()))?;
        for y in bounds.y.lo..=bounds.y.hi {
            for x in bounds.x.lo..=bounds.x.hi {
                let p = Point::new(x, y, 0);
                if !bounds.on_spatial_boundary(p) {
                    pattern.set_known(p, seed.state(p));
                }
            }
        }
    }

    Ok(pattern)
}

/// A clause requiring at least one generation-0 variable to be alive.
/// Returns nothing when generation 0 carries no variables.
fn at_least_one_alive_clause(problem: &SearchProblem) -> Option<BigClause> {
    let bounds = problem.bounds();
    let mut codes = BTreeSet::new();
    for y in bounds.y.lo..=bounds.y.hi {
        for x in bounds.x.lo..=bounds.x.hi {
            let code = problem.cell_value(Point::new(x, y, bounds.t.lo));
            if code >= 2 {
                codes.insert(code);
            }
        }
    }
    if codes.is_empty() {
        None
    } else {
        Some(codes.into_iter().map(|code| code - 1).collect())
    }
}
