//! DIMACS CNF emission and solver output parsing

use super::clause::{BigClause, ClauseList};
use anyhow::{bail, Result};
use std::collections::HashSet;
use std::fmt::Write as _;

/// Solver verdict parsed from a DIMACS `s` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverVerdict {
    Satisfiable(Model),
    Unsatisfiable,
}

/// A satisfying assignment: the set of literals the solver reported true.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    literals: HashSet<i32>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_true_variables(vars: impl IntoIterator<Item = i32>) -> Self {
        Self {
            literals: vars.into_iter().collect(),
        }
    }

    /// Whether SAT variable `var` (positive index) is assigned true.
    pub fn is_true(&self, var: i32) -> bool {
        self.literals.contains(&var)
    }

    pub fn insert(&mut self, literal: i32) {
        self.literals.insert(literal);
    }
}

/// Render the CNF instance in DIMACS format: `p cnf N M` header, then one
/// zero-terminated clause per line. `extra_clauses` are caller-supplied side
/// constraints appended verbatim.
pub fn dimacs_string(
    clauses: &ClauseList,
    extra_clauses: &[BigClause],
    num_variables: usize,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "p cnf {} {}",
        num_variables,
        clauses.len() + extra_clauses.len()
    );
    for clause in clauses {
        for lit in clause.literals() {
            let _ = write!(out, "{} ", lit);
        }
        out.push_str("0\n");
    }
    for clause in extra_clauses {
        for &lit in clause {
            let _ = write!(out, "{} ", lit);
        }
        out.push_str("0\n");
    }
    out
}

/// Parse a SAT solver's stdout: a status line starting with `s` announcing
/// SATISFIABLE or UNSATISFIABLE, and for satisfiable instances `v` lines of
/// signed literals terminated by 0. Output with no recognizable status line
/// is a subprocess failure; the raw prefix is attached for diagnosis.
pub fn parse_solver_output(output: &str) -> Result<SolverVerdict> {
    let mut status: Option<bool> = None;
    let mut model = Model::new();

    for line in output.lines() {
        if let Some(rest) = line.strip_prefix('s') {
            if rest.contains("UNSATISFIABLE") {
                status = Some(false);
            } else if rest.contains("SATISFIABLE") {
                status = Some(true);
            }
        } else if let Some(rest) = line.strip_prefix('v') {
            for token in rest.split_whitespace() {
                let lit: i32 = match token.parse() {
                    Ok(lit) => lit,
                    Err(_) => bail!(
                        "solver produced a malformed literal {:?} in: {}",
                        token,
                        truncated(output)
                    ),
                };
                if lit != 0 {
                    model.insert(lit);
                }
            }
        }
    }

    match status {
        Some(true) => Ok(SolverVerdict::Satisfiable(model)),
        Some(false) => Ok(SolverVerdict::Unsatisfiable),
        None => bail!("solver produced no status line: {}", truncated(output)),
    }
}

fn truncated(output: &str) -> &str {
    let end = output
        .char_indices()
        .nth(200)
        .map(|(i, _)| i)
        .unwrap_or(output.len());
    &output[..end]
}
