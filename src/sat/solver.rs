//! External SAT solver invocation over DIMACS
//!
//! The solver runs as a subprocess: the CNF is handed over through a
//! temporary file (avoiding pipe buffer deadlock on large instances) and
//! the verdict is read back from the solver's stdout. The temporary file is
//! removed on every exit path, and the subprocess is always awaited before
//! returning.

use super::clause::{BigClause, ClauseList};
use super::dimacs::{dimacs_string, parse_solver_output, SolverVerdict};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::NamedTempFile;

/// How to invoke the external solver.
#[derive(Debug, Clone)]
pub struct SolverInvocation {
    /// Executable name, resolved through PATH when no explicit path is set.
    pub name: String,
    /// Explicit path to the solver binary (overrides `name`).
    pub path: Option<PathBuf>,
    /// Solve time limit passed to the solver as `--time=<seconds>`.
    pub timeout_seconds: Option<u64>,
}

impl Default for SolverInvocation {
    fn default() -> Self {
        Self {
            name: "kissat".to_string(),
            path: None,
            timeout_seconds: None,
        }
    }
}

impl SolverInvocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            timeout_seconds: None,
        }
    }

    fn program(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(&self.name))
    }
}

/// Run the solver on an already-rendered DIMACS instance.
pub fn solve_dimacs(dimacs: &str, invocation: &SolverInvocation) -> Result<SolverVerdict> {
    let mut temp = NamedTempFile::new().context("failed to create temporary DIMACS file")?;
    temp.write_all(dimacs.as_bytes())
        .context("failed to write temporary DIMACS file")?;
    temp.flush()
        .context("failed to flush temporary DIMACS file")?;

    let program = invocation.program();
    let mut command = Command::new(&program);
    command.arg("--quiet");
    if let Some(seconds) = invocation.timeout_seconds {
        command.arg(format!("--time={}", seconds));
    }
    command.arg(temp.path());

    let output = command
        .output()
        .with_context(|| format!("failed to launch solver '{}'", program.display()))?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    parse_solver_output(&text)
}

/// Render the clauses to DIMACS and run the solver.
pub fn solve_clauses(
    clauses: &ClauseList,
    extra_clauses: &[BigClause],
    num_variables: usize,
    invocation: &SolverInvocation,
) -> Result<SolverVerdict> {
    let dimacs = dimacs_string(clauses, extra_clauses, num_variables);
    solve_dimacs(&dimacs, invocation)
}
