//! SAT encoding: clauses, problem composition, DIMACS, solver invocation

pub mod clause;
pub mod dimacs;
pub mod problem;
pub mod solver;

pub use clause::{dedup_clauses, BigClause, Clause, ClauseBuilder, ClauseList};
pub use dimacs::{dimacs_string, parse_solver_output, Model, SolverVerdict};
pub use problem::SearchProblem;
pub use solver::{solve_clauses, solve_dimacs, SolverInvocation};
