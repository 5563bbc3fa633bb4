// IFDS/IDE tabulation solver
//
// Hexagonal Architecture:
// - domain: lattice values, edge/flow functions, seeds, path edges
// - ports: Icfg and problem traits
// - infrastructure: solver, tables, results, in-memory program graph
// - application: solve_ide / solve_ifds

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

// Re-export application layer (primary interface)
pub use application::{solve_ide, solve_ide_with_config, solve_ifds, SolveOutcome};

pub use domain::*;
pub use infrastructure::{
    CacheStatistics, IdeSolver, IfdsToIdeProblem, JumpFunctions, OwningSolverResults,
    ProgramGraph, SolverResults, SolverState, SolverStatistics,
};
pub use ports::{Icfg, IdeProblem, IfdsProblem};
