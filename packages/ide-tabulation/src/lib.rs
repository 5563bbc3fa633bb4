/*
 * IDE Tabulation - Interprocedural Dataflow Solver
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Common models (Statement IR, Table)
 * - features/    : ifds_ide (engine), linear_constant (IDE client), taint (IFDS client)
 * - config/      : Solver flags and scheduling strategy
 * - errors       : Crate error type
 *
 * Algorithm:
 * - Phase I: path edges and jump functions, end summaries reused per context
 * - Phase II: values propagated from seeds, then evaluated at every node
 * - Step-wise API with timeout and asynchronous cancellation
 */

// Crate-level lint configuration
#![allow(clippy::too_many_arguments)] // Edge-function queries mirror the exploded supergraph
#![allow(clippy::type_complexity)] // Solver tables are nested generic maps
#![allow(clippy::should_implement_trait)] // next() is the solver step, not Iterator
#![allow(clippy::unnecessary_map_or)] // map_or style for compatibility
#![allow(clippy::new_without_default)] // Default impl not always needed

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and utilities
pub mod shared;

/// Feature modules (engine and reference clients)
pub mod features;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{SolverConfig, SolverStrategy};
pub use errors::{DataflowError, Result};
pub use features::ifds_ide::{
    solve_ide, solve_ide_with_config, solve_ifds, EdgeFn, EdgeFunction, Icfg, IdeProblem,
    IdeSolver, IdeValue, IfdsProblem, InitialSeeds, OwningSolverResults, ProgramGraph,
    SolverResults, SolverStatistics,
};
