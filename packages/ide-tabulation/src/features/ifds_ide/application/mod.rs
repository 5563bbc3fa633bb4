//! Application layer: one-call entry points

pub mod solve;

pub use solve::{solve_ide, solve_ide_with_config, solve_ifds, SolveOutcome};
