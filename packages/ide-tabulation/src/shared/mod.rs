//! Shared module - Common types and utilities
//!
//! Types used by more than one feature. Nothing here depends on the solver.

pub mod models;
pub mod utils;

// Re-exports for convenience
pub use models::*;
pub use utils::Table;
