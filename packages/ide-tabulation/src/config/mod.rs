//! Solver configuration
//!
//! - `solver_config`: flags and scheduling strategy
//! - `validation`: `Validatable` trait
//! - `io`: versioned YAML load/save
//! - `error`: `ConfigError`

pub mod error;
pub mod io;
pub mod solver_config;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use solver_config::{SolverConfig, SolverStrategy};
pub use validation::Validatable;
