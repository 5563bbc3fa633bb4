//! Linear constant propagation: an IDE client over `ProgramGraph`
//!
//! Values of the form `a·x + b` are tracked symbolically in edge functions
//! and only evaluated in Phase II.

pub mod domain;
pub mod problem;

pub use domain::{LcaFact, LcaValue, LinearEdgeFunction};
pub use problem::LinearConstantProblem;
