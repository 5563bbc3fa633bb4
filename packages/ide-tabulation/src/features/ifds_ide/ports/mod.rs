//! Ports: what the solver consumes from its collaborators

pub mod icfg;
pub mod problem;

pub use icfg::Icfg;
pub use problem::{IdeProblem, IfdsProblem};
