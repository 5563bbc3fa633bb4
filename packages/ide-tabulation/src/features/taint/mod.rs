//! Taint tracking: an IFDS client over `ProgramGraph`

pub mod problem;

pub use problem::{leaks, Leak, TaintFact, TaintProblem};
