//! Utility data structures

pub mod table;

pub use table::Table;
