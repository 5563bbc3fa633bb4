//! Shared models

pub mod statement;

pub use statement::{BinOp, Expr, Operand, Statement};
