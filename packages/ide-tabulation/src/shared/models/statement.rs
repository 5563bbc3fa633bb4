//! Statement IR
//!
//! A deliberately small three-address IR carried as node payload by
//! `ProgramGraph`. The reference analyses (linear constant propagation,
//! taint) interpret it; the solver never looks at it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operand: literal or local variable
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    Const(i64),
    Var(String),
}

impl Operand {
    pub fn var(name: impl Into<String>) -> Self {
        Operand::Var(name.into())
    }

    /// Variable name, if this operand is a variable
    pub fn as_var(&self) -> Option<&str> {
        match self {
            Operand::Var(name) => Some(name),
            Operand::Const(_) => None,
        }
    }

    /// Literal value, if this operand is a constant
    pub fn as_const(&self) -> Option<i64> {
        match self {
            Operand::Const(c) => Some(*c),
            Operand::Var(_) => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Const(c) => write!(f, "{}", c),
            Operand::Var(name) => f.write_str(name),
        }
    }
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
}

impl BinOp {
    /// Evaluate on two literals; `None` on overflow
    pub fn eval(&self, lhs: i64, rhs: i64) -> Option<i64> {
        match self {
            BinOp::Add => lhs.checked_add(rhs),
            BinOp::Sub => lhs.checked_sub(rhs),
            BinOp::Mul => lhs.checked_mul(rhs),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
        }
    }
}

/// Right-hand side of an assignment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expr {
    Operand(Operand),
    Binary {
        op: BinOp,
        lhs: Operand,
        rhs: Operand,
    },
}

impl Expr {
    pub fn constant(c: i64) -> Self {
        Expr::Operand(Operand::Const(c))
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Operand(Operand::var(name))
    }

    pub fn binary(op: BinOp, lhs: Operand, rhs: Operand) -> Self {
        Expr::Binary { op, lhs, rhs }
    }

    /// Variables read by this expression, in operand order
    pub fn vars(&self) -> Vec<&str> {
        match self {
            Expr::Operand(op) => op.as_var().into_iter().collect(),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.as_var().into_iter().chain(rhs.as_var()).collect()
            }
        }
    }

    pub fn uses(&self, var: &str) -> bool {
        self.vars().contains(&var)
    }

    /// Fold the expression if it reads no variable
    pub fn eval_const(&self) -> Option<i64> {
        match self {
            Expr::Operand(op) => op.as_const(),
            Expr::Binary { op, lhs, rhs } => op.eval(lhs.as_const()?, rhs.as_const()?),
        }
    }

    pub fn is_constant(&self) -> bool {
        self.vars().is_empty()
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Operand(op) => write!(f, "{}", op),
            Expr::Binary { op, lhs, rhs } => write!(f, "{} {} {}", lhs, op.symbol(), rhs),
        }
    }
}

/// One statement (one ICFG node)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Statement {
    Nop,

    /// `target = value`
    Assign { target: String, value: Expr },

    /// `result = callee(args...)`
    Call {
        callee: String,
        args: Vec<Operand>,
        result: Option<String>,
    },

    /// `return value`
    Return(Option<Operand>),

    /// `target = source()`: introduces an untrusted value
    Source { target: String },

    /// `sink(arg)`
    Sink { arg: Operand },
}

impl Statement {
    pub fn assign(target: impl Into<String>, value: Expr) -> Self {
        Statement::Assign {
            target: target.into(),
            value,
        }
    }

    pub fn call(callee: impl Into<String>, args: Vec<Operand>, result: Option<&str>) -> Self {
        Statement::Call {
            callee: callee.into(),
            args,
            result: result.map(str::to_string),
        }
    }

    pub fn ret(value: Option<Operand>) -> Self {
        Statement::Return(value)
    }

    pub fn source(target: impl Into<String>) -> Self {
        Statement::Source {
            target: target.into(),
        }
    }

    pub fn sink(arg: Operand) -> Self {
        Statement::Sink { arg }
    }

    /// Variable written by this statement
    pub fn defined_var(&self) -> Option<&str> {
        match self {
            Statement::Assign { target, .. } | Statement::Source { target } => Some(target),
            Statement::Call { result, .. } => result.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Nop => f.write_str("nop"),
            Statement::Assign { target, value } => write!(f, "{} = {}", target, value),
            Statement::Call {
                callee,
                args,
                result,
            } => {
                let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                match result {
                    Some(r) => write!(f, "{} = {}({})", r, callee, args.join(", ")),
                    None => write!(f, "{}({})", callee, args.join(", ")),
                }
            }
            Statement::Return(Some(op)) => write!(f, "return {}", op),
            Statement::Return(None) => f.write_str("return"),
            Statement::Source { target } => write!(f, "{} = source()", target),
            Statement::Sink { arg } => write!(f, "sink({})", arg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expr_vars_and_folding() {
        let e = Expr::binary(BinOp::Add, Operand::var("x"), Operand::Const(1));
        assert_eq!(e.vars(), vec!["x"]);
        assert!(e.uses("x"));
        assert!(!e.is_constant());
        assert_eq!(e.eval_const(), None);

        let c = Expr::binary(BinOp::Mul, Operand::Const(6), Operand::Const(7));
        assert_eq!(c.eval_const(), Some(42));
    }

    #[test]
    fn test_overflow_does_not_fold() {
        let e = Expr::binary(BinOp::Mul, Operand::Const(i64::MAX), Operand::Const(2));
        assert_eq!(e.eval_const(), None);
    }

    #[test]
    fn test_statement_display() {
        let s = Statement::call("foo", vec![Operand::Const(3)], Some("r"));
        assert_eq!(s.to_string(), "r = foo(3)");
        assert_eq!(s.defined_var(), Some("r"));

        let s = Statement::assign("y", Expr::binary(BinOp::Add, Operand::var("x"), Operand::Const(1)));
        assert_eq!(s.to_string(), "y = x + 1");
    }
}
