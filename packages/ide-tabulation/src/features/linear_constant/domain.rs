/*
 * Linear Constant Domain
 *
 * Facts:  Λ (Zero) or a local variable
 * Values: ⊤ (not reached) < Const(c) < ⊥ (not a constant)
 * Edges:  x ↦ a·x + b, closed under composition
 *
 * Example:
 *   y = x * 2      edge Var(x) → Var(y):  x ↦ 2·x + 0
 *   z = y + 1      edge Var(y) → Var(z):  x ↦ 1·x + 1
 *   composed       Var(x) → Var(z):       x ↦ 2·x + 1
 */

use std::any::Any;
use std::fmt;

use crate::features::ifds_ide::domain::{downcast_equal, EdgeFn, EdgeFunction, IdeValue};
use crate::shared::models::{BinOp, Operand};

/// Dataflow fact of the linear constant analysis
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LcaFact {
    Zero,
    Var(String),
}

impl LcaFact {
    pub fn var(name: impl Into<String>) -> Self {
        LcaFact::Var(name.into())
    }

    pub fn is_var(&self, name: &str) -> bool {
        matches!(self, LcaFact::Var(v) if v == name)
    }
}

impl fmt::Display for LcaFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LcaFact::Zero => f.write_str("Λ"),
            LcaFact::Var(name) => f.write_str(name),
        }
    }
}

/// Constant lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LcaValue {
    Top,
    Const(i64),
    Bottom,
}

impl LcaValue {
    pub fn as_const(&self) -> Option<i64> {
        match self {
            LcaValue::Const(c) => Some(*c),
            _ => None,
        }
    }
}

impl IdeValue for LcaValue {
    fn top() -> Self {
        LcaValue::Top
    }

    fn bottom() -> Self {
        LcaValue::Bottom
    }

    fn join(&self, other: &Self) -> Self {
        match (self, other) {
            (LcaValue::Top, v) | (v, LcaValue::Top) => *v,
            (LcaValue::Const(a), LcaValue::Const(b)) if a == b => *self,
            _ => LcaValue::Bottom,
        }
    }
}

impl fmt::Display for LcaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LcaValue::Top => f.write_str("TOP"),
            LcaValue::Const(c) => write!(f, "{}", c),
            LcaValue::Bottom => f.write_str("BOTTOM"),
        }
    }
}

/// x ↦ a·x + b
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinearEdgeFunction {
    pub a: i64,
    pub b: i64,
}

impl LinearEdgeFunction {
    /// Normalised handle: identity for (1, 0), a constant for a = 0
    pub fn edge(a: i64, b: i64) -> EdgeFn<LcaValue> {
        match (a, b) {
            (1, 0) => EdgeFn::identity(),
            (0, b) => EdgeFn::constant(LcaValue::Const(b)),
            (a, b) => EdgeFn::new(LinearEdgeFunction { a, b }),
        }
    }

    /// Edge function of `op` applied to a variable and a literal
    ///
    /// `var_on_left` tells whether the variable is the left operand.
    /// `None` if the coefficients overflow.
    pub fn for_binary(op: BinOp, var_on_left: bool, literal: i64) -> Option<EdgeFn<LcaValue>> {
        let (a, b) = match (op, var_on_left) {
            (BinOp::Add, _) => (1, literal),
            (BinOp::Sub, true) => (1, literal.checked_neg()?),
            (BinOp::Sub, false) => (-1, literal),
            (BinOp::Mul, _) => (literal, 0),
        };
        Some(Self::edge(a, b))
    }

    /// Edge function of `lhs op rhs` with exactly one variable operand
    pub fn for_operands(op: BinOp, lhs: &Operand, rhs: &Operand) -> Option<EdgeFn<LcaValue>> {
        match (lhs, rhs) {
            (Operand::Var(_), Operand::Const(c)) => Self::for_binary(op, true, *c),
            (Operand::Const(c), Operand::Var(_)) => Self::for_binary(op, false, *c),
            _ => None,
        }
    }

    fn apply(&self, x: i64) -> Option<i64> {
        self.a.checked_mul(x)?.checked_add(self.b)
    }
}

impl EdgeFunction<LcaValue> for LinearEdgeFunction {
    fn compute_target(&self, source: &LcaValue) -> LcaValue {
        match source {
            LcaValue::Const(x) => self.apply(*x).map_or(LcaValue::Bottom, LcaValue::Const),
            other => *other,
        }
    }

    fn compose_with(&self, second: &EdgeFn<LcaValue>) -> Option<EdgeFn<LcaValue>> {
        let g = second.downcast_ref::<LinearEdgeFunction>()?;
        // g(f(x)) = g.a·(a·x + b) + g.b
        let a = g.a.checked_mul(self.a)?;
        let b = g.a.checked_mul(self.b)?.checked_add(g.b)?;
        Some(Self::edge(a, b))
    }

    fn equal_to(&self, other: &dyn EdgeFunction<LcaValue>) -> bool {
        downcast_equal(self, other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
