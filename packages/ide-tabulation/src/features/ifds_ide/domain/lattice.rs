/*
 * Value Lattice
 *
 * Join semi-lattice of IDE values.
 *
 * Polarity:
 * - Top (⊤): least information, "not reached yet"; neutral for join
 * - Bottom (⊥): most conservative catch-all; absorbing for join
 *
 *   join(x, ⊤) = x
 *   join(x, ⊥) = ⊥
 *
 * References:
 * - Sagiv, Reps, Horwitz (1996): "Precise Interprocedural Dataflow Analysis with Applications to Constant Propagation"
 */

use std::fmt::Debug;
use std::hash::Hash;

/// Value in the IDE lattice
///
/// Example:
///   - Constant propagation: ⊤ (unreached) < Const(c) < ⊥ (not constant)
///   - IFDS reachability: `BinaryDomain`
pub trait IdeValue: Clone + Eq + Hash + Debug + 'static {
    /// Top element (⊤), the neutral element of `join`
    fn top() -> Self;

    /// Bottom element (⊥), the absorbing element of `join`
    fn bottom() -> Self;

    /// Join operator: combine values from multiple paths
    ///
    /// Properties:
    /// - Commutative: join(a, b) = join(b, a)
    /// - Associative: join(join(a, b), c) = join(a, join(b, c))
    /// - Idempotent: join(a, a) = a
    /// - Top is identity: join(a, Top) = a
    /// - Bottom is zero: join(a, Bottom) = Bottom
    ///
    /// # Example
    /// ```text
    /// Const(5).join(Const(5)) = Const(5)
    /// Const(5).join(Const(7)) = Bottom
    /// Const(5).join(Top)      = Const(5)
    /// ```
    fn join(&self, other: &Self) -> Self;

    /// Check if this is Top
    fn is_top(&self) -> bool {
        *self == Self::top()
    }

    /// Check if this is Bottom
    fn is_bottom(&self) -> bool {
        *self == Self::bottom()
    }
}

/// Two-point lattice used to run IFDS problems on the IDE solver
///
/// A fact that holds carries `Bottom`; `Top` means "does not hold".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BinaryDomain {
    Bottom,
    Top,
}

impl IdeValue for BinaryDomain {
    fn top() -> Self {
        BinaryDomain::Top
    }

    fn bottom() -> Self {
        BinaryDomain::Bottom
    }

    fn join(&self, other: &Self) -> Self {
        if *self == BinaryDomain::Top && *other == BinaryDomain::Top {
            BinaryDomain::Top
        } else {
            BinaryDomain::Bottom
        }
    }
}

impl std::fmt::Display for BinaryDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryDomain::Bottom => f.write_str("BOTTOM"),
            BinaryDomain::Top => f.write_str("TOP"),
        }
    }
}
