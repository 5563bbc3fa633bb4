/*
 * Edge Functions
 *
 * First-class value transformers `L -> L` attached to exploded-supergraph
 * edges. The solver composes them along paths and joins them where paths
 * meet.
 *
 * Key Features:
 * - `EdgeFunction<L>` trait for client-defined functions
 * - `EdgeFn<L>`: shared handle (cheap clone, pointer-or-behaviour equality)
 * - Built-ins: EdgeIdentity, AllTop, AllBottom, ConstantEdgeFunction
 * - Generic fallbacks: ComposedEdgeFunction, join-or-AllBottom
 *
 * Composition order:
 *   f.compose_with(g)  =  x ↦ g(f(x))     ("apply f, then g")
 *
 * Simplification rules (applied before any client specialisation):
 *   id ; g        = g               f ; id       = f
 *   f ; const(c)  = const(c)        ⊤ ; g        = ⊤
 *   const(c) ; g  = const(g(c))
 *
 *   join(f, f)    = f               join(f, ⊥)   = ⊥
 *   join(f, ⊤)    = f               join(c1, c2) = const(c1 ⊔ c2)
 *   otherwise: client specialisation, else ⊥ (sound and terminating)
 *
 * References:
 * - Sagiv, Reps, Horwitz (1996): "Precise Interprocedural Dataflow Analysis with Applications to Constant Propagation"
 */

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use super::lattice::IdeValue;

/// Built-in classification of an edge function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeFunctionKind {
    Identity,
    AllTop,
    AllBottom,
    Constant,
    Composed,
    Custom,
}

/// Edge function: transforms values along exploded-supergraph edges
///
/// Properties expected from implementors:
/// - Distributive: f(join(a, b)) = join(f(a), f(b))
/// - Deterministic and side-effect free
///
/// Implementors only need `compute_target`, `equal_to` and `as_any`.
/// `compose_with`/`join_with` may return a closed-form result; returning
/// `None` falls back to the generic behaviour described at the top of this
/// module.
pub trait EdgeFunction<L: IdeValue>: fmt::Debug {
    /// Apply the function to a value
    fn compute_target(&self, source: &L) -> L;

    /// Specialised `self ; second`
    fn compose_with(&self, _second: &EdgeFn<L>) -> Option<EdgeFn<L>> {
        None
    }

    /// Specialised `join(self, other)`
    fn join_with(&self, _other: &EdgeFn<L>) -> Option<EdgeFn<L>> {
        None
    }

    /// Behavioural equality
    fn equal_to(&self, other: &dyn EdgeFunction<L>) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn kind(&self) -> EdgeFunctionKind {
        EdgeFunctionKind::Custom
    }
}

/// `equal_to` for edge functions whose structural equality is behavioural
pub fn downcast_equal<T, L>(this: &T, other: &dyn EdgeFunction<L>) -> bool
where
    T: PartialEq + 'static,
    L: IdeValue,
{
    other
        .as_any()
        .downcast_ref::<T>()
        .map_or(false, |other| other == this)
}

// ═══════════════════════════════════════════════════════════════════════════
// Built-in edge functions
// ═══════════════════════════════════════════════════════════════════════════

/// Identity edge function: f(v) = v
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeIdentity;

impl<L: IdeValue> EdgeFunction<L> for EdgeIdentity {
    fn compute_target(&self, source: &L) -> L {
        source.clone()
    }

    fn equal_to(&self, other: &dyn EdgeFunction<L>) -> bool {
        other.kind() == EdgeFunctionKind::Identity
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> EdgeFunctionKind {
        EdgeFunctionKind::Identity
    }
}

/// All-Top edge function: f(v) = ⊤
///
/// Marks an edge that is not (yet) reached. Absent jump functions read as
/// this function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllTop;

impl<L: IdeValue> EdgeFunction<L> for AllTop {
    fn compute_target(&self, _source: &L) -> L {
        L::top()
    }

    fn equal_to(&self, other: &dyn EdgeFunction<L>) -> bool {
        other.kind() == EdgeFunctionKind::AllTop
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> EdgeFunctionKind {
        EdgeFunctionKind::AllTop
    }
}

/// All-Bottom edge function: f(v) = ⊥
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllBottom;

impl<L: IdeValue> EdgeFunction<L> for AllBottom {
    fn compute_target(&self, _source: &L) -> L {
        L::bottom()
    }

    fn equal_to(&self, other: &dyn EdgeFunction<L>) -> bool {
        other.kind() == EdgeFunctionKind::AllBottom
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> EdgeFunctionKind {
        EdgeFunctionKind::AllBottom
    }
}

/// Constant edge function: f(v) = c
///
/// Build through `EdgeFn::constant`, which maps ⊤/⊥ constants to
/// `AllTop`/`AllBottom`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantEdgeFunction<L: IdeValue> {
    pub value: L,
}

impl<L: IdeValue> EdgeFunction<L> for ConstantEdgeFunction<L> {
    fn compute_target(&self, _source: &L) -> L {
        self.value.clone()
    }

    fn equal_to(&self, other: &dyn EdgeFunction<L>) -> bool {
        downcast_equal(self, other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> EdgeFunctionKind {
        EdgeFunctionKind::Constant
    }
}

/// Generic composition: x ↦ second(first(x))
#[derive(Debug, Clone)]
pub struct ComposedEdgeFunction<L: IdeValue> {
    pub first: EdgeFn<L>,
    pub second: EdgeFn<L>,
}

impl<L: IdeValue> EdgeFunction<L> for ComposedEdgeFunction<L> {
    fn compute_target(&self, source: &L) -> L {
        self.second
            .compute_target(&self.first.compute_target(source))
    }

    fn compose_with(&self, second: &EdgeFn<L>) -> Option<EdgeFn<L>> {
        // Re-associate so the client gets a chance to fold the tail
        let tail = self.second.compose_with(second);
        if tail.kind() == EdgeFunctionKind::Composed {
            return None;
        }
        Some(self.first.compose_with(&tail))
    }

    fn equal_to(&self, other: &dyn EdgeFunction<L>) -> bool {
        other
            .as_any()
            .downcast_ref::<ComposedEdgeFunction<L>>()
            .map_or(false, |o| o.first == self.first && o.second == self.second)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> EdgeFunctionKind {
        EdgeFunctionKind::Composed
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Shared handle
// ═══════════════════════════════════════════════════════════════════════════

/// Shared, immutable edge function handle
///
/// Cloning shares the underlying object, so handles handed out by the
/// flow/edge-function cache are pointer-identical across queries.
#[derive(Clone)]
pub struct EdgeFn<L: IdeValue>(Rc<dyn EdgeFunction<L>>);

impl<L: IdeValue> EdgeFn<L> {
    pub fn new<F: EdgeFunction<L> + 'static>(function: F) -> Self {
        EdgeFn(Rc::new(function))
    }

    pub fn from_rc(function: Rc<dyn EdgeFunction<L>>) -> Self {
        EdgeFn(function)
    }

    pub fn identity() -> Self {
        Self::new(EdgeIdentity)
    }

    pub fn all_top() -> Self {
        Self::new(AllTop)
    }

    pub fn all_bottom() -> Self {
        Self::new(AllBottom)
    }

    /// Constant function, normalised to `AllTop`/`AllBottom` at the lattice ends
    pub fn constant(value: L) -> Self {
        if value.is_top() {
            Self::all_top()
        } else if value.is_bottom() {
            Self::all_bottom()
        } else {
            Self::new(ConstantEdgeFunction { value })
        }
    }

    pub fn compute_target(&self, source: &L) -> L {
        self.0.compute_target(source)
    }

    pub fn kind(&self) -> EdgeFunctionKind {
        self.0.kind()
    }

    pub fn is_identity(&self) -> bool {
        self.kind() == EdgeFunctionKind::Identity
    }

    pub fn is_all_top(&self) -> bool {
        self.kind() == EdgeFunctionKind::AllTop
    }

    pub fn is_all_bottom(&self) -> bool {
        self.kind() == EdgeFunctionKind::AllBottom
    }

    /// Value of a function that ignores its input
    pub fn constant_value(&self) -> Option<L> {
        match self.kind() {
            EdgeFunctionKind::AllTop => Some(L::top()),
            EdgeFunctionKind::AllBottom => Some(L::bottom()),
            EdgeFunctionKind::Constant => Some(self.compute_target(&L::top())),
            _ => None,
        }
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    pub fn inner(&self) -> &dyn EdgeFunction<L> {
        &*self.0
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    /// `self ; second`: apply `self`, then `second`
    pub fn compose_with(&self, second: &EdgeFn<L>) -> EdgeFn<L> {
        if self.is_identity() {
            return second.clone();
        }
        if second.is_identity() {
            return self.clone();
        }
        if second.constant_value().is_some() {
            return second.clone();
        }
        if self.is_all_top() {
            return self.clone();
        }
        if let Some(c) = self.constant_value() {
            return EdgeFn::constant(second.compute_target(&c));
        }
        if let Some(composed) = self.0.compose_with(second) {
            return composed;
        }
        EdgeFn::new(ComposedEdgeFunction {
            first: self.clone(),
            second: second.clone(),
        })
    }

    /// Least upper bound of two functions
    pub fn join_with(&self, other: &EdgeFn<L>) -> EdgeFn<L> {
        if self == other {
            return self.clone();
        }
        if self.is_all_bottom() || other.is_all_bottom() {
            return EdgeFn::all_bottom();
        }
        if self.is_all_top() {
            return other.clone();
        }
        if other.is_all_top() {
            return self.clone();
        }
        if let (Some(a), Some(b)) = (self.constant_value(), other.constant_value()) {
            return EdgeFn::constant(a.join(&b));
        }
        if let Some(joined) = self.0.join_with(other) {
            return joined;
        }
        if let Some(joined) = other.0.join_with(self) {
            return joined;
        }
        EdgeFn::all_bottom()
    }
}

impl<L: IdeValue> PartialEq for EdgeFn<L> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0.equal_to(&*other.0)
    }
}

impl<L: IdeValue> Eq for EdgeFn<L> {}

impl<L: IdeValue> fmt::Debug for EdgeFn<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl<L: IdeValue> fmt::Display for EdgeFn<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            EdgeFunctionKind::Identity => f.write_str("EdgeIdentity"),
            EdgeFunctionKind::AllTop => f.write_str("AllTop"),
            EdgeFunctionKind::AllBottom => f.write_str("AllBottom"),
            _ => write!(f, "{:?}", self.0),
        }
    }
}
