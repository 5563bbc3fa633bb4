/*
 * Flow Functions
 *
 * D → 2^D: maps one dataflow fact to the set of facts it produces across an
 * edge of the interprocedural CFG.
 *
 * Key Features:
 * - `FlowFunction<D>` trait, shared as `FlowFunctionPtr<D>` (Rc)
 * - Gen/kill/transfer/union combinators for writing problems tersely
 * - `ZeroedFlowFunction`: keeps the zero fact (Λ) alive
 *
 * Example (taint propagation):
 *   Statement: x = y
 *   Input fact: Tainted(y)
 *   Output facts: {Tainted(x), Tainted(y)}
 */

use rustc_hash::FxHashSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

/// Dataflow fact (abstract domain element)
pub trait DataflowFact: Clone + Eq + Hash + Debug + 'static {}

impl<T: Clone + Eq + Hash + Debug + 'static> DataflowFact for T {}

/// Flow function: D → 2^D
pub trait FlowFunction<D> {
    /// Compute output facts given input fact
    fn compute_targets(&self, source: &D) -> FxHashSet<D>;
}

/// Shared flow function handle
pub type FlowFunctionPtr<D> = Rc<dyn FlowFunction<D>>;

fn singleton<D: DataflowFact>(fact: &D) -> FxHashSet<D> {
    let mut set = FxHashSet::default();
    set.insert(fact.clone());
    set
}

/// Identity flow function: f(d) = {d}
pub struct IdentityFlow;

impl<D: DataflowFact> FlowFunction<D> for IdentityFlow {
    fn compute_targets(&self, source: &D) -> FxHashSet<D> {
        singleton(source)
    }
}

/// Kill-all flow function: f(d) = ∅
pub struct KillAllFlow;

impl<D: DataflowFact> FlowFunction<D> for KillAllFlow {
    fn compute_targets(&self, _source: &D) -> FxHashSet<D> {
        FxHashSet::default()
    }
}

/// Gen flow function: f(from) = {from} ∪ facts, f(d) = {d}
pub struct GenFlow<D> {
    pub facts: Vec<D>,
    pub from: D,
    /// Drop every other fact
    pub kill_others: bool,
}

impl<D: DataflowFact> FlowFunction<D> for GenFlow<D> {
    fn compute_targets(&self, source: &D) -> FxHashSet<D> {
        if *source == self.from {
            let mut set = singleton(source);
            set.extend(self.facts.iter().cloned());
            set
        } else if self.kill_others {
            FxHashSet::default()
        } else {
            singleton(source)
        }
    }
}

/// Kill flow function: f(d) = ∅ if d is killed, else {d}
pub struct KillFlow<D> {
    pub facts: Vec<D>,
}

impl<D: DataflowFact> FlowFunction<D> for KillFlow<D> {
    fn compute_targets(&self, source: &D) -> FxHashSet<D> {
        if self.facts.contains(source) {
            FxHashSet::default()
        } else {
            singleton(source)
        }
    }
}

/// Transfer flow function: `to := from`
///
/// f(from) = {from, to}, f(to) = ∅, f(d) = {d}
pub struct TransferFlow<D> {
    pub to: D,
    pub from: D,
}

impl<D: DataflowFact> FlowFunction<D> for TransferFlow<D> {
    fn compute_targets(&self, source: &D) -> FxHashSet<D> {
        if *source == self.from {
            let mut set = singleton(source);
            set.insert(self.to.clone());
            set
        } else if *source == self.to {
            FxHashSet::default()
        } else {
            singleton(source)
        }
    }
}

/// Closure-backed flow function
pub struct LambdaFlow<F> {
    function: F,
}

impl<D, F> FlowFunction<D> for LambdaFlow<F>
where
    F: Fn(&D) -> FxHashSet<D>,
{
    fn compute_targets(&self, source: &D) -> FxHashSet<D> {
        (self.function)(source)
    }
}

/// Union of several flow functions
pub struct UnionFlows<D> {
    pub functions: Vec<FlowFunctionPtr<D>>,
}

impl<D: DataflowFact> FlowFunction<D> for UnionFlows<D> {
    fn compute_targets(&self, source: &D) -> FxHashSet<D> {
        let mut set = FxHashSet::default();
        for function in &self.functions {
            set.extend(function.compute_targets(source));
        }
        set
    }
}

/// Wrapper that makes Λ always map to Λ
///
/// Installed by the flow/edge-function cache when `auto_add_zero` is on, so
/// problems never have to remember to propagate the zero fact.
pub struct ZeroedFlowFunction<D> {
    inner: FlowFunctionPtr<D>,
    zero: D,
}

impl<D: DataflowFact> ZeroedFlowFunction<D> {
    pub fn new(inner: FlowFunctionPtr<D>, zero: D) -> Self {
        Self { inner, zero }
    }
}

impl<D: DataflowFact> FlowFunction<D> for ZeroedFlowFunction<D> {
    fn compute_targets(&self, source: &D) -> FxHashSet<D> {
        let mut set = self.inner.compute_targets(source);
        if *source == self.zero {
            set.insert(self.zero.clone());
        }
        set
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Constructors
// ═══════════════════════════════════════════════════════════════════════════

pub fn identity_flow<D: DataflowFact>() -> FlowFunctionPtr<D> {
    Rc::new(IdentityFlow)
}

pub fn kill_all_flow<D: DataflowFact>() -> FlowFunctionPtr<D> {
    Rc::new(KillAllFlow)
}

/// Generate `fact` whenever `from` holds
pub fn generate_flow<D: DataflowFact>(fact: D, from: D) -> FlowFunctionPtr<D> {
    generate_many_flows(vec![fact], from)
}

/// Generate `fact` from every source satisfying `predicate`
pub fn generate_flow_if<D, P>(fact: D, predicate: P) -> FlowFunctionPtr<D>
where
    D: DataflowFact,
    P: Fn(&D) -> bool + 'static,
{
    lambda_flow(move |source: &D| {
        let mut set = singleton(source);
        if predicate(source) {
            set.insert(fact.clone());
        }
        set
    })
}

pub fn generate_many_flows<D: DataflowFact>(facts: Vec<D>, from: D) -> FlowFunctionPtr<D> {
    Rc::new(GenFlow {
        facts,
        from,
        kill_others: false,
    })
}

/// Generate `fact` from `from` and drop everything else
pub fn generate_flow_and_kill_all_others<D: DataflowFact>(fact: D, from: D) -> FlowFunctionPtr<D> {
    Rc::new(GenFlow {
        facts: vec![fact],
        from,
        kill_others: true,
    })
}

pub fn kill_flow<D: DataflowFact>(fact: D) -> FlowFunctionPtr<D> {
    kill_many_flows(vec![fact])
}

pub fn kill_flow_if<D, P>(predicate: P) -> FlowFunctionPtr<D>
where
    D: DataflowFact,
    P: Fn(&D) -> bool + 'static,
{
    lambda_flow(move |source: &D| {
        if predicate(source) {
            FxHashSet::default()
        } else {
            singleton(source)
        }
    })
}

pub fn kill_many_flows<D: DataflowFact>(facts: Vec<D>) -> FlowFunctionPtr<D> {
    Rc::new(KillFlow { facts })
}

pub fn transfer_flow<D: DataflowFact>(to: D, from: D) -> FlowFunctionPtr<D> {
    Rc::new(TransferFlow { to, from })
}

pub fn lambda_flow<D, F>(function: F) -> FlowFunctionPtr<D>
where
    D: DataflowFact,
    F: Fn(&D) -> FxHashSet<D> + 'static,
{
    Rc::new(LambdaFlow { function })
}

pub fn union_flows<D: DataflowFact>(functions: Vec<FlowFunctionPtr<D>>) -> FlowFunctionPtr<D> {
    Rc::new(UnionFlows { functions })
}
