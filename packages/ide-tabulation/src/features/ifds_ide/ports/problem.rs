/*
 * Tabulation Problem Ports
 *
 * Contracts a concrete analysis implements to be solved by the tabulation
 * solver.
 *
 * IFDS (`IfdsProblem`):
 * - Seeds, zero fact
 * - Flow functions: normal, call, return, call-to-return, optional summary
 *
 * IDE (`IdeProblem`) additionally:
 * - Edge functions for every flow-function kind
 * - Value lattice (`top_element`, `bottom_element`, `join`)
 *
 * All queries take `&self`. A problem may keep private caches behind
 * interior mutability; the solver issues each distinct query at most once
 * (see `FlowEdgeFunctionCache`) and only from one thread.
 *
 * References:
 * - Reps, Horwitz, Sagiv (1995): "Precise Interprocedural Dataflow Analysis via Graph Reachability"
 * - Sagiv, Reps, Horwitz (1996): "Precise Interprocedural Dataflow Analysis with Applications to Constant Propagation"
 */

use super::icfg::Icfg;
use crate::config::SolverConfig;
use crate::features::ifds_ide::domain::{
    BinaryDomain, DataflowFact, EdgeFn, FlowFunctionPtr, IdeValue, InitialSeeds,
};

/// Client description of an IDE problem
pub trait IdeProblem<I: Icfg> {
    /// Dataflow fact
    type Fact: DataflowFact;

    /// Lattice value attached to each fact
    type Value: IdeValue;

    /// The zero fact Λ
    fn zero_value(&self) -> Self::Fact;

    fn is_zero_value(&self, fact: &Self::Fact) -> bool {
        *fact == self.zero_value()
    }

    /// Initial (node, fact, value) triples
    fn initial_seeds(&self) -> InitialSeeds<I::Node, Self::Fact, Self::Value>;

    // ========================================
    // Flow functions
    // ========================================

    /// Intra-procedural flow from `curr` to its successor `succ`
    fn normal_flow_function(&self, curr: &I::Node, succ: &I::Node) -> FlowFunctionPtr<Self::Fact>;

    /// Maps caller facts at `call_site` into `callee`
    fn call_flow_function(
        &self,
        call_site: &I::Node,
        callee: &I::Function,
    ) -> FlowFunctionPtr<Self::Fact>;

    /// Maps callee facts at `exit` back to the caller at `ret_site`
    fn ret_flow_function(
        &self,
        call_site: &I::Node,
        callee: &I::Function,
        exit: &I::Node,
        ret_site: &I::Node,
    ) -> FlowFunctionPtr<Self::Fact>;

    /// Facts bypassing the callees of `call_site`
    fn call_to_ret_flow_function(
        &self,
        call_site: &I::Node,
        ret_site: &I::Node,
        callees: &[I::Function],
    ) -> FlowFunctionPtr<Self::Fact>;

    /// Pre-built summary replacing the analysis of `callee` at `call_site`
    fn summary_flow_function(
        &self,
        _call_site: &I::Node,
        _callee: &I::Function,
    ) -> Option<FlowFunctionPtr<Self::Fact>> {
        None
    }

    // ========================================
    // Edge functions
    // ========================================

    fn normal_edge_function(
        &self,
        curr: &I::Node,
        curr_fact: &Self::Fact,
        succ: &I::Node,
        succ_fact: &Self::Fact,
    ) -> EdgeFn<Self::Value>;

    fn call_edge_function(
        &self,
        call_site: &I::Node,
        src_fact: &Self::Fact,
        callee: &I::Function,
        dest_fact: &Self::Fact,
    ) -> EdgeFn<Self::Value>;

    fn return_edge_function(
        &self,
        call_site: &I::Node,
        callee: &I::Function,
        exit: &I::Node,
        exit_fact: &Self::Fact,
        ret_site: &I::Node,
        ret_fact: &Self::Fact,
    ) -> EdgeFn<Self::Value>;

    fn call_to_ret_edge_function(
        &self,
        call_site: &I::Node,
        call_fact: &Self::Fact,
        ret_site: &I::Node,
        ret_fact: &Self::Fact,
        callees: &[I::Function],
    ) -> EdgeFn<Self::Value>;

    /// Edge function paired with `summary_flow_function`
    fn summary_edge_function(
        &self,
        _call_site: &I::Node,
        _call_fact: &Self::Fact,
        _ret_site: &I::Node,
        _ret_fact: &Self::Fact,
    ) -> EdgeFn<Self::Value> {
        EdgeFn::identity()
    }

    // ========================================
    // Lattice
    // ========================================

    fn top_element(&self) -> Self::Value {
        <Self::Value as IdeValue>::top()
    }

    fn bottom_element(&self) -> Self::Value {
        <Self::Value as IdeValue>::bottom()
    }

    fn join(&self, lhs: &Self::Value, rhs: &Self::Value) -> Self::Value {
        lhs.join(rhs)
    }

    fn all_top_function(&self) -> EdgeFn<Self::Value> {
        EdgeFn::all_top()
    }

    // ========================================
    // Solver hooks
    // ========================================

    /// Configuration flags read by the solver at construction
    fn solver_config(&self) -> SolverConfig {
        SolverConfig::default()
    }

    /// Re-attach caller context to a fact returned at `call_site`
    ///
    /// `call_fact` is the caller-side fact that entered the callee.
    fn restore_context_on_returned_fact(
        &self,
        _call_site: &I::Node,
        _call_fact: &Self::Fact,
        returned_fact: Self::Fact,
    ) -> Self::Fact {
        returned_fact
    }

    /// Called when an unbalanced return leaves a function that has no callers
    fn apply_unbalanced_ret_flow_function_side_effects(
        &self,
        _callee: &I::Function,
        _exit: &I::Node,
        _exit_fact: &Self::Fact,
    ) {
    }

    fn fact_to_string(&self, fact: &Self::Fact) -> String {
        format!("{:?}", fact)
    }

    fn value_to_string(&self, value: &Self::Value) -> String {
        format!("{:?}", value)
    }
}

/// Client description of an IFDS problem
///
/// Solved by the IDE solver through `IfdsToIdeProblem`.
pub trait IfdsProblem<I: Icfg> {
    type Fact: DataflowFact;

    fn zero_value(&self) -> Self::Fact;

    fn is_zero_value(&self, fact: &Self::Fact) -> bool {
        *fact == self.zero_value()
    }

    /// Initial facts; build with `InitialSeeds::from_ifds`
    fn initial_seeds(&self) -> InitialSeeds<I::Node, Self::Fact, BinaryDomain>;

    fn normal_flow_function(&self, curr: &I::Node, succ: &I::Node) -> FlowFunctionPtr<Self::Fact>;

    fn call_flow_function(
        &self,
        call_site: &I::Node,
        callee: &I::Function,
    ) -> FlowFunctionPtr<Self::Fact>;

    fn ret_flow_function(
        &self,
        call_site: &I::Node,
        callee: &I::Function,
        exit: &I::Node,
        ret_site: &I::Node,
    ) -> FlowFunctionPtr<Self::Fact>;

    fn call_to_ret_flow_function(
        &self,
        call_site: &I::Node,
        ret_site: &I::Node,
        callees: &[I::Function],
    ) -> FlowFunctionPtr<Self::Fact>;

    fn summary_flow_function(
        &self,
        _call_site: &I::Node,
        _callee: &I::Function,
    ) -> Option<FlowFunctionPtr<Self::Fact>> {
        None
    }

    fn solver_config(&self) -> SolverConfig {
        SolverConfig::default()
    }

    fn restore_context_on_returned_fact(
        &self,
        _call_site: &I::Node,
        _call_fact: &Self::Fact,
        returned_fact: Self::Fact,
    ) -> Self::Fact {
        returned_fact
    }

    fn apply_unbalanced_ret_flow_function_side_effects(
        &self,
        _callee: &I::Function,
        _exit: &I::Node,
        _exit_fact: &Self::Fact,
    ) {
    }

    fn fact_to_string(&self, fact: &Self::Fact) -> String {
        format!("{:?}", fact)
    }
}
