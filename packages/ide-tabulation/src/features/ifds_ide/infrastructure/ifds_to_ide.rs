/*
 * IFDS → IDE Adapter
 *
 * Runs an IFDS problem on the IDE solver over the two-point lattice
 * `BinaryDomain`:
 * - Every edge function is identity
 * - Seeds carry `Bottom` ("holds")
 * - A fact holds at a node iff it has an entry in the value table
 */

use crate::config::SolverConfig;
use crate::features::ifds_ide::domain::{BinaryDomain, EdgeFn, FlowFunctionPtr, InitialSeeds};
use crate::features::ifds_ide::ports::{Icfg, IdeProblem, IfdsProblem};

/// IDE view of an IFDS problem
#[derive(Debug, Clone)]
pub struct IfdsToIdeProblem<P> {
    inner: P,
}

impl<P> IfdsToIdeProblem<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<I, P> IdeProblem<I> for IfdsToIdeProblem<P>
where
    I: Icfg,
    P: IfdsProblem<I>,
{
    type Fact = P::Fact;
    type Value = BinaryDomain;

    fn zero_value(&self) -> Self::Fact {
        self.inner.zero_value()
    }

    fn is_zero_value(&self, fact: &Self::Fact) -> bool {
        self.inner.is_zero_value(fact)
    }

    fn initial_seeds(&self) -> InitialSeeds<I::Node, Self::Fact, BinaryDomain> {
        self.inner.initial_seeds()
    }

    fn normal_flow_function(&self, curr: &I::Node, succ: &I::Node) -> FlowFunctionPtr<Self::Fact> {
        self.inner.normal_flow_function(curr, succ)
    }

    fn call_flow_function(
        &self,
        call_site: &I::Node,
        callee: &I::Function,
    ) -> FlowFunctionPtr<Self::Fact> {
        self.inner.call_flow_function(call_site, callee)
    }

    fn ret_flow_function(
        &self,
        call_site: &I::Node,
        callee: &I::Function,
        exit: &I::Node,
        ret_site: &I::Node,
    ) -> FlowFunctionPtr<Self::Fact> {
        self.inner.ret_flow_function(call_site, callee, exit, ret_site)
    }

    fn call_to_ret_flow_function(
        &self,
        call_site: &I::Node,
        ret_site: &I::Node,
        callees: &[I::Function],
    ) -> FlowFunctionPtr<Self::Fact> {
        self.inner.call_to_ret_flow_function(call_site, ret_site, callees)
    }

    fn summary_flow_function(
        &self,
        call_site: &I::Node,
        callee: &I::Function,
    ) -> Option<FlowFunctionPtr<Self::Fact>> {
        self.inner.summary_flow_function(call_site, callee)
    }

    fn normal_edge_function(
        &self,
        _curr: &I::Node,
        _curr_fact: &Self::Fact,
        _succ: &I::Node,
        _succ_fact: &Self::Fact,
    ) -> EdgeFn<BinaryDomain> {
        EdgeFn::identity()
    }

    fn call_edge_function(
        &self,
        _call_site: &I::Node,
        _src_fact: &Self::Fact,
        _callee: &I::Function,
        _dest_fact: &Self::Fact,
    ) -> EdgeFn<BinaryDomain> {
        EdgeFn::identity()
    }

    fn return_edge_function(
        &self,
        _call_site: &I::Node,
        _callee: &I::Function,
        _exit: &I::Node,
        _exit_fact: &Self::Fact,
        _ret_site: &I::Node,
        _ret_fact: &Self::Fact,
    ) -> EdgeFn<BinaryDomain> {
        EdgeFn::identity()
    }

    fn call_to_ret_edge_function(
        &self,
        _call_site: &I::Node,
        _call_fact: &Self::Fact,
        _ret_site: &I::Node,
        _ret_fact: &Self::Fact,
        _callees: &[I::Function],
    ) -> EdgeFn<BinaryDomain> {
        EdgeFn::identity()
    }

    fn solver_config(&self) -> SolverConfig {
        self.inner.solver_config()
    }

    fn restore_context_on_returned_fact(
        &self,
        call_site: &I::Node,
        call_fact: &Self::Fact,
        returned_fact: Self::Fact,
    ) -> Self::Fact {
        self.inner
            .restore_context_on_returned_fact(call_site, call_fact, returned_fact)
    }

    fn apply_unbalanced_ret_flow_function_side_effects(
        &self,
        callee: &I::Function,
        exit: &I::Node,
        exit_fact: &Self::Fact,
    ) {
        self.inner
            .apply_unbalanced_ret_flow_function_side_effects(callee, exit, exit_fact)
    }

    fn fact_to_string(&self, fact: &Self::Fact) -> String {
        self.inner.fact_to_string(fact)
    }
}
