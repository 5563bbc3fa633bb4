/*
 * Flow/Edge-Function Cache
 *
 * Memoizes every flow-function and edge-function query the solver issues
 * against the problem, keyed per kind:
 *
 *   normal flow        (curr, succ)
 *   call flow          (call site, callee)
 *   return flow        (call site, callee, exit, return site)
 *   call-to-return     (call site, return site)
 *   summary flow       (call site, callee)
 *   normal edge        (curr, d1, succ, d2)
 *   call edge          (call site, d1, callee, d2)
 *   return edge        (call site, callee, exit, d1, return site, d2)
 *   call-to-return edge(call site, d1, return site, d2)
 *   summary edge       (call site, d1, return site, d2)
 *
 * A cached function is returned as a clone of the same `Rc`, so repeated
 * queries yield pointer-identical objects.
 */

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::hash::Hash;
use std::rc::Rc;

use crate::features::ifds_ide::domain::{EdgeFn, FlowFunctionPtr, ZeroedFlowFunction};
use crate::features::ifds_ide::ports::{Icfg, IdeProblem};

/// Construction/hit counter of one query kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindCounter {
    /// Queries forwarded to the problem
    pub constructions: usize,

    /// Queries answered from the cache
    pub hits: usize,
}

/// Cache statistics per query kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStatistics {
    pub normal_flow: KindCounter,
    pub call_flow: KindCounter,
    pub return_flow: KindCounter,
    pub call_to_return_flow: KindCounter,
    pub summary_flow: KindCounter,
    pub normal_edge: KindCounter,
    pub call_edge: KindCounter,
    pub return_edge: KindCounter,
    pub call_to_return_edge: KindCounter,
    pub summary_edge: KindCounter,
}

impl CacheStatistics {
    fn all(&self) -> [&KindCounter; 10] {
        [
            &self.normal_flow,
            &self.call_flow,
            &self.return_flow,
            &self.call_to_return_flow,
            &self.summary_flow,
            &self.normal_edge,
            &self.call_edge,
            &self.return_edge,
            &self.call_to_return_edge,
            &self.summary_edge,
        ]
    }

    /// Total queries forwarded to the problem
    pub fn total_constructions(&self) -> usize {
        self.all().iter().map(|c| c.constructions).sum()
    }

    /// Total queries answered from the cache
    pub fn total_hits(&self) -> usize {
        self.all().iter().map(|c| c.hits).sum()
    }
}

type N<I> = <I as Icfg>::Node;
type F<I> = <I as Icfg>::Function;
type D<I, P> = <P as IdeProblem<I>>::Fact;
type L<I, P> = <P as IdeProblem<I>>::Value;

fn lookup_or_insert<K, V>(
    map: &mut FxHashMap<K, V>,
    counter: &mut KindCounter,
    key: K,
    make: impl FnOnce() -> V,
) -> V
where
    K: Eq + Hash,
    V: Clone,
{
    if let Some(value) = map.get(&key) {
        counter.hits += 1;
        return value.clone();
    }
    counter.constructions += 1;
    let value = make();
    map.insert(key, value.clone());
    value
}

fn zeroed<Fact: crate::features::ifds_ide::domain::DataflowFact>(
    auto_add_zero: bool,
    zero: &Fact,
    function: FlowFunctionPtr<Fact>,
) -> FlowFunctionPtr<Fact> {
    if auto_add_zero {
        Rc::new(ZeroedFlowFunction::new(function, zero.clone()))
    } else {
        function
    }
}

/// Per-solver cache of flow and edge functions
pub struct FlowEdgeFunctionCache<I: Icfg, P: IdeProblem<I>> {
    zero: D<I, P>,
    auto_add_zero: bool,

    normal_ff: FxHashMap<(N<I>, N<I>), FlowFunctionPtr<D<I, P>>>,
    call_ff: FxHashMap<(N<I>, F<I>), FlowFunctionPtr<D<I, P>>>,
    ret_ff: FxHashMap<(N<I>, F<I>, N<I>, N<I>), FlowFunctionPtr<D<I, P>>>,
    call_to_ret_ff: FxHashMap<(N<I>, N<I>), FlowFunctionPtr<D<I, P>>>,
    summary_ff: FxHashMap<(N<I>, F<I>), Option<FlowFunctionPtr<D<I, P>>>>,

    normal_ef: FxHashMap<(N<I>, D<I, P>, N<I>, D<I, P>), EdgeFn<L<I, P>>>,
    call_ef: FxHashMap<(N<I>, D<I, P>, F<I>, D<I, P>), EdgeFn<L<I, P>>>,
    ret_ef: FxHashMap<(N<I>, F<I>, N<I>, D<I, P>, N<I>, D<I, P>), EdgeFn<L<I, P>>>,
    call_to_ret_ef: FxHashMap<(N<I>, D<I, P>, N<I>, D<I, P>), EdgeFn<L<I, P>>>,
    summary_ef: FxHashMap<(N<I>, D<I, P>, N<I>, D<I, P>), EdgeFn<L<I, P>>>,

    stats: CacheStatistics,
}

impl<I: Icfg, P: IdeProblem<I>> FlowEdgeFunctionCache<I, P> {
    /// Create an empty cache; `auto_add_zero` wraps every flow function
    /// except summaries in `ZeroedFlowFunction`
    pub fn new(zero: D<I, P>, auto_add_zero: bool) -> Self {
        Self {
            zero,
            auto_add_zero,
            normal_ff: FxHashMap::default(),
            call_ff: FxHashMap::default(),
            ret_ff: FxHashMap::default(),
            call_to_ret_ff: FxHashMap::default(),
            summary_ff: FxHashMap::default(),
            normal_ef: FxHashMap::default(),
            call_ef: FxHashMap::default(),
            ret_ef: FxHashMap::default(),
            call_to_ret_ef: FxHashMap::default(),
            summary_ef: FxHashMap::default(),
            stats: CacheStatistics::default(),
        }
    }

    pub fn statistics(&self) -> &CacheStatistics {
        &self.stats
    }

    // ========================================
    // Flow functions
    // ========================================

    pub fn normal_flow_function(
        &mut self,
        problem: &P,
        curr: &N<I>,
        succ: &N<I>,
    ) -> FlowFunctionPtr<D<I, P>> {
        let (auto, zero) = (self.auto_add_zero, &self.zero);
        lookup_or_insert(
            &mut self.normal_ff,
            &mut self.stats.normal_flow,
            (curr.clone(), succ.clone()),
            || zeroed(auto, zero, problem.normal_flow_function(curr, succ)),
        )
    }

    pub fn call_flow_function(
        &mut self,
        problem: &P,
        call_site: &N<I>,
        callee: &F<I>,
    ) -> FlowFunctionPtr<D<I, P>> {
        let (auto, zero) = (self.auto_add_zero, &self.zero);
        lookup_or_insert(
            &mut self.call_ff,
            &mut self.stats.call_flow,
            (call_site.clone(), callee.clone()),
            || zeroed(auto, zero, problem.call_flow_function(call_site, callee)),
        )
    }

    pub fn ret_flow_function(
        &mut self,
        problem: &P,
        call_site: &N<I>,
        callee: &F<I>,
        exit: &N<I>,
        ret_site: &N<I>,
    ) -> FlowFunctionPtr<D<I, P>> {
        let (auto, zero) = (self.auto_add_zero, &self.zero);
        lookup_or_insert(
            &mut self.ret_ff,
            &mut self.stats.return_flow,
            (
                call_site.clone(),
                callee.clone(),
                exit.clone(),
                ret_site.clone(),
            ),
            || {
                zeroed(
                    auto,
                    zero,
                    problem.ret_flow_function(call_site, callee, exit, ret_site),
                )
            },
        )
    }

    pub fn call_to_ret_flow_function(
        &mut self,
        problem: &P,
        call_site: &N<I>,
        ret_site: &N<I>,
        callees: &[F<I>],
    ) -> FlowFunctionPtr<D<I, P>> {
        let (auto, zero) = (self.auto_add_zero, &self.zero);
        lookup_or_insert(
            &mut self.call_to_ret_ff,
            &mut self.stats.call_to_return_flow,
            (call_site.clone(), ret_site.clone()),
            || {
                zeroed(
                    auto,
                    zero,
                    problem.call_to_ret_flow_function(call_site, ret_site, callees),
                )
            },
        )
    }

    pub fn summary_flow_function(
        &mut self,
        problem: &P,
        call_site: &N<I>,
        callee: &F<I>,
    ) -> Option<FlowFunctionPtr<D<I, P>>> {
        lookup_or_insert(
            &mut self.summary_ff,
            &mut self.stats.summary_flow,
            (call_site.clone(), callee.clone()),
            || problem.summary_flow_function(call_site, callee),
        )
    }

    // ========================================
    // Edge functions
    // ========================================

    pub fn normal_edge_function(
        &mut self,
        problem: &P,
        curr: &N<I>,
        curr_fact: &D<I, P>,
        succ: &N<I>,
        succ_fact: &D<I, P>,
    ) -> EdgeFn<L<I, P>> {
        lookup_or_insert(
            &mut self.normal_ef,
            &mut self.stats.normal_edge,
            (
                curr.clone(),
                curr_fact.clone(),
                succ.clone(),
                succ_fact.clone(),
            ),
            || problem.normal_edge_function(curr, curr_fact, succ, succ_fact),
        )
    }

    pub fn call_edge_function(
        &mut self,
        problem: &P,
        call_site: &N<I>,
        src_fact: &D<I, P>,
        callee: &F<I>,
        dest_fact: &D<I, P>,
    ) -> EdgeFn<L<I, P>> {
        lookup_or_insert(
            &mut self.call_ef,
            &mut self.stats.call_edge,
            (
                call_site.clone(),
                src_fact.clone(),
                callee.clone(),
                dest_fact.clone(),
            ),
            || problem.call_edge_function(call_site, src_fact, callee, dest_fact),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn return_edge_function(
        &mut self,
        problem: &P,
        call_site: &N<I>,
        callee: &F<I>,
        exit: &N<I>,
        exit_fact: &D<I, P>,
        ret_site: &N<I>,
        ret_fact: &D<I, P>,
    ) -> EdgeFn<L<I, P>> {
        lookup_or_insert(
            &mut self.ret_ef,
            &mut self.stats.return_edge,
            (
                call_site.clone(),
                callee.clone(),
                exit.clone(),
                exit_fact.clone(),
                ret_site.clone(),
                ret_fact.clone(),
            ),
            || {
                problem.return_edge_function(call_site, callee, exit, exit_fact, ret_site, ret_fact)
            },
        )
    }

    pub fn call_to_ret_edge_function(
        &mut self,
        problem: &P,
        call_site: &N<I>,
        call_fact: &D<I, P>,
        ret_site: &N<I>,
        ret_fact: &D<I, P>,
        callees: &[F<I>],
    ) -> EdgeFn<L<I, P>> {
        lookup_or_insert(
            &mut self.call_to_ret_ef,
            &mut self.stats.call_to_return_edge,
            (
                call_site.clone(),
                call_fact.clone(),
                ret_site.clone(),
                ret_fact.clone(),
            ),
            || problem.call_to_ret_edge_function(call_site, call_fact, ret_site, ret_fact, callees),
        )
    }

    pub fn summary_edge_function(
        &mut self,
        problem: &P,
        call_site: &N<I>,
        call_fact: &D<I, P>,
        ret_site: &N<I>,
        ret_fact: &D<I, P>,
    ) -> EdgeFn<L<I, P>> {
        lookup_or_insert(
            &mut self.summary_ef,
            &mut self.stats.summary_edge,
            (
                call_site.clone(),
                call_fact.clone(),
                ret_site.clone(),
                ret_fact.clone(),
            ),
            || problem.summary_edge_function(call_site, call_fact, ret_site, ret_fact),
        )
    }
}
