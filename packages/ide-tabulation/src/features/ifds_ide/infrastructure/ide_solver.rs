/*
 * IDE Tabulation Solver - Phase I
 *
 * Builds the jump functions of the exploded supergraph with summary-based
 * call/return matching.
 *
 * Key Features:
 * - Worklist of path edges (d1, n, d2), popped LIFO
 * - Join-before-enqueue: a path edge is scheduled only when its jump
 *   function changes
 * - End-summary and incoming tables: a callee context (sp, d) is analyzed
 *   once and its summaries are applied at every call site
 * - Special summary flow functions that skip the callee body
 * - Unbalanced returns past seeds (opt-in)
 * - Two scheduling strategies (`SolverStrategy`) with the same fixpoint
 *
 * Algorithm Overview (one worklist step):
 * 1. Pop (d1, n, d2) with its edge function f
 * 2. Dispatch on n:
 *    - call site → process_call
 *    - exit      → process_exit (registers (sp, d1) ↦ (n, d2, f))
 *    - has succs → process_normal_flow
 * 3. Every new edge goes through update_with_new_edges:
 *    f' = jump(d1, m, d3) ⊔ g; store and enqueue iff f' changed
 *
 * Phase II lives in `value_computation`, the step API in `solver_api`.
 *
 * References:
 * - Reps, Horwitz, Sagiv (1995): "Precise Interprocedural Dataflow Analysis via Graph Reachability"
 * - Sagiv, Reps, Horwitz (1996): "Precise Interprocedural Dataflow Analysis with Applications to Constant Propagation"
 * - Naeem, Lhoták, Rodriguez (2010): "Practical Extensions to the IFDS Algorithm"
 */

use rustc_hash::FxHashSet;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use super::flow_edge_function_cache::FlowEdgeFunctionCache;
use super::ifds_to_ide::IfdsToIdeProblem;
use super::jump_functions::JumpFunctions;
use super::statistics::SolverStatistics;
use crate::config::{SolverConfig, SolverStrategy};
use crate::features::ifds_ide::domain::{
    EdgeFn, ExplodedEdge, ExplodedEdgeKind, ExplodedNode, ExplodedSupergraph, InitialSeeds,
    PathEdge,
};
use crate::features::ifds_ide::ports::{Icfg, IdeProblem, IfdsProblem};
use crate::shared::utils::Table;

pub(super) type N<I> = <I as Icfg>::Node;
pub(super) type D<I, P> = <P as IdeProblem<I>>::Fact;
pub(super) type L<I, P> = <P as IdeProblem<I>>::Value;

/// Lifecycle of a solver instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    /// Constructed, seeds not yet submitted
    Fresh,

    /// Seeds submitted; stepping (possibly suspended)
    Initialized,

    /// Phase II done; results may be read or moved out
    Finalized,
}

/// IDE tabulation solver
///
/// Owns the problem and all tables; borrows the ICFG.
///
/// # Example
/// ```text
/// let mut solver = IdeSolver::new(problem, &icfg);
/// let results = solver.solve();
/// let value = results.result_at(&node, &fact);
/// ```
pub struct IdeSolver<'a, P, I>
where
    I: Icfg,
    P: IdeProblem<I>,
{
    pub(super) problem: P,
    pub(super) icfg: &'a I,
    pub(super) config: SolverConfig,
    pub(super) zero: D<I, P>,

    pub(super) cache: FlowEdgeFunctionCache<I, P>,
    pub(super) jump_fns: JumpFunctions<N<I>, D<I, P>, L<I, P>>,

    /// (sp, d1) → (exit, d2) → summary edge function
    pub(super) end_summary: Table<(N<I>, D<I, P>), (N<I>, D<I, P>), EdgeFn<L<I, P>>>,

    /// (sp, d3) → call site → caller-side facts
    pub(super) incoming: Table<(N<I>, D<I, P>), N<I>, FxHashSet<D<I, P>>>,

    /// Pending path edges, popped from the back
    pub(super) worklist: Vec<(PathEdge<N<I>, D<I, P>>, EdgeFn<L<I, P>>)>,

    pub(super) seeds: InitialSeeds<N<I>, D<I, P>, L<I, P>>,
    pub(super) unbalanced_ret_sites: BTreeSet<N<I>>,

    /// (n, d) → value; absent reads as top
    pub(super) values: Table<N<I>, D<I, P>, L<I, P>>,
    pub(super) value_worklist: Vec<(N<I>, D<I, P>)>,

    pub(super) esg: Option<ExplodedSupergraph<N<I>, D<I, P>>>,
    pub(super) stats: SolverStatistics,
    pub(super) state: SolverState,
    pub(super) phase_one_start: Option<Instant>,
}

impl<'a, P, I> IdeSolver<'a, P, I>
where
    I: Icfg,
    P: IdeProblem<I>,
{
    /// Create a solver configured by `problem.solver_config()`
    pub fn new(problem: P, icfg: &'a I) -> Self {
        let config = problem.solver_config();
        Self::with_config(problem, icfg, config)
    }

    /// Create a solver with an explicit configuration
    pub fn with_config(problem: P, icfg: &'a I, config: SolverConfig) -> Self {
        let zero = problem.zero_value();
        let seeds = problem.initial_seeds();
        let cache = FlowEdgeFunctionCache::new(zero.clone(), config.auto_add_zero);
        let esg = config.record_edges.then(ExplodedSupergraph::new);

        Self {
            problem,
            icfg,
            config,
            zero,
            cache,
            jump_fns: JumpFunctions::new(),
            end_summary: Table::new(),
            incoming: Table::new(),
            worklist: Vec::new(),
            seeds,
            unbalanced_ret_sites: BTreeSet::new(),
            values: Table::new(),
            value_worklist: Vec::new(),
            esg,
            stats: SolverStatistics::default(),
            state: SolverState::Fresh,
            phase_one_start: None,
        }
    }

    // ========================================
    // Accessors
    // ========================================

    pub fn problem(&self) -> &P {
        &self.problem
    }

    pub fn icfg(&self) -> &'a I {
        self.icfg
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn state(&self) -> SolverState {
        self.state
    }

    pub fn jump_functions(&self) -> &JumpFunctions<N<I>, D<I, P>, L<I, P>> {
        &self.jump_fns
    }

    /// End summaries (exit, d2, f) of the callee context (sp, d1)
    pub fn end_summaries(&self, sp: &N<I>, d1: &D<I, P>) -> Vec<(N<I>, D<I, P>, EdgeFn<L<I, P>>)> {
        self.end_summary_entries(sp, d1)
    }

    /// Call sites (with caller-side facts) that entered the callee context (sp, d)
    pub fn incoming(&self, sp: &N<I>, d: &D<I, P>) -> BTreeMap<N<I>, FxHashSet<D<I, P>>> {
        self.incoming
            .row(&(sp.clone(), d.clone()))
            .map(|row| {
                row.iter()
                    .map(|(c, facts)| (c.clone(), facts.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Return sites reached by unbalanced returns
    pub fn unbalanced_return_sites(&self) -> &BTreeSet<N<I>> {
        &self.unbalanced_ret_sites
    }

    /// Recorded exploded supergraph (only with `record_edges`)
    pub fn exploded_supergraph(&self) -> Option<&ExplodedSupergraph<N<I>, D<I, P>>> {
        self.esg.as_ref()
    }

    /// Statistics including a snapshot of the cache counters
    pub fn statistics(&self) -> SolverStatistics {
        let mut stats = self.stats.clone();
        stats.cache = self.cache.statistics().clone();
        stats
    }

    /// Render the recorded exploded supergraph as DOT
    pub fn esg_as_dot(&self) -> Option<String> {
        let icfg = self.icfg;
        let problem = &self.problem;
        self.esg.as_ref().map(|esg| {
            esg.to_dot(
                |n| icfg.statement_id(n),
                |d| problem.fact_to_string(d),
            )
        })
    }

    // ========================================
    // Phase I
    // ========================================

    /// Seed the worklist; Zero is added at every seed node that lacks it
    pub(super) fn submit_initial_seeds(&mut self) {
        let bottom = self.problem.bottom_element();
        self.seeds.ensure_zero(&self.zero, &bottom);

        let seeds: Vec<(N<I>, D<I, P>)> = self
            .seeds
            .iter()
            .map(|(n, d, _)| (n.clone(), d.clone()))
            .collect();
        tracing::debug!(count = seeds.len(), "submitting initial seeds");

        for (node, fact) in seeds {
            self.update_with_new_edges(fact.clone(), node, fact, EdgeFn::identity());
        }
    }

    /// Current jump function of a path edge; AllTop when absent
    pub(super) fn jump_function(&self, edge: &PathEdge<N<I>, D<I, P>>) -> EdgeFn<L<I, P>> {
        self.jump_fns
            .function(&edge.source_fact, &edge.target_node, &edge.target_fact)
            .cloned()
            .unwrap_or_else(|| self.problem.all_top_function())
    }

    /// Join `function` into the jump function of (d1, target, d2)
    ///
    /// Returns the joined function if the stored value changed.
    fn update_jump_function(
        &mut self,
        d1: &D<I, P>,
        target: &N<I>,
        d2: &D<I, P>,
        function: &EdgeFn<L<I, P>>,
    ) -> Option<EdgeFn<L<I, P>>> {
        let current = self
            .jump_fns
            .function(d1, target, d2)
            .cloned()
            .unwrap_or_else(|| self.problem.all_top_function());
        let joined = current.join_with(function);
        if joined == current {
            return None;
        }
        self.jump_fns
            .add_function(d1.clone(), target.clone(), d2.clone(), joined.clone());
        Some(joined)
    }

    /// The join-and-enqueue primitive
    ///
    /// The path edge is scheduled only when its jump function changed.
    /// Under `PropagateOver` the popped edge re-reads the table; under
    /// `PropagateOnto` it carries the function joined here.
    pub(super) fn update_with_new_edges(
        &mut self,
        d1: D<I, P>,
        target: N<I>,
        d2: D<I, P>,
        function: EdgeFn<L<I, P>>,
    ) {
        let Some(joined) = self.update_jump_function(&d1, &target, &d2, &function) else {
            return;
        };
        self.stats.num_path_edges_propagated += 1;
        tracing::trace!(d1 = ?d1, n = ?target, d2 = ?d2, f = %joined, "new jump function");

        let carried = match self.config.strategy {
            SolverStrategy::PropagateOver => function,
            SolverStrategy::PropagateOnto => joined,
        };
        self.worklist.push((PathEdge::new(d1, target, d2), carried));
    }

    /// Process one path edge with its edge function
    pub(super) fn propagate(&mut self, edge: PathEdge<N<I>, D<I, P>>, function: EdgeFn<L<I, P>>) {
        self.stats.num_path_edges_processed += 1;
        tracing::trace!(
            d1 = ?edge.source_fact,
            n = ?edge.target_node,
            d2 = ?edge.target_fact,
            "process path edge"
        );

        let target = edge.target_node.clone();
        if self.icfg.is_call_site(&target) {
            self.process_call(edge, function);
            return;
        }
        if self.icfg.is_exit_inst(&target) {
            self.process_exit(edge.clone(), function.clone());
        }
        if !self.icfg.succs_of(&target).is_empty() {
            self.process_normal_flow(edge, function);
        }
    }

    /// Intra-procedural flow to every CFG successor
    fn process_normal_flow(&mut self, edge: PathEdge<N<I>, D<I, P>>, function: EdgeFn<L<I, P>>) {
        let PathEdge {
            source_fact: d1,
            target_node: n,
            target_fact: d2,
        } = edge;

        for succ in self.icfg.succs_of(&n) {
            let flow = self.cache.normal_flow_function(&self.problem, &n, &succ);
            let targets = flow.compute_targets(&d2);
            self.record_edges(&n, &d2, &succ, &targets, ExplodedEdgeKind::Normal);

            for d3 in targets {
                let g = self
                    .cache
                    .normal_edge_function(&self.problem, &n, &d2, &succ, &d3);
                let f_prime = function.compose_with(&g);
                self.update_with_new_edges(d1.clone(), succ.clone(), d3, f_prime);
            }
        }
    }

    /// Call site: enter callees, apply known summaries, then call-to-return flow
    fn process_call(&mut self, edge: PathEdge<N<I>, D<I, P>>, function: EdgeFn<L<I, P>>) {
        let PathEdge {
            source_fact: d1,
            target_node: n,
            target_fact: d2,
        } = edge;
        let return_sites = self.icfg.return_sites_of_call_at(&n);
        let callees = self.icfg.callees_of_call_at(&n);

        for callee in &callees {
            if let Some(summary) = self.cache.summary_flow_function(&self.problem, &n, callee) {
                tracing::debug!(call_site = ?n, callee = ?callee, "applying special summary");
                for ret_site in &return_sites {
                    let targets = summary.compute_targets(&d2);
                    self.record_edges(&n, &d2, ret_site, &targets, ExplodedEdgeKind::Summary);

                    for d3 in targets {
                        let summary_fn = self
                            .cache
                            .summary_edge_function(&self.problem, &n, &d2, ret_site, &d3);
                        self.update_with_new_edges(
                            d1.clone(),
                            ret_site.clone(),
                            d3,
                            function.compose_with(&summary_fn),
                        );
                    }
                }
                continue;
            }

            let call_flow = self.cache.call_flow_function(&self.problem, &n, callee);
            let entry_facts = call_flow.compute_targets(&d2);

            // No start points: declaration only, nothing to enter
            let start_points = self.icfg.start_points_of(callee);
            if start_points.is_empty() {
                tracing::debug!(
                    callee = %self.icfg.function_name(callee),
                    "callee has no body"
                );
            }

            for sp in &start_points {
                self.record_edges(&n, &d2, sp, &entry_facts, ExplodedEdgeKind::Call);

                for d3 in &entry_facts {
                    // Self-loop drives the analysis of the callee context
                    self.update_with_new_edges(d3.clone(), sp.clone(), d3.clone(), EdgeFn::identity());
                    self.add_incoming(sp, d3, &n, &d2);

                    let summaries = self.end_summary_entries(sp, d3);
                    if !summaries.is_empty() {
                        self.stats.num_summary_reuses += 1;
                    }

                    for (exit, d4, callee_summary) in summaries {
                        for ret_site in &return_sites {
                            let ret_flow = self
                                .cache
                                .ret_flow_function(&self.problem, &n, callee, &exit, ret_site);
                            let returned = ret_flow.compute_targets(&d4);
                            self.record_edges(&exit, &d4, ret_site, &returned, ExplodedEdgeKind::Return);

                            for d5 in returned {
                                let f4 = self
                                    .cache
                                    .call_edge_function(&self.problem, &n, &d2, callee, d3);
                                let f5 = self.cache.return_edge_function(
                                    &self.problem,
                                    &n,
                                    callee,
                                    &exit,
                                    &d4,
                                    ret_site,
                                    &d5,
                                );
                                let f_prime = f4.compose_with(&callee_summary).compose_with(&f5);
                                let d5 = self.problem.restore_context_on_returned_fact(&n, &d2, d5);
                                self.update_with_new_edges(
                                    d1.clone(),
                                    ret_site.clone(),
                                    d5,
                                    function.compose_with(&f_prime),
                                );
                            }
                        }
                    }
                }
            }
        }

        for ret_site in &return_sites {
            let flow = self
                .cache
                .call_to_ret_flow_function(&self.problem, &n, ret_site, &callees);
            let targets = flow.compute_targets(&d2);
            self.record_edges(&n, &d2, ret_site, &targets, ExplodedEdgeKind::CallToReturn);

            for d3 in targets {
                let g = self.cache.call_to_ret_edge_function(
                    &self.problem,
                    &n,
                    &d2,
                    ret_site,
                    &d3,
                    &callees,
                );
                self.update_with_new_edges(d1.clone(), ret_site.clone(), d3, function.compose_with(&g));
            }
        }
    }

    /// Exit node: register the end summary and return into known callers
    fn process_exit(&mut self, edge: PathEdge<N<I>, D<I, P>>, function: EdgeFn<L<I, P>>) {
        let PathEdge {
            source_fact: d1,
            target_node: n,
            target_fact: d2,
        } = edge;
        let callee = self.icfg.function_of(&n);

        let mut callers: BTreeMap<N<I>, FxHashSet<D<I, P>>> = BTreeMap::new();
        for sp in self.icfg.start_points_of(&callee) {
            self.add_end_summary(&sp, &d1, &n, &d2, &function);
            if let Some(row) = self.incoming.row(&(sp, d1.clone())) {
                for (call_site, facts) in row {
                    callers
                        .entry(call_site.clone())
                        .or_default()
                        .extend(facts.iter().cloned());
                }
            }
        }

        for (c, caller_facts) in &callers {
            for ret_site in self.icfg.return_sites_of_call_at(c) {
                let ret_flow = self
                    .cache
                    .ret_flow_function(&self.problem, c, &callee, &n, &ret_site);
                let returned = ret_flow.compute_targets(&d2);
                self.record_edges(&n, &d2, &ret_site, &returned, ExplodedEdgeKind::Return);

                for d4 in caller_facts {
                    for d5 in &returned {
                        let f4 = self
                            .cache
                            .call_edge_function(&self.problem, c, d4, &callee, &d1);
                        let f5 = self.cache.return_edge_function(
                            &self.problem,
                            c,
                            &callee,
                            &n,
                            &d2,
                            &ret_site,
                            d5,
                        );
                        let f_prime = f4.compose_with(&function).compose_with(&f5);

                        // Fan out through the caller's jump functions into the call
                        let Some(into_call) = self.jump_fns.reverse_lookup(c, d4) else {
                            continue;
                        };
                        for (d3, f3) in into_call {
                            if f3.is_all_top() {
                                continue;
                            }
                            let d5 = self
                                .problem
                                .restore_context_on_returned_fact(c, d4, d5.clone());
                            self.update_with_new_edges(
                                d3,
                                ret_site.clone(),
                                d5,
                                f3.compose_with(&f_prime),
                            );
                        }
                    }
                }
            }
        }

        if self.config.follow_returns_past_seeds && callers.is_empty() {
            self.process_unbalanced_return(&callee, &n, &d2, &function);
        }
    }

    /// Return out of a context with no recorded caller
    ///
    /// Every static caller receives the returned facts with Zero as source.
    fn process_unbalanced_return(
        &mut self,
        callee: &I::Function,
        exit: &N<I>,
        exit_fact: &D<I, P>,
        function: &EdgeFn<L<I, P>>,
    ) {
        let static_callers = self.icfg.callers_of(callee);
        for caller in &static_callers {
            for ret_site in self.icfg.return_sites_of_call_at(caller) {
                let ret_flow = self
                    .cache
                    .ret_flow_function(&self.problem, caller, callee, exit, &ret_site);
                let returned = ret_flow.compute_targets(exit_fact);
                self.record_edges(
                    exit,
                    exit_fact,
                    &ret_site,
                    &returned,
                    ExplodedEdgeKind::UnbalancedReturn,
                );

                for d5 in returned {
                    let f5 = self.cache.return_edge_function(
                        &self.problem,
                        caller,
                        callee,
                        exit,
                        exit_fact,
                        &ret_site,
                        &d5,
                    );
                    self.stats.num_unbalanced_returns += 1;
                    tracing::debug!(ret_site = ?ret_site, fact = ?d5, "unbalanced return");
                    self.update_with_new_edges(
                        self.zero.clone(),
                        ret_site.clone(),
                        d5,
                        function.compose_with(&f5),
                    );
                    self.unbalanced_ret_sites.insert(ret_site.clone());
                }
            }
        }

        if static_callers.is_empty() {
            self.problem
                .apply_unbalanced_ret_flow_function_side_effects(callee, exit, exit_fact);
        }
    }

    // ========================================
    // Tables
    // ========================================

    /// Store (sp, d1) ↦ (exit, d2, f), joined with a previous summary
    fn add_end_summary(
        &mut self,
        sp: &N<I>,
        d1: &D<I, P>,
        exit: &N<I>,
        d2: &D<I, P>,
        function: &EdgeFn<L<I, P>>,
    ) {
        let row = (sp.clone(), d1.clone());
        let column = (exit.clone(), d2.clone());
        let summary = match self.end_summary.get(&row, &column) {
            Some(existing) => {
                let joined = existing.join_with(function);
                if joined == *existing {
                    return;
                }
                joined
            }
            None => {
                self.stats.num_end_summaries += 1;
                function.clone()
            }
        };
        self.end_summary.insert(row, column, summary);
    }

    pub(super) fn end_summary_entries(
        &self,
        sp: &N<I>,
        d1: &D<I, P>,
    ) -> Vec<(N<I>, D<I, P>, EdgeFn<L<I, P>>)> {
        self.end_summary
            .row(&(sp.clone(), d1.clone()))
            .map(|row| {
                row.iter()
                    .map(|((exit, d2), f)| (exit.clone(), d2.clone(), f.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn add_incoming(&mut self, sp: &N<I>, d3: &D<I, P>, call_site: &N<I>, d2: &D<I, P>) {
        let row = (sp.clone(), d3.clone());
        if let Some(facts) = self.incoming.get_mut(&row, call_site) {
            facts.insert(d2.clone());
            return;
        }
        let mut facts = FxHashSet::default();
        facts.insert(d2.clone());
        self.incoming.insert(row, call_site.clone(), facts);
    }

    fn record_edges(
        &mut self,
        from: &N<I>,
        from_fact: &D<I, P>,
        to: &N<I>,
        to_facts: &FxHashSet<D<I, P>>,
        kind: ExplodedEdgeKind,
    ) {
        let Some(esg) = self.esg.as_mut() else {
            return;
        };
        for fact in to_facts {
            esg.add_edge(ExplodedEdge {
                from: ExplodedNode::new(from.clone(), from_fact.clone()),
                to: ExplodedNode::new(to.clone(), fact.clone()),
                kind,
            });
        }
    }
}

impl<'a, P, I> IdeSolver<'a, IfdsToIdeProblem<P>, I>
where
    I: Icfg,
    P: IfdsProblem<I>,
{
    /// Solve an IFDS problem over `BinaryDomain`
    pub fn from_ifds_problem(problem: P, icfg: &'a I) -> Self {
        Self::new(IfdsToIdeProblem::new(problem), icfg)
    }

    /// `from_ifds_problem` with an explicit configuration
    pub fn from_ifds_problem_with_config(problem: P, icfg: &'a I, config: SolverConfig) -> Self {
        Self::with_config(IfdsToIdeProblem::new(problem), icfg, config)
    }
}
