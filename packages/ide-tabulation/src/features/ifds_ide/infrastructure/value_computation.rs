/*
 * IDE Value Computation - Phase II
 *
 * Runs after Phase I reached its fixpoint; jump functions are final.
 *
 * (i)  Value propagation: seed values flow from start points into the call
 *      sites of the same function (through jump functions) and from call
 *      sites into callee start points (through call edge functions).
 *      Joins re-enqueue only on change.
 * (ii) Value computation: one sweep over all non-call, non-start nodes;
 *      val(n, d) = ⊔ f(val(sp, d1)) over jump functions (d1, n, d) = f.
 *
 * Seed nodes and unbalanced return sites act as additional start points.
 */

use std::collections::BTreeMap;

use super::ide_solver::{IdeSolver, D, L, N};
use crate::features::ifds_ide::ports::{Icfg, IdeProblem};

impl<'a, P, I> IdeSolver<'a, P, I>
where
    I: Icfg,
    P: IdeProblem<I>,
{
    pub(super) fn compute_values(&mut self) {
        // Phase II(i)
        self.submit_initial_values();
        while let Some((n, d)) = self.value_worklist.pop() {
            self.value_propagation_task(&n, &d);
        }

        // Phase II(ii)
        let nodes = self.icfg.all_non_call_start_nodes();
        self.value_computation_task(&nodes);
    }

    /// Value at (n, d); top when absent
    pub(super) fn val(&self, n: &N<I>, d: &D<I, P>) -> L<I, P> {
        self.values
            .get(n, d)
            .cloned()
            .unwrap_or_else(|| self.problem.top_element())
    }

    fn set_val(&mut self, n: N<I>, d: D<I, P>, value: L<I, P>) {
        self.values.insert(n, d, value);
    }

    fn submit_initial_values(&mut self) {
        let mut all_seeds: BTreeMap<N<I>, Vec<(D<I, P>, L<I, P>)>> = BTreeMap::new();
        for (n, d, l) in self.seeds.iter() {
            all_seeds
                .entry(n.clone())
                .or_default()
                .push((d.clone(), l.clone()));
        }
        for site in &self.unbalanced_ret_sites {
            all_seeds
                .entry(site.clone())
                .or_insert_with(|| vec![(self.zero.clone(), self.problem.top_element())]);
        }

        for (node, facts) in all_seeds {
            for (fact, value) in facts {
                // A caller seeded earlier may already have reached this node
                let joined = self.problem.join(&value, &self.val(&node, &fact));
                self.set_val(node.clone(), fact.clone(), joined);
                self.value_propagation_task(&node, &fact);
            }
        }
    }

    fn is_value_start(&self, n: &N<I>) -> bool {
        self.icfg.is_start_point(n)
            || self.seeds.contains_initial_seeds_for(n)
            || self.unbalanced_ret_sites.contains(n)
    }

    fn value_propagation_task(&mut self, n: &N<I>, d: &D<I, P>) {
        if self.is_value_start(n) {
            self.propagate_value_at_start(n, d);
        }
        if self.icfg.is_call_site(n) {
            self.propagate_value_at_call(n, d);
        }
    }

    /// Start point → call sites of the same function
    fn propagate_value_at_start(&mut self, start: &N<I>, d: &D<I, P>) {
        let function = self.icfg.function_of(start);
        let value = self.val(start, d);

        for call_site in self.icfg.calls_from_within(&function) {
            let Some(entries) = self.jump_fns.forward_lookup(d, &call_site) else {
                continue;
            };
            for (d_prime, f_prime) in entries {
                self.stats.num_value_propagations += 1;
                self.propagate_value(call_site.clone(), d_prime, f_prime.compute_target(&value));
            }
        }
    }

    /// Call site → callee start points
    fn propagate_value_at_call(&mut self, call_site: &N<I>, d: &D<I, P>) {
        let value = self.val(call_site, d);

        for callee in self.icfg.callees_of_call_at(call_site) {
            let call_flow = self.cache.call_flow_function(&self.problem, call_site, &callee);
            let start_points = self.icfg.start_points_of(&callee);

            for d_prime in call_flow.compute_targets(d) {
                let edge_fn = self
                    .cache
                    .call_edge_function(&self.problem, call_site, d, &callee, &d_prime);
                let propagated = edge_fn.compute_target(&value);
                for sp in &start_points {
                    self.stats.num_value_propagations += 1;
                    self.propagate_value(sp.clone(), d_prime.clone(), propagated.clone());
                }
            }
        }
    }

    fn propagate_value(&mut self, n: N<I>, d: D<I, P>, value: L<I, P>) {
        let current = self.val(&n, &d);
        let joined = self.problem.join(&current, &value);
        if joined != current {
            self.set_val(n.clone(), d.clone(), joined);
            self.value_worklist.push((n, d));
        }
    }

    fn value_computation_task(&mut self, nodes: &[N<I>]) {
        // Start values are read before any write so the sweep is order independent
        let mut contributions = Vec::new();
        for n in nodes {
            let function = self.icfg.function_of(n);
            let starts = self.value_starts_of(&function);
            for (d1, d2, f) in self.jump_fns.lookup_by_target(n) {
                for sp in &starts {
                    contributions.push((n.clone(), d2.clone(), f.compute_target(&self.val(sp, &d1))));
                }
            }
        }

        for (n, d, value) in contributions {
            let joined = self.problem.join(&self.val(&n, &d), &value);
            self.stats.num_value_computations += 1;
            self.set_val(n, d, joined);
        }
    }

    /// Start points, seed nodes and unbalanced return sites of `function`
    fn value_starts_of(&self, function: &I::Function) -> Vec<N<I>> {
        let mut starts = self.icfg.start_points_of(function);
        let extra = self
            .seeds
            .nodes()
            .chain(self.unbalanced_ret_sites.iter())
            .filter(|n| self.icfg.function_of(n) == *function);
        for n in extra {
            if !starts.contains(n) {
                starts.push(n.clone());
            }
        }
        starts
    }
}
