/*
 * Taint Analysis (IFDS)
 *
 * A variable is tainted if its value may come from `source()`.
 *
 * Transfer:
 * - `x = source()`      taints x
 * - `x = e`             taints x iff e reads a tainted variable
 * - `r = f(a, ...)`     arguments taint parameters, returned variable taints r
 * - `r = ext(a, ...)`   no body: r tainted iff any argument is
 *
 * A leak is a `sink(v)` reached with v tainted.
 */

use rustc_hash::FxHashSet;

use crate::config::SolverConfig;
use crate::features::ifds_ide::domain::{
    identity_flow, kill_all_flow, kill_flow, lambda_flow, BinaryDomain, FlowFunctionPtr,
    InitialSeeds,
};
use crate::features::ifds_ide::infrastructure::{ProgramGraph, SolverResults};
use crate::features::ifds_ide::ports::{Icfg, IfdsProblem};
use crate::shared::models::{Operand, Statement};

type Node = String;
type Function = String;

/// Dataflow fact of the taint analysis
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaintFact {
    Zero,
    Tainted(String),
}

impl TaintFact {
    pub fn tainted(name: impl Into<String>) -> Self {
        TaintFact::Tainted(name.into())
    }

    pub fn is_tainted(&self, name: &str) -> bool {
        matches!(self, TaintFact::Tainted(v) if v == name)
    }
}

/// A sink reached by a tainted value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Leak {
    pub sink: String,
    pub var: String,
}

/// Source-to-sink taint tracking over a `ProgramGraph`
#[derive(Debug, Clone)]
pub struct TaintProblem<'g> {
    graph: &'g ProgramGraph,
    entry_points: Vec<String>,
    config: SolverConfig,
}

impl<'g> TaintProblem<'g> {
    /// Analysis seeded at the start of `main`
    pub fn new(graph: &'g ProgramGraph) -> Self {
        Self::with_entry_points(graph, vec!["main".to_string()])
    }

    pub fn with_entry_points(graph: &'g ProgramGraph, entry_points: Vec<String>) -> Self {
        Self {
            graph,
            entry_points,
            config: SolverConfig::default(),
        }
    }

    pub fn with_solver_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Leaks in `results`, sorted by sink node
    pub fn leaks(&self, results: SolverResults<'_, Node, TaintFact, BinaryDomain>) -> Vec<Leak> {
        leaks(results, self.graph)
    }

    fn statement(&self, node: &Node) -> Option<&'g Statement> {
        self.graph.statement(node)
    }

    fn call_result(&self, call_site: &Node) -> Option<&'g str> {
        match self.statement(call_site) {
            Some(Statement::Call { result, .. }) => result.as_deref(),
            _ => None,
        }
    }

    fn is_bodyless(&self, callees: &[Function]) -> bool {
        callees
            .iter()
            .all(|callee| self.graph.start_points_of(callee).is_empty())
    }
}

/// `result` becomes tainted iff one of `inputs` is; everything else passes
fn derive_flow(result: String, inputs: Vec<String>) -> FlowFunctionPtr<TaintFact> {
    lambda_flow(move |d: &TaintFact| {
        let mut out = FxHashSet::default();
        let TaintFact::Tainted(var) = d else {
            out.insert(d.clone());
            return out;
        };
        if inputs.contains(var) {
            out.insert(TaintFact::Tainted(result.clone()));
        }
        if *var != result {
            out.insert(d.clone());
        }
        out
    })
}

fn arg_vars(args: &[Operand]) -> Vec<String> {
    args.iter()
        .filter_map(|arg| arg.as_var().map(str::to_string))
        .collect()
}

/// Tainted `(sink node, variable)` pairs, sorted by sink node
///
/// Reads the Phase II value table, so `compute_values` must be on.
pub fn leaks(results: SolverResults<'_, Node, TaintFact, BinaryDomain>, graph: &ProgramGraph) -> Vec<Leak> {
    let mut found = Vec::new();
    for (id, statement) in graph.statements() {
        let Statement::Sink { arg: Operand::Var(var) } = statement else {
            continue;
        };
        let sink = id.to_string();
        if results.ifds_results_at(&sink).contains(&TaintFact::tainted(var.as_str())) {
            tracing::debug!(sink = %sink, var = %var, "tainted value reaches sink");
            found.push(Leak {
                sink,
                var: var.clone(),
            });
        }
    }
    found
}

impl<'g> IfdsProblem<ProgramGraph> for TaintProblem<'g> {
    type Fact = TaintFact;

    fn zero_value(&self) -> TaintFact {
        TaintFact::Zero
    }

    fn initial_seeds(&self) -> InitialSeeds<Node, TaintFact, BinaryDomain> {
        InitialSeeds::from_ifds(
            self.entry_points
                .iter()
                .flat_map(|function| self.graph.start_points_of(function))
                .map(|start| (start, TaintFact::Zero)),
        )
    }

    fn normal_flow_function(&self, curr: &Node, _succ: &Node) -> FlowFunctionPtr<TaintFact> {
        match self.statement(curr) {
            Some(Statement::Source { target }) => {
                let target = target.clone();
                lambda_flow(move |d: &TaintFact| {
                    let mut out = FxHashSet::default();
                    match d {
                        TaintFact::Zero => {
                            out.insert(TaintFact::Zero);
                            out.insert(TaintFact::Tainted(target.clone()));
                        }
                        fact if fact.is_tainted(&target) => {}
                        fact => {
                            out.insert(fact.clone());
                        }
                    }
                    out
                })
            }
            Some(Statement::Assign { target, value }) => derive_flow(
                target.clone(),
                value.vars().into_iter().map(str::to_string).collect(),
            ),
            // Unlinked call: treated like a call without a body
            Some(Statement::Call {
                args,
                result: Some(result),
                ..
            }) => derive_flow(result.clone(), arg_vars(args)),
            _ => identity_flow(),
        }
    }

    fn call_flow_function(&self, call_site: &Node, callee: &Function) -> FlowFunctionPtr<TaintFact> {
        let (Some(Statement::Call { args, .. }), Some(params)) =
            (self.statement(call_site), self.graph.params_of(callee))
        else {
            return kill_all_flow();
        };
        let bindings: Vec<(String, String)> = args
            .iter()
            .zip(params)
            .filter_map(|(arg, param)| arg.as_var().map(|v| (v.to_string(), param.clone())))
            .collect();

        lambda_flow(move |d: &TaintFact| {
            bindings
                .iter()
                .filter(|(arg, _)| d.is_tainted(arg))
                .map(|(_, param)| TaintFact::Tainted(param.clone()))
                .collect()
        })
    }

    fn ret_flow_function(
        &self,
        call_site: &Node,
        _callee: &Function,
        exit: &Node,
        _ret_site: &Node,
    ) -> FlowFunctionPtr<TaintFact> {
        let returned = match self.statement(exit) {
            Some(Statement::Return(Some(Operand::Var(var)))) => var.clone(),
            _ => return kill_all_flow(),
        };
        let Some(result) = self.call_result(call_site) else {
            return kill_all_flow();
        };
        let result = TaintFact::tainted(result);
        lambda_flow(move |d: &TaintFact| {
            let mut out = FxHashSet::default();
            if d.is_tainted(&returned) {
                out.insert(result.clone());
            }
            out
        })
    }

    fn call_to_ret_flow_function(
        &self,
        call_site: &Node,
        _ret_site: &Node,
        callees: &[Function],
    ) -> FlowFunctionPtr<TaintFact> {
        let Some(result) = self.call_result(call_site) else {
            return identity_flow();
        };
        if self.is_bodyless(callees) {
            let args = match self.statement(call_site) {
                Some(Statement::Call { args, .. }) => arg_vars(args),
                _ => Vec::new(),
            };
            return derive_flow(result.to_string(), args);
        }
        kill_flow(TaintFact::tainted(result))
    }

    fn solver_config(&self) -> SolverConfig {
        self.config.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ifds_ide::solve_ifds;
    use crate::shared::models::{BinOp, Expr};

    fn leak(sink: &str, var: &str) -> Leak {
        Leak {
            sink: sink.to_string(),
            var: var.to_string(),
        }
    }

    #[test]
    fn test_intraprocedural_leak() {
        let mut graph = ProgramGraph::new();
        graph
            .add_linear_function(
                "main",
                &[],
                vec![
                    Statement::source("a"),
                    Statement::assign("b", Expr::binary(BinOp::Add, Operand::var("a"), Operand::Const(1))),
                    Statement::assign("c", Expr::constant(0)),
                    Statement::sink(Operand::var("b")),
                    Statement::sink(Operand::var("c")),
                    Statement::ret(None),
                ],
            )
            .unwrap();

        let problem = TaintProblem::new(&graph);
        let (results, _) = solve_ifds(problem.clone(), &graph).unwrap();
        assert_eq!(problem.leaks(results.get()), vec![leak("main::3", "b")]);
    }

    #[test]
    fn test_overwrite_clears_taint() {
        let mut graph = ProgramGraph::new();
        graph
            .add_linear_function(
                "main",
                &[],
                vec![
                    Statement::source("a"),
                    Statement::assign("a", Expr::constant(3)),
                    Statement::sink(Operand::var("a")),
                    Statement::ret(None),
                ],
            )
            .unwrap();

        let (results, _) = solve_ifds(TaintProblem::new(&graph), &graph).unwrap();
        assert!(leaks(results.get(), &graph).is_empty());
    }

    #[test]
    fn test_taint_through_call_and_return() {
        let mut graph = ProgramGraph::new();
        graph
            .add_linear_function(
                "main",
                &[],
                vec![
                    Statement::source("a"),
                    Statement::call("id", vec![Operand::var("a")], Some("b")),
                    Statement::call("id", vec![Operand::Const(1)], Some("c")),
                    Statement::sink(Operand::var("b")),
                    Statement::sink(Operand::var("c")),
                    Statement::ret(None),
                ],
            )
            .unwrap();
        graph
            .add_linear_function(
                "id",
                &["p"],
                vec![Statement::Nop, Statement::ret(Some(Operand::var("p")))],
            )
            .unwrap();
        graph.link_calls().unwrap();

        let (results, _) = solve_ifds(TaintProblem::new(&graph), &graph).unwrap();
        assert_eq!(leaks(results.get(), &graph), vec![leak("main::3", "b")]);
        assert!(results
            .ifds_results_at(&"id::1".to_string())
            .contains(&TaintFact::tainted("p")));
    }

    #[test]
    fn test_bodyless_callee_passes_taint() {
        let mut graph = ProgramGraph::new();
        graph
            .add_linear_function(
                "main",
                &[],
                vec![
                    Statement::source("a"),
                    Statement::call("concat", vec![Operand::var("a"), Operand::Const(2)], Some("s")),
                    Statement::sink(Operand::var("s")),
                    Statement::ret(None),
                ],
            )
            .unwrap();
        graph.link_calls().unwrap();

        let (results, _) = solve_ifds(TaintProblem::new(&graph), &graph).unwrap();
        assert_eq!(leaks(results.get(), &graph), vec![leak("main::2", "s")]);
    }
}
