/*
 * Linear Constant Propagation (IDE)
 *
 * Tracks which local variables hold a constant at each statement, through
 * assignments of the form
 *
 *   x = c          x = y          x = y ⊕ c          x = c ⊕ y
 *
 * and across calls (arguments into parameters, return value into the call
 * result). Anything else that writes a variable makes it ⊥:
 *
 *   x = y ⊕ z      x = source()   x = ext(...)   (no body)
 *
 * Flow functions decide which facts exist; edge functions carry the
 * arithmetic. Constants are generated from Λ.
 */

use rustc_hash::FxHashSet;

use super::domain::{LcaFact, LcaValue, LinearEdgeFunction};
use crate::config::SolverConfig;
use crate::features::ifds_ide::domain::{
    identity_flow, kill_all_flow, kill_flow, lambda_flow, EdgeFn, FlowFunctionPtr, InitialSeeds,
};
use crate::features::ifds_ide::infrastructure::ProgramGraph;
use crate::features::ifds_ide::ports::{Icfg, IdeProblem};
use crate::shared::models::{Expr, Operand, Statement};

type Node = String;
type Function = String;

/// A variable definition: `target` receives `edge(value of source)`
struct Definition {
    target: String,
    source: LcaFact,
    edge: EdgeFn<LcaValue>,
}

/// Linear constant propagation over a `ProgramGraph`
#[derive(Debug, Clone)]
pub struct LinearConstantProblem<'g> {
    graph: &'g ProgramGraph,
    entry_points: Vec<String>,
    config: SolverConfig,
}

impl<'g> LinearConstantProblem<'g> {
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

    pub fn graph(&self) -> &'g ProgramGraph {
        self.graph
    }

    fn statement(&self, node: &Node) -> Option<&'g Statement> {
        self.graph.statement(node)
    }

    /// Call arguments paired with the callee's formal parameters
    fn bindings(&self, call_site: &Node, callee: &Function) -> Vec<(Operand, String)> {
        let Some(Statement::Call { args, .. }) = self.statement(call_site) else {
            return Vec::new();
        };
        let params = self.graph.params_of(callee).unwrap_or_default();
        args.iter().cloned().zip(params.iter().cloned()).collect()
    }

    fn call_result(&self, call_site: &Node) -> Option<&'g str> {
        match self.statement(call_site) {
            Some(Statement::Call { result, .. }) => result.as_deref(),
            _ => None,
        }
    }

    fn returned_operand(&self, exit: &Node) -> Option<&'g Operand> {
        match self.statement(exit) {
            Some(Statement::Return(Some(op))) => Some(op),
            _ => None,
        }
    }

    fn is_bodyless(&self, callees: &[Function]) -> bool {
        callees
            .iter()
            .all(|callee| self.graph.start_points_of(callee).is_empty())
    }

    /// Definition made by the statement at a non-call node
    fn definition(&self, node: &Node) -> Option<Definition> {
        match self.statement(node)? {
            Statement::Assign { target, value } => Some(assignment(target, value)),
            Statement::Source { target } => Some(Definition {
                target: target.clone(),
                source: LcaFact::Zero,
                edge: EdgeFn::all_bottom(),
            }),
            // A call that was never linked behaves like an unknown value
            Statement::Call {
                result: Some(target),
                ..
            } => Some(Definition {
                target: target.clone(),
                source: LcaFact::Zero,
                edge: EdgeFn::all_bottom(),
            }),
            _ => None,
        }
    }
}

fn assignment(target: &str, value: &Expr) -> Definition {
    let target = target.to_string();
    let vars = value.vars();
    match (value, vars.as_slice()) {
        (_, []) => {
            let constant = value
                .eval_const()
                .map_or(LcaValue::Bottom, LcaValue::Const);
            Definition {
                target,
                source: LcaFact::Zero,
                edge: EdgeFn::constant(constant),
            }
        }
        (Expr::Operand(_), [var]) => Definition {
            target,
            source: LcaFact::var(*var),
            edge: EdgeFn::identity(),
        },
        (Expr::Binary { op, lhs, rhs }, [var]) => Definition {
            target,
            source: LcaFact::var(*var),
            edge: LinearEdgeFunction::for_operands(*op, lhs, rhs)
                .unwrap_or_else(EdgeFn::all_bottom),
        },
        _ => Definition {
            target,
            source: LcaFact::Zero,
            edge: EdgeFn::all_bottom(),
        },
    }
}

/// Kill `target`, then generate it from `source`
fn define_flow(target: String, source: LcaFact) -> FlowFunctionPtr<LcaFact> {
    lambda_flow(move |d: &LcaFact| {
        let mut out = FxHashSet::default();
        if !d.is_var(&target) {
            out.insert(d.clone());
        }
        if *d == source {
            out.insert(LcaFact::Var(target.clone()));
        }
        out
    })
}

impl<'g> IdeProblem<ProgramGraph> for LinearConstantProblem<'g> {
    type Fact = LcaFact;
    type Value = LcaValue;

    fn zero_value(&self) -> LcaFact {
        LcaFact::Zero
    }

    fn initial_seeds(&self) -> InitialSeeds<Node, LcaFact, LcaValue> {
        let mut seeds = InitialSeeds::new();
        for function in &self.entry_points {
            for start in self.graph.start_points_of(function) {
                seeds.add_seed(start, LcaFact::Zero, LcaValue::Bottom);
            }
        }
        seeds
    }

    fn normal_flow_function(&self, curr: &Node, _succ: &Node) -> FlowFunctionPtr<LcaFact> {
        match self.definition(curr) {
            Some(def) => define_flow(def.target, def.source),
            None => identity_flow(),
        }
    }

    fn call_flow_function(&self, call_site: &Node, callee: &Function) -> FlowFunctionPtr<LcaFact> {
        let bindings = self.bindings(call_site, callee);
        if bindings.is_empty() {
            return kill_all_flow();
        }
        lambda_flow(move |d: &LcaFact| {
            let mut out = FxHashSet::default();
            for (arg, param) in &bindings {
                let passes = match (arg, d) {
                    (Operand::Const(_), LcaFact::Zero) => true,
                    (Operand::Var(name), fact) => fact.is_var(name),
                    _ => false,
                };
                if passes {
                    out.insert(LcaFact::Var(param.clone()));
                }
            }
            out
        })
    }

    fn ret_flow_function(
        &self,
        call_site: &Node,
        _callee: &Function,
        exit: &Node,
        _ret_site: &Node,
    ) -> FlowFunctionPtr<LcaFact> {
        let (Some(result), Some(returned)) = (self.call_result(call_site), self.returned_operand(exit))
        else {
            return kill_all_flow();
        };
        let result = LcaFact::var(result);
        let returned = returned.clone();
        lambda_flow(move |d: &LcaFact| {
            let mut out = FxHashSet::default();
            let passes = match (&returned, d) {
                (Operand::Const(_), LcaFact::Zero) => true,
                (Operand::Var(name), fact) => fact.is_var(name),
                _ => false,
            };
            if passes {
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
    ) -> FlowFunctionPtr<LcaFact> {
        match self.call_result(call_site) {
            Some(result) if self.is_bodyless(callees) => {
                define_flow(result.to_string(), LcaFact::Zero)
            }
            Some(result) => kill_flow(LcaFact::var(result)),
            None => identity_flow(),
        }
    }

    fn normal_edge_function(
        &self,
        curr: &Node,
        curr_fact: &LcaFact,
        _succ: &Node,
        succ_fact: &LcaFact,
    ) -> EdgeFn<LcaValue> {
        match self.definition(curr) {
            Some(def) if succ_fact.is_var(&def.target) && *curr_fact == def.source => def.edge,
            _ => EdgeFn::identity(),
        }
    }

    fn call_edge_function(
        &self,
        call_site: &Node,
        src_fact: &LcaFact,
        callee: &Function,
        dest_fact: &LcaFact,
    ) -> EdgeFn<LcaValue> {
        if *src_fact != LcaFact::Zero {
            return EdgeFn::identity();
        }
        self.bindings(call_site, callee)
            .into_iter()
            .find_map(|(arg, param)| match arg {
                Operand::Const(c) if dest_fact.is_var(&param) => {
                    Some(EdgeFn::constant(LcaValue::Const(c)))
                }
                _ => None,
            })
            .unwrap_or_else(EdgeFn::identity)
    }

    fn return_edge_function(
        &self,
        call_site: &Node,
        _callee: &Function,
        exit: &Node,
        exit_fact: &LcaFact,
        _ret_site: &Node,
        ret_fact: &LcaFact,
    ) -> EdgeFn<LcaValue> {
        match (self.returned_operand(exit), self.call_result(call_site)) {
            (Some(Operand::Const(c)), Some(result))
                if *exit_fact == LcaFact::Zero && ret_fact.is_var(result) =>
            {
                EdgeFn::constant(LcaValue::Const(*c))
            }
            _ => EdgeFn::identity(),
        }
    }

    fn call_to_ret_edge_function(
        &self,
        call_site: &Node,
        call_fact: &LcaFact,
        _ret_site: &Node,
        ret_fact: &LcaFact,
        callees: &[Function],
    ) -> EdgeFn<LcaValue> {
        match self.call_result(call_site) {
            Some(result)
                if *call_fact == LcaFact::Zero
                    && ret_fact.is_var(result)
                    && self.is_bodyless(callees) =>
            {
                EdgeFn::all_bottom()
            }
            _ => EdgeFn::identity(),
        }
    }

    fn solver_config(&self) -> SolverConfig {
        self.config.clone()
    }

    fn fact_to_string(&self, fact: &LcaFact) -> String {
        fact.to_string()
    }

    fn value_to_string(&self, value: &LcaValue) -> String {
        value.to_string()
    }
}
