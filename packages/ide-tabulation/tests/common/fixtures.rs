//! Test fixtures
//!
//! `GenKillProblem`: a small IFDS problem over `ProgramGraph<Effect>`.
//! Facts are `u8`, `0` is Λ. Every node may generate facts from Λ and kill
//! facts. All facts are passed into callees and back; call-to-return only
//! keeps Λ, unless the callee has no body.
//!
//! `SeededIdentityProblem`: an IDE problem over the same graphs where every
//! flow and edge function is the identity and seeds carry explicit values.

use std::cell::RefCell;

use ide_tabulation::features::ifds_ide::domain::{
    identity_flow, lambda_flow, BinaryDomain, FlowFunctionPtr, InitialSeeds,
};
use ide_tabulation::features::linear_constant::LcaValue;
use ide_tabulation::{EdgeFn, Icfg, IdeProblem, IfdsProblem, ProgramGraph, SolverConfig};
use rustc_hash::FxHashSet;

/// Gen/kill payload of one node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Effect {
    pub gen: Vec<u8>,
    pub kill: Vec<u8>,
}

impl Effect {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn gen(facts: &[u8]) -> Self {
        Self {
            gen: facts.to_vec(),
            kill: Vec::new(),
        }
    }

    pub fn kill(facts: &[u8]) -> Self {
        Self {
            gen: Vec::new(),
            kill: facts.to_vec(),
        }
    }
}

pub type EffectGraph = ProgramGraph<Effect>;

/// Gen/kill IFDS problem
#[derive(Debug)]
pub struct GenKillProblem<'g> {
    pub graph: &'g EffectGraph,
    pub seeds: Vec<(String, u8)>,
    pub config: SolverConfig,
    /// Callees passed to the unbalanced-return side-effect hook
    pub side_effects: RefCell<Vec<String>>,
}

impl<'g> GenKillProblem<'g> {
    /// Seeded with Λ at the start of `main`
    pub fn new(graph: &'g EffectGraph) -> Self {
        let seeds = graph
            .start_points_of(&"main".to_string())
            .into_iter()
            .map(|sp| (sp, 0))
            .collect();
        Self::with_seeds(graph, seeds)
    }

    pub fn with_seeds(graph: &'g EffectGraph, seeds: Vec<(String, u8)>) -> Self {
        Self {
            graph,
            seeds,
            config: SolverConfig::default(),
            side_effects: RefCell::new(Vec::new()),
        }
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    fn is_bodyless(&self, callees: &[String]) -> bool {
        callees
            .iter()
            .all(|callee| self.graph.start_points_of(callee).is_empty())
    }
}

impl<'g> IfdsProblem<EffectGraph> for GenKillProblem<'g> {
    type Fact = u8;

    fn zero_value(&self) -> u8 {
        0
    }

    fn initial_seeds(&self) -> InitialSeeds<String, u8, BinaryDomain> {
        InitialSeeds::from_ifds(self.seeds.iter().cloned())
    }

    fn normal_flow_function(&self, curr: &String, _succ: &String) -> FlowFunctionPtr<u8> {
        let effect = self.graph.statement(curr).cloned().unwrap_or_default();
        lambda_flow(move |d: &u8| {
            let mut out = FxHashSet::default();
            if *d == 0 {
                out.insert(0);
                out.extend(effect.gen.iter().copied());
            } else if !effect.kill.contains(d) {
                out.insert(*d);
            }
            out
        })
    }

    fn call_flow_function(&self, _call_site: &String, _callee: &String) -> FlowFunctionPtr<u8> {
        identity_flow()
    }

    fn ret_flow_function(
        &self,
        _call_site: &String,
        _callee: &String,
        _exit: &String,
        _ret_site: &String,
    ) -> FlowFunctionPtr<u8> {
        identity_flow()
    }

    fn call_to_ret_flow_function(
        &self,
        _call_site: &String,
        _ret_site: &String,
        callees: &[String],
    ) -> FlowFunctionPtr<u8> {
        if self.is_bodyless(callees) {
            return identity_flow();
        }
        lambda_flow(|d: &u8| {
            let mut out = FxHashSet::default();
            if *d == 0 {
                out.insert(0);
            }
            out
        })
    }

    fn solver_config(&self) -> SolverConfig {
        self.config.clone()
    }

    fn apply_unbalanced_ret_flow_function_side_effects(
        &self,
        callee: &String,
        _exit: &String,
        _exit_fact: &u8,
    ) {
        self.side_effects.borrow_mut().push(callee.clone());
    }
}

/// Identity IDE problem with explicit seed values
#[derive(Debug, Default)]
pub struct SeededIdentityProblem {
    pub seeds: Vec<(String, u8, LcaValue)>,
}

impl SeededIdentityProblem {
    pub fn with_seed(mut self, node: &str, fact: u8, value: LcaValue) -> Self {
        self.seeds.push((node.to_string(), fact, value));
        self
    }
}

impl IdeProblem<EffectGraph> for SeededIdentityProblem {
    type Fact = u8;
    type Value = LcaValue;

    fn zero_value(&self) -> u8 {
        0
    }

    fn initial_seeds(&self) -> InitialSeeds<String, u8, LcaValue> {
        let mut seeds = InitialSeeds::new();
        for (node, fact, value) in &self.seeds {
            seeds.add_seed(node.clone(), *fact, *value);
        }
        seeds
    }

    fn normal_flow_function(&self, _curr: &String, _succ: &String) -> FlowFunctionPtr<u8> {
        identity_flow()
    }

    fn call_flow_function(&self, _call_site: &String, _callee: &String) -> FlowFunctionPtr<u8> {
        identity_flow()
    }

    fn ret_flow_function(
        &self,
        _call_site: &String,
        _callee: &String,
        _exit: &String,
        _ret_site: &String,
    ) -> FlowFunctionPtr<u8> {
        identity_flow()
    }

    fn call_to_ret_flow_function(
        &self,
        _call_site: &String,
        _ret_site: &String,
        _callees: &[String],
    ) -> FlowFunctionPtr<u8> {
        identity_flow()
    }

    fn normal_edge_function(&self, _curr: &String, _d: &u8, _succ: &String, _s: &u8) -> EdgeFn<LcaValue> {
        EdgeFn::identity()
    }

    fn call_edge_function(&self, _call_site: &String, _d: &u8, _callee: &String, _s: &u8) -> EdgeFn<LcaValue> {
        EdgeFn::identity()
    }

    fn return_edge_function(
        &self,
        _call_site: &String,
        _callee: &String,
        _exit: &String,
        _exit_fact: &u8,
        _ret_site: &String,
        _ret_fact: &u8,
    ) -> EdgeFn<LcaValue> {
        EdgeFn::identity()
    }

    fn call_to_ret_edge_function(
        &self,
        _call_site: &String,
        _call_fact: &u8,
        _ret_site: &String,
        _ret_fact: &u8,
        _callees: &[String],
    ) -> EdgeFn<LcaValue> {
        EdgeFn::identity()
    }
}
