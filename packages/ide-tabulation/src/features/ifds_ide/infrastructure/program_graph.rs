/*
 * Program Graph (in-memory ICFG)
 *
 * Concrete `Icfg` over string node ids with a per-node statement payload.
 *
 * Key Features:
 * - Functions with formal parameters and an ordered node list
 * - First node of a function is its start point
 * - Explicit exit marking
 * - Call sites with any number of callees (bodyless callees allowed)
 * - Return sites are the intra-procedural successors of a call site
 *
 * Usage:
 * ```text
 * let mut graph = ProgramGraph::new();
 * graph.add_function("main", &[])?;
 * graph.add_node("main", "main::0", Statement::Nop)?;
 * graph.add_node("main", "main::1", Statement::ret(None))?;
 * graph.add_edge("main::0", "main::1")?;
 * graph.mark_exit("main::1")?;
 * ```
 */

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

use crate::errors::{DataflowError, Result};
use crate::features::ifds_ide::ports::Icfg;
use crate::shared::models::Statement;

#[derive(Debug, Clone, Default)]
struct FunctionInfo {
    params: Vec<String>,
    nodes: Vec<String>,
    exits: Vec<String>,
}

#[derive(Debug, Clone)]
struct NodeInfo<S> {
    function: String,
    statement: S,
}

/// In-memory interprocedural CFG
#[derive(Debug, Clone)]
pub struct ProgramGraph<S = Statement> {
    functions: BTreeMap<String, FunctionInfo>,
    nodes: FxHashMap<String, NodeInfo<S>>,

    /// Adjacency list: node → successors
    successors: FxHashMap<String, Vec<String>>,

    /// Reverse adjacency list: node → predecessors
    predecessors: FxHashMap<String, Vec<String>>,

    /// Call site → callees
    callees: FxHashMap<String, Vec<String>>,

    /// Function → call sites
    callers: FxHashMap<String, Vec<String>>,
}

impl<S> Default for ProgramGraph<S> {
    fn default() -> Self {
        Self {
            functions: BTreeMap::new(),
            nodes: FxHashMap::default(),
            successors: FxHashMap::default(),
            predecessors: FxHashMap::default(),
            callees: FxHashMap::default(),
            callers: FxHashMap::default(),
        }
    }
}

impl<S> ProgramGraph<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a function; declaring twice keeps the first parameter list
    pub fn add_function(&mut self, name: &str, params: &[&str]) -> Result<()> {
        self.functions
            .entry(name.to_string())
            .or_insert_with(|| FunctionInfo {
                params: params.iter().map(|p| p.to_string()).collect(),
                ..FunctionInfo::default()
            });
        Ok(())
    }

    /// Add a node to `function`; the first node added becomes the start point
    pub fn add_node(&mut self, function: &str, id: &str, statement: S) -> Result<()> {
        if self.nodes.contains_key(id) {
            return Err(DataflowError::DuplicateNode(id.to_string()));
        }
        let info = self
            .functions
            .get_mut(function)
            .ok_or_else(|| DataflowError::UnknownFunction(function.to_string()))?;
        info.nodes.push(id.to_string());
        self.nodes.insert(
            id.to_string(),
            NodeInfo {
                function: function.to_string(),
                statement,
            },
        );
        Ok(())
    }

    /// Add an intra-procedural control-flow edge
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<()> {
        let from_fn = &self.node_info(from)?.function;
        let to_fn = &self.node_info(to)?.function;
        if from_fn != to_fn {
            return Err(DataflowError::graph(format!(
                "edge {} -> {} crosses from '{}' into '{}'",
                from, to, from_fn, to_fn
            )));
        }

        let succs = self.successors.entry(from.to_string()).or_default();
        if !succs.iter().any(|s| s == to) {
            succs.push(to.to_string());
            self.predecessors
                .entry(to.to_string())
                .or_default()
                .push(from.to_string());
        }
        Ok(())
    }

    /// Mark a node as an exit of its function
    pub fn mark_exit(&mut self, id: &str) -> Result<()> {
        let function = self.node_info(id)?.function.clone();
        if let Some(info) = self.functions.get_mut(&function) {
            if !info.exits.iter().any(|e| e == id) {
                info.exits.push(id.to_string());
            }
        }
        Ok(())
    }

    /// Register `callee` as a possible target of `call_site`
    pub fn add_call(&mut self, call_site: &str, callee: &str) -> Result<()> {
        self.node_info(call_site)?;
        if !self.functions.contains_key(callee) {
            return Err(DataflowError::UnknownFunction(callee.to_string()));
        }

        let targets = self.callees.entry(call_site.to_string()).or_default();
        if !targets.iter().any(|c| c == callee) {
            targets.push(callee.to_string());
            self.callers
                .entry(callee.to_string())
                .or_default()
                .push(call_site.to_string());
        }
        Ok(())
    }

    /// Statement payload of a node
    pub fn statement(&self, id: &str) -> Option<&S> {
        self.nodes.get(id).map(|info| &info.statement)
    }

    /// Formal parameters of a function
    pub fn params_of(&self, function: &str) -> Option<&[String]> {
        self.functions.get(function).map(|info| info.params.as_slice())
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_functions(&self) -> usize {
        self.functions.len()
    }

    /// Every `(node id, statement)`, sorted by id
    pub fn statements(&self) -> Vec<(&str, &S)> {
        let mut all: Vec<(&str, &S)> = self
            .nodes
            .iter()
            .map(|(id, info)| (id.as_str(), &info.statement))
            .collect();
        all.sort_by(|a, b| a.0.cmp(b.0));
        all
    }

    fn node_info(&self, id: &str) -> Result<&NodeInfo<S>> {
        self.nodes
            .get(id)
            .ok_or_else(|| DataflowError::UnknownNode(id.to_string()))
    }
}

impl ProgramGraph<Statement> {
    /// Add a straight-line function `name::0 → name::1 → ...`
    ///
    /// The last statement becomes the exit. Returns the generated node ids.
    /// Call targets are resolved later by `link_calls`.
    pub fn add_linear_function(
        &mut self,
        name: &str,
        params: &[&str],
        statements: Vec<Statement>,
    ) -> Result<Vec<String>> {
        if statements.is_empty() {
            return Err(DataflowError::graph(format!(
                "function '{}' needs at least one statement",
                name
            )));
        }
        self.add_function(name, params)?;

        let mut ids: Vec<String> = Vec::with_capacity(statements.len());
        for (i, statement) in statements.into_iter().enumerate() {
            let id = format!("{}::{}", name, i);
            self.add_node(name, &id, statement)?;
            if let Some(prev) = ids.last() {
                self.add_edge(prev, &id)?;
            }
            ids.push(id);
        }
        if let Some(last) = ids.last() {
            self.mark_exit(last)?;
        }
        Ok(ids)
    }

    /// Resolve every `Statement::Call` by callee name
    ///
    /// Callees never declared are added as bodyless functions.
    pub fn link_calls(&mut self) -> Result<()> {
        let mut calls: Vec<(String, String)> = self
            .nodes
            .iter()
            .filter_map(|(id, info)| match &info.statement {
                Statement::Call { callee, .. } => Some((id.clone(), callee.clone())),
                _ => None,
            })
            .collect();
        calls.sort();

        for (call_site, callee) in calls {
            if !self.functions.contains_key(&callee) {
                self.add_function(&callee, &[])?;
            }
            self.add_call(&call_site, &callee)?;
        }
        Ok(())
    }
}

impl<S> Icfg for ProgramGraph<S> {
    type Node = String;
    type Function = String;

    fn succs_of(&self, node: &String) -> Vec<String> {
        self.successors.get(node).cloned().unwrap_or_default()
    }

    fn preds_of(&self, node: &String) -> Vec<String> {
        self.predecessors.get(node).cloned().unwrap_or_default()
    }

    fn is_call_site(&self, node: &String) -> bool {
        self.callees.contains_key(node)
    }

    fn is_exit_inst(&self, node: &String) -> bool {
        self.nodes
            .get(node)
            .and_then(|info| self.functions.get(&info.function))
            .map_or(false, |f| f.exits.contains(node))
    }

    fn is_start_point(&self, node: &String) -> bool {
        self.nodes
            .get(node)
            .and_then(|info| self.functions.get(&info.function))
            .and_then(|f| f.nodes.first())
            .map_or(false, |first| first == node)
    }

    fn callees_of_call_at(&self, node: &String) -> Vec<String> {
        self.callees.get(node).cloned().unwrap_or_default()
    }

    fn callers_of(&self, function: &String) -> Vec<String> {
        self.callers.get(function).cloned().unwrap_or_default()
    }

    fn return_sites_of_call_at(&self, node: &String) -> Vec<String> {
        self.succs_of(node)
    }

    fn calls_from_within(&self, function: &String) -> Vec<String> {
        self.functions.get(function).map_or_else(Vec::new, |f| {
            f.nodes
                .iter()
                .filter(|n| self.callees.contains_key(*n))
                .cloned()
                .collect()
        })
    }

    fn start_points_of(&self, function: &String) -> Vec<String> {
        self.functions
            .get(function)
            .and_then(|f| f.nodes.first())
            .cloned()
            .into_iter()
            .collect()
    }

    fn exit_points_of(&self, function: &String) -> Vec<String> {
        self.functions
            .get(function)
            .map(|f| f.exits.clone())
            .unwrap_or_default()
    }

    fn function_of(&self, node: &String) -> String {
        match self.nodes.get(node) {
            Some(info) => info.function.clone(),
            None => panic!("node '{}' is not part of the program graph", node),
        }
    }

    fn all_functions(&self) -> Vec<String> {
        self.functions.keys().cloned().collect()
    }

    fn all_non_call_start_nodes(&self) -> Vec<String> {
        let mut nodes: Vec<String> = self
            .nodes
            .keys()
            .filter(|n| !self.is_call_site(n) && !self.is_start_point(n))
            .cloned()
            .collect();
        nodes.sort();
        nodes
    }

    fn function_name(&self, function: &String) -> String {
        function.clone()
    }

    /// Node id without its `function::` prefix
    fn statement_id(&self, node: &String) -> String {
        self.nodes
            .get(node)
            .and_then(|info| node.strip_prefix(info.function.as_str()))
            .and_then(|rest| rest.strip_prefix("::"))
            .unwrap_or(node)
            .to_string()
    }
}
