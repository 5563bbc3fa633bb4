/*
 * Exploded Supergraph
 *
 * Nodes are (CFG node, fact) pairs; edges are induced by flow functions.
 * The solver never needs the graph itself. It is recorded only when
 * `record_edges` is set, for inspection and DOT export.
 *
 * Example:
 *   CFG node: "main::1" (statement x = y)
 *   Fact: Var(y)
 *   → Exploded node: ("main::1", Var(y))
 */

use rustc_hash::{FxHashMap, FxHashSet};
use std::hash::Hash;

/// Path edge: (d1, n, d2)
///
/// Fact d1 holding at the start of n's function reaches fact d2 at node n.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathEdge<N, D> {
    /// Source fact (at procedure entry)
    pub source_fact: D,

    /// Target CFG node
    pub target_node: N,

    /// Target fact (at target_node)
    pub target_fact: D,
}

impl<N, D> PathEdge<N, D> {
    pub fn new(source_fact: D, target_node: N, target_fact: D) -> Self {
        Self {
            source_fact,
            target_node,
            target_fact,
        }
    }
}

/// Node in the exploded supergraph
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExplodedNode<N, D> {
    /// CFG node (statement)
    pub cfg_node: N,

    /// Dataflow fact at this node
    pub fact: D,
}

impl<N, D> ExplodedNode<N, D> {
    pub fn new(cfg_node: N, fact: D) -> Self {
        Self { cfg_node, fact }
    }
}

/// Edge in the exploded supergraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExplodedEdgeKind {
    /// Normal intra-procedural edge
    Normal,

    /// Call edge: call site → callee start point
    Call,

    /// Return edge: callee exit → return site
    Return,

    /// Call-to-return edge: facts bypassing the callee
    CallToReturn,

    /// Special summary flow function applied at a call site
    Summary,

    /// Return with no tracked caller context
    UnbalancedReturn,
}

impl ExplodedEdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Call => "call",
            Self::Return => "return",
            Self::CallToReturn => "call-to-return",
            Self::Summary => "summary",
            Self::UnbalancedReturn => "unbalanced-return",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExplodedEdge<N, D> {
    pub from: ExplodedNode<N, D>,
    pub to: ExplodedNode<N, D>,
    pub kind: ExplodedEdgeKind,
}

/// Recorded exploded supergraph
#[derive(Debug, Clone)]
pub struct ExplodedSupergraph<N, D> {
    /// All nodes in exploded supergraph
    nodes: FxHashSet<ExplodedNode<N, D>>,

    /// All distinct edges, in discovery order
    edges: Vec<ExplodedEdge<N, D>>,

    edge_index: FxHashSet<ExplodedEdge<N, D>>,

    /// node → set of successor nodes
    successors: FxHashMap<ExplodedNode<N, D>, FxHashSet<ExplodedNode<N, D>>>,

    /// node → set of predecessor nodes
    predecessors: FxHashMap<ExplodedNode<N, D>, FxHashSet<ExplodedNode<N, D>>>,
}

impl<N, D> Default for ExplodedSupergraph<N, D> {
    fn default() -> Self {
        Self {
            nodes: FxHashSet::default(),
            edges: Vec::new(),
            edge_index: FxHashSet::default(),
            successors: FxHashMap::default(),
            predecessors: FxHashMap::default(),
        }
    }
}

impl<N, D> ExplodedSupergraph<N, D>
where
    N: Clone + Eq + Hash,
    D: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Add node to exploded supergraph
    pub fn add_node(&mut self, node: ExplodedNode<N, D>) {
        self.successors.entry(node.clone()).or_default();
        self.predecessors.entry(node.clone()).or_default();
        self.nodes.insert(node);
    }

    /// Add edge to exploded supergraph; duplicates are ignored
    pub fn add_edge(&mut self, edge: ExplodedEdge<N, D>) {
        if self.edge_index.contains(&edge) {
            return;
        }
        self.add_node(edge.from.clone());
        self.add_node(edge.to.clone());

        self.successors
            .entry(edge.from.clone())
            .or_default()
            .insert(edge.to.clone());
        self.predecessors
            .entry(edge.to.clone())
            .or_default()
            .insert(edge.from.clone());

        self.edge_index.insert(edge.clone());
        self.edges.push(edge);
    }

    /// Get successors of a node
    pub fn get_successors(&self, node: &ExplodedNode<N, D>) -> Option<&FxHashSet<ExplodedNode<N, D>>> {
        self.successors.get(node)
    }

    /// Get predecessors of a node
    pub fn get_predecessors(
        &self,
        node: &ExplodedNode<N, D>,
    ) -> Option<&FxHashSet<ExplodedNode<N, D>>> {
        self.predecessors.get(node)
    }

    /// Check if edge exists (any kind)
    pub fn has_edge(&self, from: &ExplodedNode<N, D>, to: &ExplodedNode<N, D>) -> bool {
        self.successors
            .get(from)
            .map_or(false, |succs| succs.contains(to))
    }

    pub fn edges(&self) -> &[ExplodedEdge<N, D>] {
        &self.edges
    }

    /// Get number of nodes
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Get number of edges
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Render as Graphviz DOT, sorted for stable output
    pub fn to_dot(
        &self,
        node_label: impl Fn(&N) -> String,
        fact_label: impl Fn(&D) -> String,
    ) -> String {
        let label =
            |n: &ExplodedNode<N, D>| format!("{} | {}", node_label(&n.cfg_node), fact_label(&n.fact));

        let mut lines: Vec<String> = self
            .edges
            .iter()
            .map(|e| {
                format!(
                    "  \"{}\" -> \"{}\" [label=\"{}\"];",
                    escape(&label(&e.from)),
                    escape(&label(&e.to)),
                    e.kind.as_str()
                )
            })
            .collect();
        lines.sort();
        lines.dedup();

        let mut dot = String::from("digraph ESG {\n");
        for line in lines {
            dot.push_str(&line);
            dot.push('\n');
        }
        dot.push_str("}\n");
        dot
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
