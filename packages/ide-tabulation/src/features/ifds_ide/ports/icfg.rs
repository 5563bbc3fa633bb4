//! Interprocedural CFG port
//!
//! Read-only queries the tabulation solver issues against the program
//! representation. The solver never mutates the graph.

use std::fmt::Debug;
use std::hash::Hash;

/// Interprocedural control-flow graph
pub trait Icfg {
    /// Statement handle
    type Node: Clone + Eq + Hash + Ord + Debug + 'static;

    /// Procedure handle
    type Function: Clone + Eq + Hash + Ord + Debug + 'static;

    fn succs_of(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn preds_of(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn is_call_site(&self, node: &Self::Node) -> bool;

    fn is_exit_inst(&self, node: &Self::Node) -> bool;

    fn is_start_point(&self, node: &Self::Node) -> bool;

    fn callees_of_call_at(&self, node: &Self::Node) -> Vec<Self::Function>;

    fn callers_of(&self, function: &Self::Function) -> Vec<Self::Node>;

    fn return_sites_of_call_at(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn calls_from_within(&self, function: &Self::Function) -> Vec<Self::Node>;

    /// Empty for functions without a body
    fn start_points_of(&self, function: &Self::Function) -> Vec<Self::Node>;

    fn exit_points_of(&self, function: &Self::Function) -> Vec<Self::Node>;

    fn function_of(&self, node: &Self::Node) -> Self::Function;

    fn all_functions(&self) -> Vec<Self::Function>;

    /// Every node that is neither a call site nor a start point
    fn all_non_call_start_nodes(&self) -> Vec<Self::Node>;

    /// Stable name for diagnostics
    fn function_name(&self, function: &Self::Function) -> String;

    /// Stable statement id for diagnostics
    fn statement_id(&self, node: &Self::Node) -> String;
}
