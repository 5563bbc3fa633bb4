//! Domain layer: lattice values, edge/flow functions, seeds, supergraph records

pub mod edge_functions;
pub mod exploded_supergraph;
pub mod flow_functions;
pub mod lattice;
pub mod seeds;

pub use edge_functions::{
    downcast_equal, AllBottom, AllTop, ComposedEdgeFunction, ConstantEdgeFunction, EdgeFn,
    EdgeFunction, EdgeFunctionKind, EdgeIdentity,
};
pub use exploded_supergraph::{
    ExplodedEdge, ExplodedEdgeKind, ExplodedNode, ExplodedSupergraph, PathEdge,
};
pub use flow_functions::{
    generate_flow, generate_flow_and_kill_all_others, generate_flow_if, generate_many_flows,
    identity_flow, kill_all_flow, kill_flow, kill_flow_if, kill_many_flows, lambda_flow,
    transfer_flow, union_flows, DataflowFact, FlowFunction, FlowFunctionPtr, ZeroedFlowFunction,
};
pub use lattice::{BinaryDomain, IdeValue};
pub use seeds::InitialSeeds;
