//! Infrastructure: the tabulation solver and its tables
//!
//! - `ide_solver`: Phase I (jump functions, summaries, unbalanced returns)
//! - `value_computation`: Phase II
//! - `solver_api`: step-wise / interruptible API
//! - `solver_results`: borrowed and owning result views
//! - `jump_functions`, `flow_edge_function_cache`: solver tables
//! - `ifds_to_ide`: runs IFDS problems on the IDE solver
//! - `program_graph`: in-memory ICFG

pub mod flow_edge_function_cache;
pub mod ide_solver;
pub mod ifds_to_ide;
pub mod jump_functions;
pub mod program_graph;
pub mod solver_api;
pub mod solver_results;
pub mod statistics;
mod value_computation;

pub use flow_edge_function_cache::{CacheStatistics, FlowEdgeFunctionCache, KindCounter};
pub use ide_solver::{IdeSolver, SolverState};
pub use ifds_to_ide::IfdsToIdeProblem;
pub use jump_functions::JumpFunctions;
pub use program_graph::ProgramGraph;
pub use solver_results::{OwningSolverResults, SolverResults};
pub use statistics::SolverStatistics;
