//! Solver statistics

use serde::Serialize;

use super::flow_edge_function_cache::CacheStatistics;

/// Counters collected over one solver run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SolverStatistics {
    /// Path edges handed to `propagate` (stored jump-function updates)
    pub num_path_edges_propagated: usize,

    /// Path edges dispatched to normal/call/exit handling
    pub num_path_edges_processed: usize,

    /// Worklist pops
    pub num_worklist_iterations: usize,

    /// End summaries registered at exit nodes
    pub num_end_summaries: usize,

    /// Existing end summaries applied at a new call site
    /// Higher is better - the callee was not re-analyzed
    pub num_summary_reuses: usize,

    /// Returns followed past a seed
    pub num_unbalanced_returns: usize,

    /// Phase II(i) value propagations
    pub num_value_propagations: usize,

    /// Phase II(ii) value computations
    pub num_value_computations: usize,

    /// Phase I time (milliseconds)
    pub phase_one_ms: u64,

    /// Phase II time (milliseconds)
    pub phase_two_ms: u64,

    /// Flow/edge-function cache counters at finalization
    pub cache: CacheStatistics,
}

impl SolverStatistics {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_zeroed() {
        let stats = SolverStatistics::default();
        assert_eq!(stats.num_path_edges_propagated, 0);
        assert_eq!(stats.cache.total_hits(), 0);
    }

    #[test]
    fn test_to_json() {
        let stats = SolverStatistics {
            num_summary_reuses: 3,
            ..Default::default()
        };
        let json = stats.to_json();
        assert_eq!(json["num_summary_reuses"], 3);
        assert_eq!(json["cache"]["normal_flow"]["hits"], 0);
    }
}
