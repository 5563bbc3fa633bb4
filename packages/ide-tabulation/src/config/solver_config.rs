//! Solver configuration
//!
//! Flags consulted by the tabulation solver. A problem hands its
//! configuration to the solver through `IdeProblem::solver_config`; the solver
//! reads it once at construction.

use super::error::{ConfigError, ConfigResult};
use super::validation::Validatable;
use serde::{Deserialize, Serialize};

// ============================================================================
// Scheduling Strategy
// ============================================================================

/// Worklist scheduling strategy
///
/// Both strategies share the join-before-enqueue contract and reach the same
/// fixpoint; they differ only in *when* a contribution is joined into the
/// jump-function table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStrategy {
    /// Enqueue raw contributions; join into the table when popped
    PropagateOver,

    /// Join into the table when emitted; enqueue only on change
    PropagateOnto,
}

impl SolverStrategy {
    /// Parse strategy from string
    pub fn from_str(s: &str) -> ConfigResult<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "propagate_over" | "over" => Ok(Self::PropagateOver),
            "propagate_onto" | "onto" => Ok(Self::PropagateOnto),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PropagateOver => "propagate_over",
            Self::PropagateOnto => "propagate_onto",
        }
    }
}

impl Default for SolverStrategy {
    fn default() -> Self {
        Self::PropagateOver
    }
}

impl std::fmt::Display for SolverStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Solver Configuration
// ============================================================================

/// Tabulation solver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolverConfig {
    /// Propagate returns out of functions entered without a tracked call
    #[serde(default)]
    pub follow_returns_past_seeds: bool,

    /// Wrap every flow function so that the zero fact always survives
    #[serde(default = "default_true")]
    pub auto_add_zero: bool,

    /// Run phase II (value computation) in `finalize`
    #[serde(default = "default_true")]
    pub compute_values: bool,

    /// Record every propagated exploded-supergraph edge
    #[serde(default)]
    pub record_edges: bool,

    /// Log the recorded exploded supergraph as DOT on finalize
    #[serde(default)]
    pub emit_esg: bool,

    /// Worklist scheduling strategy
    #[serde(default)]
    pub strategy: SolverStrategy,

    /// Default cancellation polling interval (1..=60000 ms)
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_check_interval_ms() -> u64 {
    1000
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            follow_returns_past_seeds: false,
            auto_add_zero: true,
            compute_values: true,
            record_edges: false,
            emit_esg: false,
            strategy: SolverStrategy::default(),
            check_interval_ms: default_check_interval_ms(),
        }
    }
}

impl SolverConfig {
    /// Builder: Set follow_returns_past_seeds
    pub fn follow_returns_past_seeds(mut self, v: bool) -> Self {
        self.follow_returns_past_seeds = v;
        self
    }

    /// Builder: Set auto_add_zero
    pub fn auto_add_zero(mut self, v: bool) -> Self {
        self.auto_add_zero = v;
        self
    }

    /// Builder: Set compute_values
    pub fn compute_values(mut self, v: bool) -> Self {
        self.compute_values = v;
        self
    }

    /// Builder: Set record_edges
    pub fn record_edges(mut self, v: bool) -> Self {
        self.record_edges = v;
        self
    }

    /// Builder: Set emit_esg
    pub fn emit_esg(mut self, v: bool) -> Self {
        self.emit_esg = v;
        self
    }

    /// Builder: Set strategy
    pub fn strategy(mut self, v: SolverStrategy) -> Self {
        self.strategy = v;
        self
    }

    /// Builder: Set check_interval_ms
    pub fn check_interval_ms(mut self, v: u64) -> Self {
        self.check_interval_ms = v;
        self
    }

    /// Polling interval as a `Duration`
    pub fn check_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.check_interval_ms)
    }
}

impl Validatable for SolverConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.check_interval_ms == 0 || self.check_interval_ms > 60_000 {
            return Err(ConfigError::range_with_hint(
                "check_interval_ms",
                self.check_interval_ms,
                1,
                60_000,
                "Cancellation must be polled at least once per minute",
            ));
        }

        if self.emit_esg && !self.record_edges {
            return Err(ConfigError::conflict(
                "emit_esg is enabled but record_edges is disabled",
                "enable record_edges or disable emit_esg",
            ));
        }

        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "SolverConfig"
    }
}
