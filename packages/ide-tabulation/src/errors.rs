//! Error types for ide-tabulation
//!
//! The solving core has no error channel: precondition violations panic and
//! cancellation is reported as `None`. Everything around it (graph
//! construction, configuration, result export) reports through `DataflowError`.

use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for ide-tabulation operations
#[derive(Debug, Error)]
pub enum DataflowError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Referenced function was never declared
    #[error("Unknown function '{0}'")]
    UnknownFunction(String),

    /// Referenced node was never added
    #[error("Unknown node '{0}'")]
    UnknownNode(String),

    /// Node id used twice
    #[error("Duplicate node '{0}'")]
    DuplicateNode(String),

    /// Structurally invalid program graph
    #[error("Malformed graph: {0}")]
    Graph(String),
}

impl DataflowError {
    /// Create a malformed-graph error
    pub fn graph(msg: impl Into<String>) -> Self {
        DataflowError::Graph(msg.into())
    }
}

/// Result type alias for ide-tabulation operations
pub type Result<T> = std::result::Result<T, DataflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DataflowError::UnknownNode("main::3".to_string());
        assert_eq!(err.to_string(), "Unknown node 'main::3'");

        let err = DataflowError::graph("call site has no return site");
        assert!(err.to_string().contains("no return site"));
    }

    #[test]
    fn test_config_error_conversion() {
        let err: DataflowError = ConfigError::MissingVersion.into();
        assert!(matches!(err, DataflowError::Config(_)));
    }
}
