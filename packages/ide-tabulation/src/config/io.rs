//! Configuration I/O (YAML)
//!
//! Solver configurations are stored inside a versioned envelope:
//!
//! ```yaml
//! version: 1
//! solver:
//!   follow_returns_past_seeds: true
//!   strategy: propagate_onto
//! ```

use super::error::{ConfigError, ConfigResult};
use super::solver_config::SolverConfig;
use super::validation::Validatable;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported schema versions
pub const SUPPORTED_VERSIONS: &[u32] = &[1];

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolverConfigExportV1 {
    /// Schema version (always 1 for v1)
    pub version: Option<u32>,

    /// Solver flags
    #[serde(default)]
    pub solver: SolverConfig,
}

impl SolverConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let export: SolverConfigExportV1 = serde_yaml::from_str(content)?;

        match export.version {
            None => return Err(ConfigError::MissingVersion),
            Some(v) if !SUPPORTED_VERSIONS.contains(&v) => {
                return Err(ConfigError::UnsupportedVersion {
                    found: v,
                    supported: SUPPORTED_VERSIONS.to_vec(),
                });
            }
            Some(_) => {}
        }

        export.solver.validate()?;
        Ok(export.solver)
    }

    /// Load from YAML file (v1 schema)
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Export to YAML
    pub fn to_yaml_string(&self) -> ConfigResult<String> {
        let export = SolverConfigExportV1 {
            version: Some(1),
            solver: self.clone(),
        };
        serde_yaml::to_string(&export).map_err(ConfigError::Yaml)
    }

    /// Export to a YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        std::fs::write(path, self.to_yaml_string()?)?;
        Ok(())
    }
}
