//! Build configuration
//!
//! Defaults keep 20% of each node's edges and
//! only link games whose combined overlap reaches 75. Values can come from a
//! YAML file; every constructor validates before returning.

use ludograph_similarity::{EmissionGate, SimilarityConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("keep_percentage must be in (0, 1], got {0}")]
    InvalidKeepPercentage(f64),

    #[error("edge_weight_threshold must be a non-negative number, got {0}")]
    InvalidThreshold(f64),

    #[error("worker_count must be a positive integer")]
    InvalidWorkerCount,

    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Which entities become graph nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphMode {
    /// Board games linked by shared categories and mechanics
    #[default]
    Games,
    /// Categories linked by the games they share
    Categories,
}

impl std::fmt::Display for GraphMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphMode::Games => write!(f, "games"),
            GraphMode::Categories => write!(f, "categories"),
        }
    }
}

/// Graph build configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    pub mode: GraphMode,
    /// Fraction of each node's top edges to retain
    pub keep_percentage: f64,
    /// Minimum edge weight in games mode
    pub edge_weight_threshold: f64,
    /// Similarity worker pool size
    pub worker_count: usize,
    /// Per-worker progress log interval (0 disables)
    pub progress_interval: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            mode: GraphMode::Games,
            keep_percentage: 0.20,
            edge_weight_threshold: 75.0,
            worker_count: SimilarityConfig::default().worker_count,
            progress_interval: 100,
        }
    }
}

impl BuildConfig {
    /// Parse and validate YAML; missing keys take their defaults
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: BuildConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.keep_percentage > 0.0 && self.keep_percentage <= 1.0) {
            return Err(ConfigError::InvalidKeepPercentage(self.keep_percentage));
        }
        if !(self.edge_weight_threshold.is_finite() && self.edge_weight_threshold >= 0.0) {
            return Err(ConfigError::InvalidThreshold(self.edge_weight_threshold));
        }
        if self.worker_count == 0 {
            return Err(ConfigError::InvalidWorkerCount);
        }
        Ok(())
    }

    /// Emission rule for the configured mode
    pub fn emission_gate(&self) -> EmissionGate {
        match self.mode {
            GraphMode::Games => EmissionGate::Threshold(self.edge_weight_threshold),
            GraphMode::Categories => EmissionGate::NonZero,
        }
    }

    pub fn similarity_config(&self) -> SimilarityConfig {
        SimilarityConfig {
            gate: self.emission_gate(),
            worker_count: self.worker_count,
            progress_interval: self.progress_interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BuildConfig::default();
        assert_eq!(config.mode, GraphMode::Games);
        assert_eq!(config.keep_percentage, 0.20);
        assert_eq!(config.edge_weight_threshold, 75.0);
        assert!(config.worker_count >= 1);
        assert_eq!(config.worker_count, SimilarityConfig::default().worker_count);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = BuildConfig::from_yaml_str("mode: categories\nworker_count: 4\n").unwrap();
        assert_eq!(config.mode, GraphMode::Categories);
        assert_eq!(config.worker_count, 4);
        assert_eq!(config.keep_percentage, 0.20);
        assert_eq!(config.emission_gate(), EmissionGate::NonZero);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            BuildConfig::from_yaml_str("keep_percentage: 0"),
            Err(ConfigError::InvalidKeepPercentage(_))
        ));
        assert!(matches!(
            BuildConfig::from_yaml_str("keep_percentage: 1.01"),
            Err(ConfigError::InvalidKeepPercentage(_))
        ));
        assert!(matches!(
            BuildConfig::from_yaml_str("worker_count: 0"),
            Err(ConfigError::InvalidWorkerCount)
        ));
        assert!(matches!(
            BuildConfig::from_yaml_str("edge_weight_threshold: -1"),
            Err(ConfigError::InvalidThreshold(_))
        ));
        assert!(matches!(
            BuildConfig::from_yaml_str("worker_count: -3"),
            Err(ConfigError::Yaml(_))
        ));
        assert!(matches!(
            BuildConfig::from_yaml_str("keep_fraction: 0.5"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_full_retention_allowed() {
        let config = BuildConfig::from_yaml_str("keep_percentage: 1.0").unwrap();
        assert_eq!(config.keep_percentage, 1.0);
    }
}
