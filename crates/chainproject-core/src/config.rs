//! Projection engine configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ProjectionError;
use crate::logging::LogConfig;

/// What to do with an event that has no registered projection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnhandledPolicy {
    /// Log a warning and leave the store unchanged.
    Skip,
    /// Stop and return `UnhandledEvent` to the caller.
    #[default]
    Abort,
}

impl std::fmt::Display for UnhandledPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

/// Configuration for a [`ProjectionEngine`](crate::engine::ProjectionEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Policy for events without a projection.
    #[serde(default)]
    pub unhandled: UnhandledPolicy,
    /// Reject events that arrive out of (block, log index) order during replay.
    #[serde(default = "bool_true")]
    pub enforce_ordering: bool,
    /// Logging setup for hosts that let the engine configure tracing.
    #[serde(default)]
    pub log: LogConfig,
}

fn bool_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            unhandled: UnhandledPolicy::default(),
            enforce_ordering: true,
            log: LogConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Config that skips unhandled events instead of aborting.
    pub fn skip_unhandled() -> Self {
        Self {
            unhandled: UnhandledPolicy::Skip,
            ..Default::default()
        }
    }

    /// Parse a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self, ProjectionError> {
        serde_json::from_str(json)
            .map_err(|e| ProjectionError::Config(format!("invalid engine config: {e}")))
    }

    /// Load a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ProjectionError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.unhandled, UnhandledPolicy::Abort);
        assert!(config.enforce_ordering);
    }

    #[test]
    fn parse_skip_policy() {
        let config = EngineConfig::from_json_str(
            r#"{ "unhandled": "skip", "enforce_ordering": false, "log": { "level": "debug" } }"#,
        )
        .unwrap();
        assert_eq!(config.unhandled, UnhandledPolicy::Skip);
        assert!(!config.enforce_ordering);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn unknown_policy_is_config_error() {
        let err = EngineConfig::from_json_str(r#"{ "unhandled": "retry" }"#).unwrap_err();
        assert!(matches!(err, ProjectionError::Config(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = EngineConfig::from_file(Path::new("/nonexistent/chainproject.json")).unwrap_err();
        assert!(matches!(err, ProjectionError::Io(_)));
    }
}
