//! Evaluation session configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Options for a [`Session`](crate::Session).
///
/// Missing fields in a JSON document take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Collect `print` output in the session instead of writing to stdout.
    pub capture_output: bool,
    /// Keep evaluating a batch after an expression fails.
    pub continue_on_error: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            capture_output: false,
            continue_on_error: true,
        }
    }
}

impl EvalConfig {
    /// Default configuration with `print` output captured.
    pub fn captured() -> Self {
        Self {
            capture_output: true,
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }
}

/// Errors that can occur while loading an [`EvalConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}
