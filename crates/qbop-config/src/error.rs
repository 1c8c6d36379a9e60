//! Error types for configuration loading.

use thiserror::Error;

/// Structured errors emitted while loading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is unset or blank.
    #[error("missing required environment variable '{name}'")]
    MissingEnv {
        /// Variable name.
        name: &'static str,
    },
    /// A variable holds a value that cannot be used.
    #[error("invalid value for '{field}': {reason}")]
    InvalidField {
        /// Variable name.
        field: &'static str,
        /// Offending value, omitted for secrets.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, value: &str, reason: &'static str) -> Self {
        Self::InvalidField {
            field,
            value: Some(value.to_string()),
            reason,
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
