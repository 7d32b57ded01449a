//! # Design
//!
//! - Keep resolver failures structured so startup can report the offending field.
//! - Duration parse errors carry the raw input because clap surfaces them verbatim.

use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while resolving process configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The data root was not supplied or was empty.
    #[error("data directory must be set")]
    MissingDataDir,
    /// A configuration field held an unusable value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// A duration string could not be parsed.
    #[error("invalid duration '{value}': {reason}")]
    InvalidDuration {
        /// Raw input supplied by the operator.
        value: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid_duration(value: &str, reason: &'static str) -> Self {
        Self::InvalidDuration {
            value: value.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_duration_message_includes_input() {
        let err = ConfigError::invalid_duration("5x", "unknown_unit");
        assert_eq!(err.to_string(), "invalid duration '5x': unknown_unit");
    }

    #[test]
    fn invalid_field_message_is_constant() {
        let err = ConfigError::InvalidField {
            field: "listen",
            reason: "empty",
            value: None,
        };
        assert_eq!(err.to_string(), "invalid configuration field");
    }
}
