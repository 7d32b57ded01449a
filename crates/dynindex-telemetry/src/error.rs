//! Error types for telemetry operations.

use std::fmt::{self, Display, Formatter};
use std::string::FromUtf8Error;

use prometheus::Error as PrometheusError;
use thiserror::Error;
use tracing_subscriber::util::TryInitError;

use crate::init::LogFormat;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Step of a collector's lifecycle that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorStep {
    /// Constructing the collector from its options.
    Build,
    /// Adding the collector to the service registry.
    Register,
}

impl Display for CollectorStep {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Build => "built",
            Self::Register => "registered",
        })
    }
}

/// Errors raised while wiring up logging or the `/metrics` exposition.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed.
    #[error("{format} log subscriber could not be installed")]
    SubscriberInstall {
        /// Output format that was requested.
        format: LogFormat,
        /// Underlying tracing subscriber error.
        #[source]
        source: TryInitError,
    },
    /// A dynindex collector could not be created or registered.
    #[error("metric `{name}` could not be {step}")]
    Collector {
        /// Metric family name.
        name: &'static str,
        /// Lifecycle step that failed.
        step: CollectorStep,
        /// Underlying Prometheus error.
        #[source]
        source: PrometheusError,
    },
    /// The text exposition for `/metrics` could not be encoded.
    #[error("metrics exposition could not be encoded")]
    Exposition {
        /// Underlying Prometheus error.
        #[source]
        source: PrometheusError,
    },
    /// The encoded exposition was not UTF-8.
    #[error("metrics exposition is not utf-8")]
    ExpositionUtf8 {
        /// Underlying conversion error.
        #[source]
        source: FromUtf8Error,
    },
}

impl TelemetryError {
    pub(crate) const fn collector(
        name: &'static str,
        step: CollectorStep,
        source: PrometheusError,
    ) -> Self {
        Self::Collector { name, step, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    use tracing_subscriber::util::SubscriberInitExt;

    #[test]
    fn messages_name_the_failing_piece() -> std::result::Result<(), Box<dyn Error>> {
        let _ = tracing_subscriber::registry().try_init();
        let install_error = tracing_subscriber::registry()
            .try_init()
            .err()
            .ok_or_else(|| io::Error::other("expected a second install to fail"))?;
        let utf8_error = String::from_utf8(vec![0, 159])
            .err()
            .ok_or_else(|| io::Error::other("expected utf8 error"))?;
        let cases = vec![
            (
                TelemetryError::SubscriberInstall {
                    format: LogFormat::Json,
                    source: install_error,
                },
                "json log subscriber could not be installed",
            ),
            (
                TelemetryError::collector(
                    "pipeline_stages_total",
                    CollectorStep::Build,
                    PrometheusError::Msg("bad label".to_string()),
                ),
                "metric `pipeline_stages_total` could not be built",
            ),
            (
                TelemetryError::collector(
                    "index_requests_total",
                    CollectorStep::Register,
                    PrometheusError::AlreadyReg,
                ),
                "metric `index_requests_total` could not be registered",
            ),
            (
                TelemetryError::Exposition {
                    source: PrometheusError::Msg("encode".to_string()),
                },
                "metrics exposition could not be encoded",
            ),
            (
                TelemetryError::ExpositionUtf8 { source: utf8_error },
                "metrics exposition is not utf-8",
            ),
        ];

        for (err, message) in cases {
            assert_eq!(err.to_string(), message);
            assert!(err.source().is_some());
        }
        Ok(())
    }
}
