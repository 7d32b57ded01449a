//! Command-line and environment surface for the server binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::debug;

use crate::duration::parse_duration;
use crate::error::{ConfigError, ConfigResult};
use crate::model::{DEFAULT_LISTEN_ADDR, ServiceConfig};

/// Log level used when neither `--log-level` nor `RUST_LOG` is given.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log output format selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    /// Structured JSON lines.
    Json,
    /// Human-readable output.
    Pretty,
}

/// Options accepted by the `dynindex-app` binary.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dynindex",
    about = "Clones, fetches and indexes repositories on request",
    version
)]
pub struct ServerArgs {
    /// Directory holding all data.
    #[arg(long = "data-dir", env = "DYNINDEX_DATA_DIR")]
    pub data_dir: PathBuf,
    /// Directory holding index shards. Defaults to `<data-dir>/index`.
    #[arg(long = "index-dir", env = "DYNINDEX_INDEX_DIR")]
    pub index_dir: Option<PathBuf>,
    /// Kill an index job after this much time (e.g. `1h`, `45m`).
    #[arg(
        long = "index-timeout",
        env = "DYNINDEX_INDEX_TIMEOUT",
        default_value = "1h",
        value_parser = parse_duration
    )]
    pub index_timeout: Duration,
    /// Listen on this address (`host:port` or `:port`).
    #[arg(long, env = "DYNINDEX_LISTEN", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen: String,
    /// Log level used when `RUST_LOG` is not set.
    #[arg(long = "log-level", env = "DYNINDEX_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,
    /// Log output format; inferred from the build profile when omitted.
    #[arg(long = "log-format", env = "DYNINDEX_LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormatArg>,
}

impl ServerArgs {
    /// Validate the parsed options and derive the service configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the data directory is empty, the timeout is zero,
    /// or the listen address is blank.
    pub fn resolve(&self) -> ConfigResult<ServiceConfig> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingDataDir);
        }
        if self.index_timeout.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "index_timeout",
                reason: "zero",
                value: None,
            });
        }
        let listen = self.listen.trim();
        if listen.is_empty() {
            return Err(ConfigError::InvalidField {
                field: "listen",
                reason: "empty",
                value: Some(self.listen.clone()),
            });
        }

        let mut config = ServiceConfig::new(&self.data_dir)
            .with_listen_addr(listen)
            .with_index_timeout(self.index_timeout);
        if let Some(index_dir) = self
            .index_dir
            .as_ref()
            .filter(|dir| !dir.as_os_str().is_empty())
        {
            config = config.with_index_dir(index_dir);
        }

        debug!(
            data_root = %config.data_root().display(),
            repo_dir = %config.repo_dir().display(),
            index_dir = %config.index_dir().display(),
            listen = config.listen_addr(),
            index_timeout_ms = u64::try_from(config.index_timeout().as_millis()).unwrap_or(u64::MAX),
            "resolved service configuration"
        );
        Ok(config)
    }
}
