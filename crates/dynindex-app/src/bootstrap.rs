//! Boot sequence: options, logging, working directories, then the HTTP surface.

use std::env;
use std::sync::Arc;

use clap::Parser;
use dynindex_api::ApiServer;
use dynindex_config::{LogFormatArg, ServerArgs, ServiceConfig};
use dynindex_fsops::ensure_directories;
use dynindex_pipeline::ProcessRunner;
use dynindex_telemetry::{GlobalContextGuard, LogFormat, LoggingConfig, Metrics, build_sha};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

const SERVICE_NAME: &str = "dynindex";

/// Entry point for the server boot sequence.
///
/// # Errors
///
/// Returns an error if logging cannot be installed, the options are invalid,
/// a working directory cannot be created, or the listener fails.
pub async fn run_app() -> AppResult<()> {
    run_app_with(ServerArgs::parse()).await
}

/// Boot sequence driven by already-parsed options.
pub(crate) async fn run_app_with(args: ServerArgs) -> AppResult<()> {
    let logging = LoggingConfig {
        level: &args.log_level,
        format: args.log_format.map_or_else(LogFormat::infer, log_format),
        build_sha: build_sha(),
    };
    dynindex_telemetry::init_logging(&logging)
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    let _context = GlobalContextGuard::new(SERVICE_NAME);

    let config = args
        .resolve()
        .map_err(|err| AppError::config("args.resolve", err))?;
    info!(
        data_root = %config.data_root().display(),
        listen = config.listen_addr(),
        "dynamic index server starting"
    );

    let (server, addr) = prepare(config)?;
    server
        .serve(&addr)
        .await
        .map_err(|err| AppError::api_server("api_server.serve", err))
}

/// Create the working directories and assemble the server; returns it with the
/// address to bind.
fn prepare(config: ServiceConfig) -> AppResult<(ApiServer, String)> {
    ensure_directories(&config.managed_directories())
        .map_err(|err| AppError::fsops("fsops.ensure_directories", err))?;
    let telemetry = Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
    let addr = config.bind_addr();
    let server = ApiServer::new(config, Arc::new(process_runner()), telemetry);
    Ok((server, addr))
}

/// Companion tools installed next to the binary are found before `PATH`.
fn process_runner() -> ProcessRunner {
    match env::current_exe() {
        Ok(exe) => match exe.parent() {
            Some(dir) => ProcessRunner::new().with_path_prefix(dir),
            None => ProcessRunner::new(),
        },
        Err(err) => {
            warn!(error = %err, "executable path unavailable; using inherited PATH");
            ProcessRunner::new()
        }
    }
}

const fn log_format(arg: LogFormatArg) -> LogFormat {
    match arg {
        LogFormatArg::Json => LogFormat::Json,
        LogFormatArg::Pretty => LogFormat::Pretty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::fs;
    use std::io;

    type TestResult<T> = Result<T, Box<dyn Error>>;

    #[test]
    fn prepare_creates_working_directories() -> TestResult<()> {
        let temp = tempfile::tempdir()?;
        let config = ServiceConfig::new(temp.path().join("data"))
            .with_index_dir(temp.path().join("shards"))
            .with_listen_addr(":7070");

        let (_server, addr) = prepare(config)?;

        assert_eq!(addr, "0.0.0.0:7070");
        assert!(temp.path().join("data/repos").is_dir());
        assert!(temp.path().join("shards").is_dir());
        Ok(())
    }

    #[test]
    fn prepare_fails_when_directory_is_a_file() -> TestResult<()> {
        let temp = tempfile::tempdir()?;
        let data = temp.path().join("data");
        fs::write(&data, b"occupied")?;

        let err = prepare(ServiceConfig::new(&data))
            .err()
            .ok_or_else(|| io::Error::other("expected directory failure"))?;
        assert!(matches!(
            err,
            AppError::FsOps {
                operation: "fsops.ensure_directories",
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn runner_prefers_executable_directory() -> TestResult<()> {
        let exe = env::current_exe()?;
        let dir = exe
            .parent()
            .ok_or_else(|| io::Error::other("executable has no parent"))?;
        let runner = process_runner();
        let search_path = runner
            .search_path()
            .ok_or_else(|| io::Error::other("expected search path override"))?;
        assert_eq!(env::split_paths(search_path).next().as_deref(), Some(dir));
        Ok(())
    }

    #[test]
    fn log_format_maps_cli_values() {
        assert_eq!(log_format(LogFormatArg::Json), LogFormat::Json);
        assert_eq!(log_format(LogFormatArg::Pretty), LogFormat::Pretty);
    }
}
