//! `POST /truncate`: empty the repo directory, then the index directory.

use std::path::Path;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode};
use dynindex_fsops::{FsOpsError, empty_directory};
use tracing::{error, info};

use crate::http::errors::ApiError;
use crate::state::ApiState;

const OUTCOME_COMPLETED: &str = "completed";
const OUTCOME_FAILED: &str = "failed";

pub(crate) async fn truncate(State(state): State<Arc<ApiState>>) -> Result<StatusCode, ApiError> {
    let repo_dir = state.config.repo_dir().to_path_buf();
    let index_dir = state.config.index_dir().to_path_buf();

    let result = tokio::task::spawn_blocking(move || truncate_directories(&repo_dir, &index_dir))
        .await
        .map_err(|err| {
            error!(error = %err, "truncate task failed");
            ApiError::internal()
        })
        .and_then(|outcome| outcome);

    match result {
        Ok(()) => {
            state.telemetry.inc_truncate_request(OUTCOME_COMPLETED);
            Ok(StatusCode::OK)
        }
        Err(err) => {
            state.telemetry.inc_truncate_request(OUTCOME_FAILED);
            Err(err)
        }
    }
}

fn truncate_directories(repo_dir: &Path, index_dir: &Path) -> Result<(), ApiError> {
    let repos = empty_directory(repo_dir).map_err(|err| {
        log_failure(&err, "failed to empty repo directory");
        ApiError::delete_repo_dir()
    })?;
    let shards = empty_directory(index_dir).map_err(|err| {
        log_failure(&err, "failed to empty index directory");
        ApiError::delete_index_dir()
    })?;
    info!(repos, shards, "truncated working directories");
    Ok(())
}

fn log_failure(err: &FsOpsError, message: &'static str) {
    error!(
        error = %err,
        operation = err.operation(),
        path = %err.path().display(),
        "{message}"
    );
}
