//! # Design
//!
//! - Only failures that change the HTTP outcome are errors; stage failures are
//!   reported through `CommandOutcome` instead.
//! - Keep messages constant and carry the repository id and path as fields.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Failures surfaced to the caller of the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request body was not a well-formed index request.
    #[error("index request could not be decoded")]
    Decode {
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// The bare repository path could not be made absolute.
    #[error("repository path could not be resolved")]
    ResolveRepoPath {
        /// Repository identifier from the request.
        repo_id: u32,
        /// Path that failed to resolve.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
}
