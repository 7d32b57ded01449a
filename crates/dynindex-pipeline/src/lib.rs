#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(unreachable_pub, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Clone → fetch → index pipeline driven through an injectable command runner.
//!
//! Layout: `invocation.rs` (command descriptions), `scope.rs` (deadline-bound
//! execution scope), `outcome.rs` (per-command results), `runner/` (the
//! `CommandRunner` seam with process and recording implementations),
//! `request.rs` (decoded index requests), `driver.rs` (stage sequencing).

pub mod driver;
pub mod error;
pub mod invocation;
pub mod outcome;
pub mod request;
pub mod runner;
pub mod scope;

pub use driver::{
    CLONE_PROGRAM, GIT_PROGRAM, INDEX_PROGRAM, PipelineDriver, PipelineReport, PipelineStage,
    StageReport, resolve_repo_path,
};
pub use error::{PipelineError, PipelineResult};
pub use invocation::CommandInvocation;
pub use outcome::{CommandOutcome, CommandStatus};
pub use request::IndexRequest;
pub use runner::{CommandRunner, ProcessRunner, RecordedInvocation, RecordingRunner};
pub use scope::ExecutionScope;
