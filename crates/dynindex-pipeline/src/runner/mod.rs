//! Seam between pipeline sequencing and process execution.

mod process;
mod recording;

pub use process::ProcessRunner;
pub use recording::{RecordedInvocation, RecordingRunner};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::invocation::CommandInvocation;
use crate::outcome::CommandOutcome;
use crate::scope::ExecutionScope;

/// Executes command invocations on behalf of the pipeline.
///
/// Implementations never fail: every way an invocation can end, including
/// spawn failures and deadline kills, is reported through the returned
/// [`CommandOutcome`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `invocation` bounded by `scope`, returning once the program has
    /// finished, been killed, or was skipped because the scope had expired.
    async fn run(&self, scope: &ExecutionScope, invocation: CommandInvocation) -> CommandOutcome;
}

pub(crate) fn log_outcome(outcome: &CommandOutcome) {
    let elapsed_ms = u64::try_from(outcome.elapsed.as_millis()).unwrap_or(u64::MAX);
    if outcome.succeeded() {
        debug!(argv = ?outcome.argv, elapsed_ms, "command finished");
        return;
    }
    warn!(
        argv = ?outcome.argv,
        status = outcome.status.as_str(),
        error = %outcome.status,
        stdout = %outcome.stdout_lossy(),
        stderr = %outcome.stderr_lossy(),
        elapsed_ms,
        "command failed"
    );
}
