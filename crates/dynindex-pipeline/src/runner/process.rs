//! Runner that launches real child processes.

use std::env;
use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{info, warn};

use super::{CommandRunner, log_outcome};
use crate::invocation::CommandInvocation;
use crate::outcome::{CommandOutcome, CommandStatus};
use crate::scope::ExecutionScope;

const PATH_VAR: &str = "PATH";
const READ_CHUNK: usize = 8 * 1024;
const KILL_DRAIN_GRACE: Duration = Duration::from_millis(100);

/// Launches each invocation as a child process with empty standard input and
/// captured output, killing it when the scope deadline passes.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    search_path: Option<OsString>,
}

impl ProcessRunner {
    /// Runner that resolves programs through the inherited `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve programs in `dir` before the inherited `PATH`.
    ///
    /// The server process environment is left untouched; the combined search
    /// path is only handed to spawned children.
    #[must_use]
    pub fn with_path_prefix(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let inherited = env::var_os(PATH_VAR);
        let entries = std::iter::once(dir.to_path_buf())
            .chain(inherited.iter().flat_map(env::split_paths));
        match env::join_paths(entries) {
            Ok(joined) => self.search_path = Some(joined),
            Err(err) => warn!(
                dir = %dir.display(),
                error = %err,
                "unable to prepend directory to PATH; using inherited search path"
            ),
        }
        self
    }

    /// Search path handed to children, when overridden.
    #[must_use]
    pub fn search_path(&self) -> Option<&OsString> {
        self.search_path.as_ref()
    }

    fn command(&self, invocation: &CommandInvocation) -> Command {
        let mut command = Command::new(invocation.program());
        command
            .args(invocation.arguments())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = invocation.working_dir() {
            command.current_dir(dir);
        }
        if let Some(path) = &self.search_path {
            command.env(PATH_VAR, path);
        }
        command
    }

    async fn execute(&self, scope: &ExecutionScope, invocation: &CommandInvocation) -> CommandOutcome {
        let mut child = match self.command(invocation).spawn() {
            Ok(child) => child,
            Err(err) => {
                return CommandOutcome::new(
                    invocation,
                    CommandStatus::SpawnFailed {
                        reason: err.to_string(),
                    },
                );
            }
        };

        let mut stdout_pipe = child.stdout.take();
        let mut stderr_pipe = child.stderr.take();
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        // Buffers keep every chunk read so far, even when the wait is cut short.
        let waited = timeout_at(scope.deadline(), async {
            let (status, stdout_read, stderr_read) = tokio::join!(
                child.wait(),
                drain(&mut stdout_pipe, &mut stdout),
                drain(&mut stderr_pipe, &mut stderr),
            );
            stdout_read.and(stderr_read).and(status)
        })
        .await;

        let status = match waited {
            Ok(Ok(status)) if status.success() => CommandStatus::Succeeded,
            Ok(Ok(status)) => CommandStatus::Exited {
                code: status.code(),
            },
            Ok(Err(err)) => CommandStatus::OutputFailed {
                reason: err.to_string(),
            },
            Err(_) => {
                if let Err(err) = child.kill().await {
                    warn!(
                        command = %invocation,
                        error = %err,
                        "failed to kill command after deadline"
                    );
                }
                // Descendants may still hold the pipes open; collect what is already buffered.
                let _ = timeout(KILL_DRAIN_GRACE, async {
                    let _ = tokio::join!(
                        drain(&mut stdout_pipe, &mut stdout),
                        drain(&mut stderr_pipe, &mut stderr),
                    );
                })
                .await;
                CommandStatus::DeadlineExceeded
            }
        };
        CommandOutcome::new(invocation, status).with_output(stdout, stderr)
    }
}

/// Append everything readable from `pipe` to `buffer` until end of stream.
///
/// Each chunk is appended as soon as it is read, so dropping the future keeps
/// the bytes collected so far.
async fn drain<R>(pipe: &mut Option<R>, buffer: &mut Vec<u8>) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let Some(pipe) = pipe.as_mut() else {
        return Ok(());
    };
    let mut chunk = [0_u8; READ_CHUNK];
    loop {
        let read = pipe.read(&mut chunk).await?;
        if read == 0 {
            return Ok(());
        }
        buffer.extend_from_slice(&chunk[..read]);
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, scope: &ExecutionScope, invocation: CommandInvocation) -> CommandOutcome {
        info!(command = %invocation, "run");
        let started = Instant::now();
        let outcome = if scope.is_cancelled() {
            CommandOutcome::new(&invocation, CommandStatus::Cancelled)
        } else {
            self.execute(scope, &invocation).await
        };
        let outcome = outcome.with_elapsed(started.elapsed());
        log_outcome(&outcome);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_prefix_comes_first() {
        let runner = ProcessRunner::new().with_path_prefix("/opt/zoekt/bin");
        let Some(path) = runner.search_path() else {
            panic!("expected search path override");
        };
        let first = env::split_paths(path).next();
        assert_eq!(first.as_deref(), Some(Path::new("/opt/zoekt/bin")));
    }

    #[test]
    fn default_runner_inherits_path() {
        assert!(ProcessRunner::new().search_path().is_none());
    }

    #[tokio::test]
    async fn expired_scope_skips_spawn() {
        let scope = ExecutionScope::with_timeout(Duration::ZERO);
        let outcome = ProcessRunner::new()
            .run(&scope, CommandInvocation::new("definitely-not-a-real-program"))
            .await;
        assert_eq!(outcome.status, CommandStatus::Cancelled);
    }
}
