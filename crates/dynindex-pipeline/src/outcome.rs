//! Results of running one command.

use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use crate::invocation::CommandInvocation;

/// How a command invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandStatus {
    /// The program exited with status zero.
    Succeeded,
    /// The program exited non-zero; `code` is `None` when it was killed by a signal.
    Exited {
        /// Exit code reported by the operating system.
        code: Option<i32>,
    },
    /// The program could not be started (missing executable, permissions, ...).
    SpawnFailed {
        /// Reason reported by the operating system.
        reason: String,
    },
    /// Collecting the program's output failed after it started.
    OutputFailed {
        /// Reason reported by the operating system.
        reason: String,
    },
    /// The scope deadline passed while the program was running; it was killed.
    DeadlineExceeded,
    /// The scope had already expired, so the program was never started.
    Cancelled,
}

impl CommandStatus {
    /// Whether the command completed successfully.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Stable label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Exited { .. } => "exited",
            Self::SpawnFailed { .. } => "spawn_failed",
            Self::OutputFailed { .. } => "output_failed",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Display for CommandStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => formatter.write_str("exit status 0"),
            Self::Exited { code: Some(code) } => write!(formatter, "exit status {code}"),
            Self::Exited { code: None } => formatter.write_str("terminated by signal"),
            Self::SpawnFailed { reason } => write!(formatter, "spawn failed: {reason}"),
            Self::OutputFailed { reason } => write!(formatter, "output collection failed: {reason}"),
            Self::DeadlineExceeded => formatter.write_str("deadline exceeded"),
            Self::Cancelled => formatter.write_str("scope cancelled before start"),
        }
    }
}

/// Captured result of one command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Program followed by its arguments.
    pub argv: Vec<String>,
    /// How the invocation ended.
    pub status: CommandStatus,
    /// Everything the program wrote to standard output.
    pub stdout: Vec<u8>,
    /// Everything the program wrote to standard error.
    pub stderr: Vec<u8>,
    /// Wall-clock time spent on the invocation.
    pub elapsed: Duration,
}

impl CommandOutcome {
    /// Outcome for `invocation` with no captured output.
    #[must_use]
    pub fn new(invocation: &CommandInvocation, status: CommandStatus) -> Self {
        Self {
            argv: invocation.argv(),
            status,
            stdout: Vec::new(),
            stderr: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Attach captured output streams.
    #[must_use]
    pub fn with_output(mut self, stdout: Vec<u8>, stderr: Vec<u8>) -> Self {
        self.stdout = stdout;
        self.stderr = stderr;
        self
    }

    /// Attach the elapsed time.
    #[must_use]
    pub const fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// Whether the command completed successfully.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.status.is_success()
    }

    /// Standard output decoded lossily.
    #[must_use]
    pub fn stdout_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    /// Standard error decoded lossily.
    #[must_use]
    pub fn stderr_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_and_success() {
        assert!(CommandStatus::Succeeded.is_success());
        assert!(!CommandStatus::Exited { code: Some(1) }.is_success());
        assert!(!CommandStatus::Cancelled.is_success());
        assert_eq!(CommandStatus::DeadlineExceeded.as_str(), "deadline_exceeded");
        assert_eq!(
            CommandStatus::SpawnFailed {
                reason: "No such file or directory".into()
            }
            .as_str(),
            "spawn_failed"
        );
    }

    #[test]
    fn status_display_reads_like_process_errors() {
        assert_eq!(
            CommandStatus::Exited { code: Some(128) }.to_string(),
            "exit status 128"
        );
        assert_eq!(
            CommandStatus::Exited { code: None }.to_string(),
            "terminated by signal"
        );
    }

    #[test]
    fn outcome_carries_argv_and_output() {
        let invocation = CommandInvocation::new("echo").args(["-n", "1"]);
        let outcome = CommandOutcome::new(&invocation, CommandStatus::Succeeded)
            .with_output(b"1".to_vec(), vec![0xff])
            .with_elapsed(Duration::from_millis(3));
        assert_eq!(outcome.argv, vec!["echo", "-n", "1"]);
        assert!(outcome.succeeded());
        assert_eq!(outcome.stdout_lossy(), "1");
        assert_eq!(outcome.stderr_lossy(), "\u{fffd}");
        assert_eq!(outcome.elapsed, Duration::from_millis(3));
    }
}
