//! In-memory runner that records invocations instead of launching programs.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, timeout_at};

use super::CommandRunner;
use crate::invocation::CommandInvocation;
use crate::outcome::{CommandOutcome, CommandStatus};
use crate::scope::ExecutionScope;

/// One invocation observed by [`RecordingRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedInvocation {
    /// Program followed by its arguments.
    pub argv: Vec<String>,
    /// Whether the scope had already expired when the invocation arrived.
    pub scope_cancelled: bool,
}

/// Runner that records every invocation and answers from a script.
///
/// Programs succeed unless scripted otherwise. A scripted delay is bounded by
/// the scope deadline the same way a real child would be killed.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    history: Mutex<Vec<RecordedInvocation>>,
    delays: HashMap<String, Duration>,
    statuses: HashMap<String, CommandStatus>,
}

impl RecordingRunner {
    /// Runner with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every run of `program` take `delay`.
    #[must_use]
    pub fn with_delay(mut self, program: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(program.into(), delay);
        self
    }

    /// Make every run of `program` end with `status`.
    #[must_use]
    pub fn with_status(mut self, program: impl Into<String>, status: CommandStatus) -> Self {
        self.statuses.insert(program.into(), status);
        self
    }

    /// Invocations observed so far, in arrival order.
    #[must_use]
    pub fn history(&self) -> Vec<RecordedInvocation> {
        self.lock_history().clone()
    }

    /// Argument vectors observed so far, in arrival order.
    #[must_use]
    pub fn argv_history(&self) -> Vec<Vec<String>> {
        self.lock_history()
            .iter()
            .map(|recorded| recorded.argv.clone())
            .collect()
    }

    fn lock_history(&self) -> MutexGuard<'_, Vec<RecordedInvocation>> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, scope: &ExecutionScope, invocation: CommandInvocation) -> CommandOutcome {
        let scope_cancelled = scope.is_cancelled();
        self.lock_history().push(RecordedInvocation {
            argv: invocation.argv(),
            scope_cancelled,
        });
        if scope_cancelled {
            return CommandOutcome::new(&invocation, CommandStatus::Cancelled);
        }

        let program = invocation.program().to_string_lossy().into_owned();
        if let Some(delay) = self.delays.get(&program).copied()
            && timeout_at(scope.deadline(), sleep(delay)).await.is_err()
        {
            return CommandOutcome::new(&invocation, CommandStatus::DeadlineExceeded);
        }

        let status = self
            .statuses
            .get(&program)
            .cloned()
            .unwrap_or(CommandStatus::Succeeded);
        CommandOutcome::new(&invocation, status)
    }
}
