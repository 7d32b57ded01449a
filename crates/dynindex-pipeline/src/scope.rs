//! Deadline-bound execution scope shared by every stage of one pipeline run.

use std::time::Duration;

use tokio::time::Instant;

// Used when `started + timeout` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

/// Execution scope that counts as cancelled once its deadline has passed.
///
/// The deadline is fixed when the scope is created; later stages inherit
/// whatever budget earlier stages left over.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionScope {
    started: Instant,
    deadline: Instant,
}

impl ExecutionScope {
    /// Create a scope that expires `timeout` from now.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        let started = Instant::now();
        let deadline = started
            .checked_add(timeout)
            .unwrap_or_else(|| started + FAR_FUTURE);
        Self { started, deadline }
    }

    /// Instant at which the scope is cancelled.
    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Whether the deadline has already passed.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Time since the scope was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
