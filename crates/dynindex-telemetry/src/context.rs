//! Process and per-request context for log lines.
//!
//! # Design
//! - The process span carries the service name and build for every event.
//! - Each control request gets a [`RequestContext`] in task-local storage. The
//!   `/index` handler records the repository it accepted so the request
//!   summary can name it even though decoding happens inside the handler.
//! - Pipeline runs are spawned onto their own task; [`carry_request_context`]
//!   moves the context across that boundary.

use std::future::Future;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{Span, span::Entered};

use crate::init::build_sha;

/// Guard that keeps the process-level span entered for its lifetime.
pub struct GlobalContextGuard {
    _guard: Entered<'static>,
}

impl GlobalContextGuard {
    /// Enter the process-level tracing span for the lifetime of the guard.
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        let service = service.into();
        let span: &'static Span = Box::leak(Box::new(
            tracing::info_span!("app", service = %service, build_sha = %build_sha()),
        ));
        let guard = span.enter();
        Self { _guard: guard }
    }
}

/// Identity of one control request.
///
/// Clones share the recorded repository id, so a value recorded inside a
/// spawned pipeline task is visible to the middleware that created the
/// context.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Arc<str>,
    route: Arc<str>,
    repo_id: Arc<OnceCell<u32>>,
}

impl RequestContext {
    /// Context for a request with the given `x-request-id` and matched route.
    #[must_use]
    pub fn new(request_id: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            request_id: Arc::from(request_id.into()),
            route: Arc::from(route.into()),
            repo_id: Arc::new(OnceCell::new()),
        }
    }

    /// Value of the `x-request-id` header.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Matched route, or the raw path when nothing matched.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Repository named by an accepted `/index` body.
    #[must_use]
    pub fn repo_id(&self) -> Option<u32> {
        self.repo_id.get().copied()
    }

    /// Run `fut` with this context installed.
    pub async fn scope<F>(self, fut: F) -> F::Output
    where
        F: Future,
    {
        ACTIVE_REQUEST_CONTEXT.scope(self, fut).await
    }
}

/// Context of the enclosing request, if any.
#[must_use]
pub fn current_request_context() -> Option<RequestContext> {
    ACTIVE_REQUEST_CONTEXT.try_with(Clone::clone).ok()
}

/// Attach `repo_id` to the enclosing request.
///
/// Ignored outside a request. The first recorded value wins.
pub fn record_repo_id(repo_id: u32) {
    let _ = ACTIVE_REQUEST_CONTEXT.try_with(|context| context.repo_id.set(repo_id));
}

/// Wrap `fut` so it runs under the context that is current right now.
///
/// Use when handing work to `tokio::spawn`, which does not inherit
/// task-local values.
pub fn carry_request_context<F>(fut: F) -> impl Future<Output = F::Output>
where
    F: Future,
{
    let context = current_request_context();
    async move {
        match context {
            Some(context) => context.scope(fut).await,
            None => fut.await,
        }
    }
}

tokio::task_local! {
    static ACTIVE_REQUEST_CONTEXT: RequestContext;
}
