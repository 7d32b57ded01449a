//! Request accounting middleware: counts responses per route and status code,
//! installs the request context for handler code and logs a one-line summary
//! naming the repository an `/index` call accepted.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use dynindex_telemetry::RequestContext;
use tracing::debug;

use crate::http::constants::HEADER_REQUEST_ID;
use crate::state::ApiState;

pub(crate) async fn track_request(
    State(state): State<Arc<ApiState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let route = req.extensions().get::<MatchedPath>().map_or_else(
        || req.uri().path().to_string(),
        |matched| matched.as_str().to_string(),
    );
    let request_id = req
        .headers()
        .get(HEADER_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let context = RequestContext::new(request_id, route);
    let response = context.clone().scope(next.run(req)).await;
    let status = response.status().as_u16();
    state.telemetry.inc_http_request(context.route(), status);
    debug!(
        request_id = context.request_id(),
        route = context.route(),
        repo_id = context.repo_id(),
        status,
        "request completed"
    );
    response
}
