//! Router construction and server host for the API.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::Request,
    middleware,
    routing::{get, post},
};
use dynindex_config::ServiceConfig;
use dynindex_pipeline::{CommandRunner, PipelineDriver};
use dynindex_telemetry::{Metrics, build_sha, request_id_layers};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{Span, info};

use crate::error::{ApiServerError, ApiServerResult};
use crate::http::constants::HEADER_REQUEST_ID;
use crate::http::health::{health, metrics};
use crate::http::index::index;
use crate::http::telemetry::track_request;
use crate::http::truncate::truncate;
use crate::state::ApiState;

/// Axum router wrapper hosting the index control surface.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Build the router for `config`, running pipeline stages through `runner`.
    #[must_use]
    pub fn new(config: ServiceConfig, runner: Arc<dyn CommandRunner>, telemetry: Metrics) -> Self {
        let driver = PipelineDriver::new(&config, runner);
        let state = Arc::new(ApiState::new(config, driver, telemetry));

        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(HEADER_REQUEST_ID)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("")
                    .to_string();

                tracing::info_span!(
                    "http.request",
                    method = %request.method(),
                    route = %request.uri().path(),
                    request_id = %request_id,
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &Span| {
                    span.record("status_code", response.status().as_u16());
                    let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                    span.record("latency_ms", latency_ms);
                },
            );
        let layered = ServiceBuilder::new()
            .layer(request_id_layers())
            .layer(trace_layer)
            .layer(middleware::from_fn_with_state(
                Arc::clone(&state),
                track_request,
            ));

        let router = Router::new()
            .route("/index", post(index))
            .route("/truncate", post(truncate))
            .route("/health", get(health))
            .route("/metrics", get(metrics))
            .route_layer(layered)
            .with_state(state);

        Self { router }
    }

    /// Router with all routes and layers attached.
    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Bind `addr` and serve requests until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError::Bind`] when the address cannot be bound and
    /// [`ApiServerError::Serve`] when the server stops with an IO error.
    pub async fn serve(self, addr: &str) -> ApiServerResult<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ApiServerError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        let bound = listener
            .local_addr()
            .map_or_else(|_| addr.to_string(), |local| local.to_string());
        info!(addr = %bound, "listening");
        axum::serve(listener, self.router.into_make_service())
            .await
            .map_err(|source| ApiServerError::Serve {
                addr: bound,
                source,
            })
    }
}
