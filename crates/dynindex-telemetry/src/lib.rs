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

//! Telemetry primitives shared across the dynindex workspace.
//!
//! Layout: `init.rs` (subscriber installation), `context.rs` (span and
//! request context helpers), `layers.rs` (request-id middleware),
//! `metrics.rs` (Prometheus registry), `error.rs` (telemetry errors).

pub mod context;
pub mod error;
pub mod init;
pub mod layers;
pub mod metrics;

pub use context::{
    GlobalContextGuard, RequestContext, carry_request_context, current_request_context,
    record_repo_id,
};
pub use error::{CollectorStep, Result, TelemetryError};
pub use init::{LogFormat, LoggingConfig, build_sha, init_logging};
pub use layers::{REQUEST_ID_HEADER, RequestIdLayers, request_id_layers};
pub use metrics::{Metrics, MetricsSnapshot};
