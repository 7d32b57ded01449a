//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes only the counters the control surface and pipeline report on.

use std::convert::TryFrom;
use std::sync::Arc;
use std::time::Duration;

use prometheus::core::Collector;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{CollectorStep, Result, TelemetryError};

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    index_requests_total: IntCounterVec,
    pipeline_stages_total: IntCounterVec,
    pipeline_stage_failures_total: IntCounter,
    truncate_requests_total: IntCounterVec,
    pipeline_last_duration_ms: IntGauge,
}

/// Snapshot of selected gauges and counters for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Index requests that ran the pipeline to completion.
    pub index_completed_total: u64,
    /// Index requests rejected before or during the pipeline.
    pub index_rejected_total: u64,
    /// Pipeline stages that did not finish successfully.
    pub stage_failures_total: u64,
    /// Truncate requests that failed.
    pub truncate_failures_total: u64,
    /// Duration of the most recent pipeline run in milliseconds.
    pub pipeline_last_duration_ms: i64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be built or
    /// registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_requests_total = counter_vec(
            "http_requests_total",
            "Total HTTP requests received",
            &["route", "code"],
        )?;
        let index_requests_total = counter_vec(
            "index_requests_total",
            "Index requests by outcome",
            &["outcome"],
        )?;
        let pipeline_stages_total = counter_vec(
            "pipeline_stages_total",
            "Pipeline stages executed by status",
            &["stage", "status"],
        )?;
        let pipeline_stage_failures_total = IntCounter::with_opts(Opts::new(
            "pipeline_stage_failures_total",
            "Pipeline stages that did not exit successfully",
        ))
        .map_err(|source| {
            TelemetryError::collector("pipeline_stage_failures_total", CollectorStep::Build, source)
        })?;
        let truncate_requests_total = counter_vec(
            "truncate_requests_total",
            "Truncate requests by outcome",
            &["outcome"],
        )?;
        let pipeline_last_duration_ms = IntGauge::with_opts(Opts::new(
            "pipeline_last_duration_ms",
            "Wall-clock duration of the most recent pipeline run (ms)",
        ))
        .map_err(|source| {
            TelemetryError::collector("pipeline_last_duration_ms", CollectorStep::Build, source)
        })?;

        register(&registry, "http_requests_total", &http_requests_total)?;
        register(&registry, "index_requests_total", &index_requests_total)?;
        register(&registry, "pipeline_stages_total", &pipeline_stages_total)?;
        register(
            &registry,
            "pipeline_stage_failures_total",
            &pipeline_stage_failures_total,
        )?;
        register(&registry, "truncate_requests_total", &truncate_requests_total)?;
        register(
            &registry,
            "pipeline_last_duration_ms",
            &pipeline_last_duration_ms,
        )?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                index_requests_total,
                pipeline_stages_total,
                pipeline_stage_failures_total,
                truncate_requests_total,
                pipeline_last_duration_ms,
            }),
        })
    }

    /// Increment the HTTP request counter for the given route and status code.
    pub fn inc_http_request(&self, route: &str, status: u16) {
        self.inner
            .http_requests_total
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }

    /// Increment the index request counter (`completed`, `rejected`, ...).
    pub fn inc_index_request(&self, outcome: &str) {
        self.inner
            .index_requests_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Count one finished pipeline stage; unsuccessful stages also bump the failure total.
    pub fn record_pipeline_stage(&self, stage: &str, status: &str, succeeded: bool) {
        self.inner
            .pipeline_stages_total
            .with_label_values(&[stage, status])
            .inc();
        if !succeeded {
            self.inner.pipeline_stage_failures_total.inc();
        }
    }

    /// Increment the truncate request counter (`completed`, `failed`).
    pub fn inc_truncate_request(&self, outcome: &str) {
        self.inner
            .truncate_requests_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Record the duration of a finished pipeline run.
    pub fn observe_pipeline_duration(&self, duration: Duration) {
        self.inner
            .pipeline_last_duration_ms
            .set(Self::duration_to_ms(duration));
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::Exposition { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::ExpositionUtf8 { source })
    }

    /// Take a point-in-time snapshot of the most relevant gauges and counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            index_completed_total: self
                .inner
                .index_requests_total
                .with_label_values(&["completed"])
                .get(),
            index_rejected_total: self
                .inner
                .index_requests_total
                .with_label_values(&["rejected"])
                .get(),
            stage_failures_total: self.inner.pipeline_stage_failures_total.get(),
            truncate_failures_total: self
                .inner
                .truncate_requests_total
                .with_label_values(&["failed"])
                .get(),
            pipeline_last_duration_ms: self.inner.pipeline_last_duration_ms.get(),
        }
    }

    /// Convert a duration to milliseconds saturating at `i64::MAX`.
    pub(crate) fn duration_to_ms(duration: Duration) -> i64 {
        i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
    }
}

fn counter_vec(name: &'static str, help: &str, labels: &[&str]) -> Result<IntCounterVec> {
    IntCounterVec::new(Opts::new(name, help), labels)
        .map_err(|source| TelemetryError::collector(name, CollectorStep::Build, source))
}

fn register<C>(registry: &Registry, name: &'static str, collector: &C) -> Result<()>
where
    C: Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::collector(name, CollectorStep::Register, source))
}
