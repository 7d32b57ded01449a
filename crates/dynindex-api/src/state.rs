//! Shared state handed to every handler.

use dynindex_config::ServiceConfig;
use dynindex_pipeline::PipelineDriver;
use dynindex_telemetry::Metrics;

pub(crate) struct ApiState {
    pub(crate) config: ServiceConfig,
    pub(crate) driver: PipelineDriver,
    pub(crate) telemetry: Metrics,
}

impl ApiState {
    pub(crate) const fn new(config: ServiceConfig, driver: PipelineDriver, telemetry: Metrics) -> Self {
        Self {
            config,
            driver,
            telemetry,
        }
    }
}
