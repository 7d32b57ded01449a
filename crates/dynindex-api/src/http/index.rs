//! `POST /index`: decode the request and run the clone, fetch and index stages.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::StatusCode};
use dynindex_pipeline::{IndexRequest, PipelineReport};
use dynindex_telemetry::{Metrics, carry_request_context, record_repo_id};
use tracing::{Instrument, Span, error, info, warn};

use crate::http::errors::ApiError;
use crate::state::ApiState;

const OUTCOME_COMPLETED: &str = "completed";
const OUTCOME_REJECTED: &str = "rejected";

pub(crate) async fn index(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let request = IndexRequest::from_json(&body).map_err(|err| {
        warn!(error = %err, bytes = body.len(), "rejected index request");
        state.telemetry.inc_index_request(OUTCOME_REJECTED);
        ApiError::json_parser()
    })?;
    info!(repo_id = request.repo_id, clone_url = %request.clone_url, "index request accepted");
    record_repo_id(request.repo_id);

    // The run owns its task so a dropped connection cannot cut stages short.
    let driver = state.driver.clone();
    let telemetry = state.telemetry.clone();
    let run = tokio::spawn(
        carry_request_context(async move {
            let result = driver.run(&request).await;
            match &result {
                Ok(report) => {
                    record_report(&telemetry, report);
                    telemetry.inc_index_request(OUTCOME_COMPLETED);
                }
                Err(_) => telemetry.inc_index_request(OUTCOME_REJECTED),
            }
            result
        })
        .instrument(Span::current()),
    );

    match run.await {
        Ok(Ok(_)) => Ok(StatusCode::OK),
        Ok(Err(err)) => {
            warn!(error = %err, "index pipeline aborted");
            Err(ApiError::json_parser())
        }
        Err(err) => {
            error!(error = %err, "index pipeline task failed");
            Err(ApiError::internal())
        }
    }
}

fn record_report(telemetry: &Metrics, report: &PipelineReport) {
    for stage in &report.stages {
        telemetry.record_pipeline_stage(
            stage.stage.as_str(),
            stage.outcome.status.as_str(),
            stage.outcome.succeeded(),
        );
    }
    telemetry.observe_pipeline_duration(report.elapsed);
}
