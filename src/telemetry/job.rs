//! Job execution span helpers.
//!
//! Provides span creation and stage recording for jobs flowing through the
//! pipelines.

use tracing::Span;

use crate::model::JobId;

/// Start a span wrapping one job's entire pipeline execution.
///
/// The `job.stage` field is declared empty and is filled in by
/// [`record_stage`] as the pipeline advances.
pub fn start_job_span(pipeline: &str, job_id: &JobId) -> Span {
    tracing::info_span!(
        "job.execute",
        "job.pipeline" = pipeline,
        "job.id" = %job_id.0,
        "job.stage" = tracing::field::Empty,
    )
}

/// Record the stage the job just entered on the current job span.
pub fn record_stage(stage: &str) {
    let span = Span::current();
    span.record("job.stage", stage);
    tracing::info!(stage, "stage entered");
}
