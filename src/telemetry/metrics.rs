//! Metric instrument factories for reelsmith.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! All instruments are created lazily from the `"reelsmith"` meter.

use opentelemetry::metrics::{Counter, Histogram, Meter};

/// Returns the shared meter for reelsmith instruments.
fn meter() -> Meter {
    opentelemetry::global::meter("reelsmith")
}

/// Counter: number of production jobs submitted.
pub fn jobs_submitted() -> Counter<u64> {
    meter()
        .u64_counter("reelsmith.jobs.submitted")
        .with_description("Number of production jobs submitted")
        .build()
}

/// Counter: job stage transitions.
pub fn stage_transitions() -> Counter<u64> {
    meter()
        .u64_counter("reelsmith.jobs.stage_transitions")
        .with_description("Number of job stage transitions")
        .build()
}

/// Counter: video clips generated across all jobs.
pub fn clips_generated() -> Counter<u64> {
    meter()
        .u64_counter("reelsmith.clips.generated")
        .with_description("Number of video clips generated")
        .build()
}

/// Histogram: external capability call duration in milliseconds.
pub fn capability_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("reelsmith.capability.duration_ms")
        .with_description("External capability call duration in milliseconds")
        .with_unit("ms")
        .build()
}
