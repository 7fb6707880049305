//! Pipeline sequencers.
//!
//! A pipeline drives one job through its stage sequence, updating the
//! registry after every transition. Submission spawns a background task and
//! returns the job id immediately; status queries read the registry and
//! never block on execution.

pub mod ugc;
pub mod video;

pub use ugc::UgcRequest;
pub use video::ProduceRequest;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::error;

use crate::assemble::MediaAssembler;
use crate::capability::MediaCapabilities;
use crate::error::{Error, Result};
use crate::model::{JobId, JobStatus, Stage};
use crate::registry::JobRegistry;
use crate::telemetry::{job, metrics};

/// Drives both production workflows against one capability client, one
/// assembler, and one registry.
pub struct Pipeline<C, A> {
    caps: Arc<C>,
    assembler: Arc<A>,
    registry: JobRegistry,
    work_dir: PathBuf,
    clip_seconds: u32,
}

impl<C, A> Clone for Pipeline<C, A> {
    fn clone(&self) -> Self {
        Self {
            caps: Arc::clone(&self.caps),
            assembler: Arc::clone(&self.assembler),
            registry: self.registry.clone(),
            work_dir: self.work_dir.clone(),
            clip_seconds: self.clip_seconds,
        }
    }
}

impl<C, A> Pipeline<C, A>
where
    C: MediaCapabilities + 'static,
    A: MediaAssembler + 'static,
{
    pub fn new(
        caps: Arc<C>,
        assembler: Arc<A>,
        registry: JobRegistry,
        work_dir: PathBuf,
        clip_seconds: u32,
    ) -> Self {
        Self {
            caps,
            assembler,
            registry,
            work_dir,
            clip_seconds,
        }
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    /// Per-job artifact directory. Namespacing by job id keeps concurrent
    /// jobs from clobbering each other's intermediate files.
    pub(crate) fn job_dir(&self, id: JobId) -> PathBuf {
        self.work_dir.join(format!("job-{}", id.0))
    }

    /// Advance the job into a running stage and set its progress text.
    pub(crate) fn enter_stage(&self, id: JobId, stage: Stage, progress: &str) -> Result<()> {
        metrics::stage_transitions().add(1, &[]);
        job::record_stage(&stage.to_string());
        self.registry.update(id, |job| {
            job.advance(JobStatus::Running(stage))?;
            job.set_progress(progress);
            Ok(())
        })
    }

    /// Convert a stage error into the job's terminal failed state. Errors
    /// from the registry itself are logged — there is nowhere left to store
    /// them.
    pub(crate) fn record_failure(&self, id: JobId, err: &Error) {
        error!(job = %id, "pipeline failed: {err}");
        if let Err(update_err) = self.registry.update(id, |job| job.fail(err.to_string())) {
            error!(job = %id, "could not record failure: {update_err}");
        }
    }
}
