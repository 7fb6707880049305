//! In-memory job registry.
//!
//! Process-wide mapping from job id to job record. The registry is the only
//! shared mutable state in the system: the pipeline task driving a job is
//! its sole writer, while status queries read snapshots at any time. Jobs do
//! not survive a process restart; expiry is a future extension point.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use crate::model::{Job, JobId, JobKind};

/// Shared handle to the job table. Cheap to clone; intended to be created
/// once at startup and passed to whatever surfaces job submission/queries.
#[derive(Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<JobId, Job>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new job record in `created` status and return its id.
    pub fn create(&self, kind: JobKind) -> JobId {
        let job = Job::new(kind);
        let id = job.id;
        let mut jobs = self.jobs.write().expect("job table lock poisoned");
        jobs.insert(id, job);
        id
    }

    /// Snapshot of a job record. Readers may observe a mid-pipeline state
    /// with `result`/`error` still unset.
    pub fn get(&self, id: JobId) -> Result<Job> {
        let jobs = self.jobs.read().expect("job table lock poisoned");
        jobs.get(&id).cloned().ok_or(Error::JobNotFound(id))
    }

    /// Apply a mutation to a job record under the lock.
    ///
    /// Terminal jobs are immutable; an update against one is an
    /// [`Error::InvalidTransition`]-class bug in the caller, surfaced as such
    /// by [`Job::advance`] — plain progress writes against a terminal job are
    /// rejected here.
    pub fn update<F>(&self, id: JobId, f: F) -> Result<()>
    where
        F: FnOnce(&mut Job) -> Result<()>,
    {
        let mut jobs = self.jobs.write().expect("job table lock poisoned");
        let job = jobs.get_mut(&id).ok_or(Error::JobNotFound(id))?;
        if job.status.is_terminal() {
            return Err(Error::Other(format!(
                "job {id} is {} and can no longer change",
                job.status
            )));
        }
        f(job)
    }

    /// Number of jobs currently tracked.
    pub fn len(&self) -> usize {
        self.jobs.read().expect("job table lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
