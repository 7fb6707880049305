//! Error types for reelsmith.

use std::path::PathBuf;

use thiserror::Error;

use crate::capability::CapabilityKind;
use crate::model::{JobId, JobStatus};

#[derive(Debug, Error)]
pub enum Error {
    /// A synchronous capability call returned a non-success status.
    /// The upstream response body is preserved for diagnosis.
    #[error("{kind} request failed with status {status}: {body}")]
    Capability {
        kind: CapabilityKind,
        status: u16,
        body: String,
    },

    /// An asynchronous capability reported a terminal failure status.
    #[error("{kind} task failed: {reason}")]
    TaskFailed {
        kind: CapabilityKind,
        reason: String,
    },

    /// The poll attempt budget ran out without a terminal status.
    #[error("{kind} task did not complete within {attempts} poll attempts")]
    Timeout { kind: CapabilityKind, attempts: u32 },

    /// A result reference was obtained but the artifact could not be fetched.
    #[error("download of {url} failed with status {status}")]
    DownloadFailed { url: String, status: u16 },

    /// A structured response did not match the expected schema.
    #[error("malformed response: {0}")]
    Parse(String),

    /// A required upstream artifact is absent on disk.
    #[error("required input file is missing: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("job not found: {0}")]
    JobNotFound(JobId),

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("config error: {0}")]
    Config(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
