//! Generic polling state machine for asynchronous capability tasks.
//!
//! A submitted task is polled at a fixed interval until it reaches a
//! terminal state or the attempt budget runs out. Status vocabulary and
//! result extraction differ per capability, so classification lives in the
//! task implementation, not here.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::capability::CapabilityKind;
use crate::error::{Error, Result};

/// Bounds on how long we wait for an asynchronous task.
/// Total wall-clock budget is roughly `interval * max_attempts`.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

/// One outstanding request to an asynchronous capability.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    /// Identifier returned by the external service on submission.
    pub task_id: String,
    pub submitted_at: DateTime<Utc>,
}

impl TaskHandle {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            submitted_at: Utc::now(),
        }
    }
}

/// Classified result of one status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    /// Not terminal yet. Includes a success status whose result reference
    /// has not shown up — keep polling until it does.
    Pending,
    /// Terminal success; carries the result reference (usually a URL).
    Done(String),
    /// Terminal failure; carries the upstream reason.
    Failed(String),
}

/// A submitted asynchronous task that can be polled for status.
pub trait PollableTask {
    fn kind(&self) -> CapabilityKind;

    /// Issue one status query and classify the response. Errors from this
    /// method are treated as transient (transport/decode trouble) and the
    /// poll loop moves on to the next attempt.
    fn check(&self) -> impl Future<Output = Result<TaskState>> + Send;
}

/// Poll `task` until terminal or the budget is exhausted.
///
/// Each attempt sleeps `interval` first, then queries; there is no
/// zero-delay first poll. Transient errors consume attempts exactly like
/// ordinary polls, so a flaky network can drain the entire budget.
pub async fn await_completion<T: PollableTask>(task: &T, config: &PollConfig) -> Result<String> {
    let kind = task.kind();

    for attempt in 1..=config.max_attempts {
        tokio::time::sleep(config.interval).await;

        match task.check().await {
            Ok(TaskState::Pending) => {
                debug!(%kind, attempt, max = config.max_attempts, "task still pending");
            }
            Ok(TaskState::Done(result)) => {
                debug!(%kind, attempt, "task completed");
                return Ok(result);
            }
            Ok(TaskState::Failed(reason)) => {
                return Err(Error::TaskFailed { kind, reason });
            }
            Err(e) => {
                warn!(%kind, attempt, "status query failed, will retry: {e}");
            }
        }
    }

    Err(Error::Timeout {
        kind,
        attempts: config.max_attempts,
    })
}
