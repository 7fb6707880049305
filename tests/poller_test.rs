//! Tests for the generic polling state machine.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use reelsmith::capability::CapabilityKind;
use reelsmith::error::{Error, Result};
use reelsmith::poller::{PollConfig, PollableTask, TaskState, await_completion};

/// A task whose status responses are scripted in advance. Once the script
/// runs out it keeps answering Pending.
struct ScriptedTask {
    responses: Mutex<VecDeque<Result<TaskState>>>,
    polls: AtomicU32,
}

impl ScriptedTask {
    fn new(responses: Vec<Result<TaskState>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            polls: AtomicU32::new(0),
        }
    }

    fn poll_count(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }
}

impl PollableTask for ScriptedTask {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Clip
    }

    async fn check(&self) -> Result<TaskState> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(TaskState::Pending))
    }
}

fn fast(max_attempts: u32) -> PollConfig {
    PollConfig {
        interval: Duration::from_millis(1),
        max_attempts,
    }
}

// ---------------------------------------------------------------------------
// Success paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn five_pending_polls_then_result() {
    let task = ScriptedTask::new(vec![
        Ok(TaskState::Pending),
        Ok(TaskState::Pending),
        Ok(TaskState::Pending),
        Ok(TaskState::Pending),
        Ok(TaskState::Pending),
        Ok(TaskState::Done("https://cdn.example/out.mp4".to_string())),
    ]);

    let result = await_completion(&task, &fast(10)).await.unwrap();
    assert_eq!(result, "https://cdn.example/out.mp4");
    assert_eq!(task.poll_count(), 6);
}

#[tokio::test]
async fn immediate_completion_still_polls_once() {
    let task = ScriptedTask::new(vec![Ok(TaskState::Done("ref".to_string()))]);

    let result = await_completion(&task, &fast(1)).await.unwrap();
    assert_eq!(result, "ref");
    assert_eq!(task.poll_count(), 1);
}

// ---------------------------------------------------------------------------
// Failure paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn never_terminal_times_out_at_budget() {
    let task = ScriptedTask::new(vec![]);

    let err = await_completion(&task, &fast(4)).await.unwrap_err();
    match err {
        Error::Timeout { kind, attempts } => {
            assert_eq!(kind, CapabilityKind::Clip);
            assert_eq!(attempts, 4);
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
    // Exactly the budget — never more.
    assert_eq!(task.poll_count(), 4);
}

#[tokio::test]
async fn terminal_failure_surfaces_as_task_failed() {
    let task = ScriptedTask::new(vec![
        Ok(TaskState::Pending),
        Ok(TaskState::Failed("content policy".to_string())),
    ]);

    let err = await_completion(&task, &fast(10)).await.unwrap_err();
    match err {
        Error::TaskFailed { reason, .. } => assert_eq!(reason, "content policy"),
        other => panic!("expected TaskFailed, got {other:?}"),
    }
    // Failure stops the loop early.
    assert_eq!(task.poll_count(), 2);
}

#[tokio::test]
async fn transport_errors_are_retried_but_consume_attempts() {
    // Three transport failures against a budget of three: the loop retries
    // through all of them and the budget is gone before the task could ever
    // report success. This is the documented flaky-network limitation.
    let task = ScriptedTask::new(vec![
        Err(Error::Other("connection reset".to_string())),
        Err(Error::Other("connection reset".to_string())),
        Err(Error::Other("connection reset".to_string())),
        Ok(TaskState::Done("never reached".to_string())),
    ]);

    let err = await_completion(&task, &fast(3)).await.unwrap_err();
    assert!(matches!(err, Error::Timeout { attempts: 3, .. }));
    assert_eq!(task.poll_count(), 3);
}

#[tokio::test]
async fn transport_error_then_success_within_budget() {
    let task = ScriptedTask::new(vec![
        Err(Error::Other("connection reset".to_string())),
        Ok(TaskState::Done("ref".to_string())),
    ]);

    let result = await_completion(&task, &fast(5)).await.unwrap();
    assert_eq!(result, "ref");
    assert_eq!(task.poll_count(), 2);
}
