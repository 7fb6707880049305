//! Tests for the in-memory job registry.

use reelsmith::error::Error;
use reelsmith::model::{JobId, JobKind, JobOutput, JobStatus, Stage};
use reelsmith::registry::JobRegistry;

#[test]
fn create_then_get_returns_created_job() {
    let registry = JobRegistry::new();
    let id = registry.create(JobKind::Video);

    let job = registry.get(id).unwrap();
    assert_eq!(job.id, id);
    assert_eq!(job.kind, JobKind::Video);
    assert_eq!(job.status, JobStatus::Created);
    assert!(job.result.is_none());
    assert!(job.error.is_none());
}

#[test]
fn unknown_id_is_not_found() {
    let registry = JobRegistry::new();
    let missing = JobId::new();

    match registry.get(missing) {
        Err(Error::JobNotFound(id)) => assert_eq!(id, missing),
        other => panic!("expected JobNotFound, got {other:?}"),
    }
}

#[test]
fn ids_are_unique_across_jobs() {
    let registry = JobRegistry::new();
    let a = registry.create(JobKind::Video);
    let b = registry.create(JobKind::Ugc);
    assert_ne!(a, b);
    assert_eq!(registry.len(), 2);
}

#[test]
fn updates_are_visible_to_subsequent_reads() {
    let registry = JobRegistry::new();
    let id = registry.create(JobKind::Video);

    registry
        .update(id, |job| {
            job.advance(JobStatus::Running(Stage::Script))?;
            job.set_progress("Analyzing image...");
            Ok(())
        })
        .unwrap();

    let job = registry.get(id).unwrap();
    assert_eq!(job.status, JobStatus::Running(Stage::Script));
    assert_eq!(job.progress, "Analyzing image...");
}

#[test]
fn invalid_transition_is_rejected_and_leaves_record_untouched() {
    let registry = JobRegistry::new();
    let id = registry.create(JobKind::Video);

    // Created → Completed skips every stage.
    let err = registry
        .update(id, |job| job.complete(JobOutput::Ugc { images: vec![] }))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { .. }));

    assert_eq!(registry.get(id).unwrap().status, JobStatus::Created);
}

#[test]
fn terminal_jobs_reject_further_updates() {
    let registry = JobRegistry::new();
    let id = registry.create(JobKind::Video);

    registry.update(id, |job| job.fail("upstream exploded")).unwrap();
    let job = registry.get(id).unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error.as_deref(), Some("upstream exploded"));

    let err = registry
        .update(id, |job| {
            job.set_progress("should never land");
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, Error::Other(_)));
    assert_eq!(registry.get(id).unwrap().progress, "Initializing...");
}

#[test]
fn cloned_handles_share_the_same_table() {
    let registry = JobRegistry::new();
    let handle = registry.clone();

    let id = registry.create(JobKind::Ugc);
    let job = handle.get(id).unwrap();
    assert_eq!(job.kind, JobKind::Ugc);
}
