//! Unit tests for the job model, clip math, and segment selection.

use reelsmith::model::*;

fn segments() -> Vec<Segment> {
    vec![
        Segment {
            kind: SegmentKind::Intro,
            description: "opening".to_string(),
            duration: 7.0,
            prompt: "intro prompt".to_string(),
        },
        Segment {
            kind: SegmentKind::Body,
            description: "main".to_string(),
            duration: 7.0,
            prompt: "body prompt".to_string(),
        },
        Segment {
            kind: SegmentKind::Outro,
            description: "closing".to_string(),
            duration: 7.0,
            prompt: "outro prompt".to_string(),
        },
    ]
}

// ---------------------------------------------------------------------------
// Clip math
// ---------------------------------------------------------------------------

#[test]
fn exact_multiples_need_exactly_that_many_clips() {
    assert_eq!(required_clips(7.0, 7), 1);
    assert_eq!(required_clips(14.0, 7), 2);
    assert_eq!(required_clips(21.0, 7), 3);
    assert_eq!(required_clips(70.0, 7), 10);
}

#[test]
fn non_multiples_round_up() {
    assert_eq!(required_clips(22.4, 7), 4);
    assert_eq!(required_clips(7.1, 7), 2);
    assert_eq!(required_clips(20.9, 7), 3);
}

// ---------------------------------------------------------------------------
// Segment selection
// ---------------------------------------------------------------------------

#[test]
fn three_clips_map_to_intro_body_outro() {
    let segs = segments();
    assert_eq!(segment_for_clip(&segs, 0, 3).prompt, "intro prompt");
    assert_eq!(segment_for_clip(&segs, 1, 3).prompt, "body prompt");
    assert_eq!(segment_for_clip(&segs, 2, 3).prompt, "outro prompt");
}

#[test]
fn middle_clips_all_reuse_the_body_segment() {
    let segs = segments();
    let total = 6;
    assert_eq!(segment_for_clip(&segs, 0, total).kind, SegmentKind::Intro);
    for index in 1..total - 1 {
        assert_eq!(segment_for_clip(&segs, index, total).kind, SegmentKind::Body);
    }
    assert_eq!(
        segment_for_clip(&segs, total - 1, total).kind,
        SegmentKind::Outro
    );
}

#[test]
fn two_clips_use_only_intro_and_outro() {
    let segs = segments();
    assert_eq!(segment_for_clip(&segs, 0, 2).kind, SegmentKind::Intro);
    assert_eq!(segment_for_clip(&segs, 1, 2).kind, SegmentKind::Outro);
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

#[test]
fn status_advances_through_the_stage_sequence() {
    let mut job = Job::new(JobKind::Video);
    assert_eq!(job.status, JobStatus::Created);

    for stage in [
        Stage::Script,
        Stage::Audio,
        Stage::Clips,
        Stage::Assembly,
        Stage::LipSync,
    ] {
        job.advance(JobStatus::Running(stage)).unwrap();
        assert_eq!(job.status, JobStatus::Running(stage));
    }

    job.complete(JobOutput::Video {
        final_video: "out.mp4".into(),
        duration_secs: 21.0,
        clips_generated: 3,
    })
    .unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.result.is_some());
}

#[test]
fn status_never_regresses() {
    let mut job = Job::new(JobKind::Video);
    job.advance(JobStatus::Running(Stage::Audio)).unwrap();

    assert!(job.advance(JobStatus::Running(Stage::Script)).is_err());
    assert!(job.advance(JobStatus::Running(Stage::Audio)).is_err());
    assert!(job.advance(JobStatus::Created).is_err());
}

#[test]
fn terminal_statuses_are_frozen() {
    let mut completed = Job::new(JobKind::Video);
    completed.advance(JobStatus::Running(Stage::Script)).unwrap();
    completed
        .complete(JobOutput::Ugc { images: vec![] })
        .unwrap();
    assert!(completed.advance(JobStatus::Running(Stage::Audio)).is_err());
    assert!(completed.fail("late failure").is_err());

    let mut failed = Job::new(JobKind::Video);
    failed.fail("early failure").unwrap();
    assert_eq!(failed.status, JobStatus::Failed);
    assert_eq!(failed.error.as_deref(), Some("early failure"));
    assert!(failed.advance(JobStatus::Running(Stage::Script)).is_err());
}

#[test]
fn failure_is_reachable_from_any_running_stage() {
    for stage in [Stage::Script, Stage::Clips, Stage::LipSync, Stage::Prompts] {
        let mut job = Job::new(JobKind::Video);
        job.advance(JobStatus::Running(stage)).unwrap();
        job.fail("boom").unwrap();
        assert_eq!(job.status, JobStatus::Failed);
    }
}

#[test]
fn status_display_is_queryable_text() {
    assert_eq!(JobStatus::Created.to_string(), "created");
    assert_eq!(JobStatus::Running(Stage::Clips).to_string(), "running:clips");
    assert_eq!(JobStatus::Completed.to_string(), "completed");
    assert_eq!(JobStatus::Failed.to_string(), "failed");
}
