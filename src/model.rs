//! Core data model.
//!
//! A job is one production run: either a full image-to-video pipeline or a
//! UGC image batch. Jobs have identity, a coarse status, a human-readable
//! progress string, and exactly one of result/error once terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Length of one generated video clip, in seconds. The upstream video model
/// produces slightly longer clips; each is trimmed down to this.
pub const DEFAULT_CLIP_SECONDS: u32 = 7;

/// Number of image variants produced by a UGC job.
pub const UGC_VARIANTS: usize = 4;

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// One production run tracked by the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique identifier. Assigned at creation, never reused.
    pub id: JobId,

    /// Which pipeline this job runs.
    pub kind: JobKind,

    /// Current lifecycle status.
    pub status: JobStatus,

    /// Current-activity string. Display only, never program logic.
    pub progress: String,

    /// Final artifacts and summary metrics. Present only once completed.
    pub result: Option<JobOutput>,

    /// First fatal error message. Present only once failed.
    pub error: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(kind: JobKind) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            kind,
            status: JobStatus::Created,
            progress: "Initializing...".to_string(),
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move the job to a new status. Transitions must be monotonic through
    /// the stage sequence; anything else is an [`Error::InvalidTransition`].
    pub fn advance(&mut self, to: JobStatus) -> Result<()> {
        if !self.status.can_transition_to(to) {
            return Err(Error::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_progress(&mut self, progress: impl Into<String>) {
        self.progress = progress.into();
        self.updated_at = Utc::now();
    }

    /// Terminal success: store the output and freeze the record.
    pub fn complete(&mut self, output: JobOutput) -> Result<()> {
        self.advance(JobStatus::Completed)?;
        self.result = Some(output);
        Ok(())
    }

    /// Terminal failure: store the first fatal error and freeze the record.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<()> {
        self.advance(JobStatus::Failed)?;
        self.error = Some(message.into());
        Ok(())
    }
}

/// Newtype for job IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Short display: first 8 chars of UUID
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

/// Which pipeline a job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Image → narrated, lip-synced video.
    Video,
    /// Person photo + product photo → four UGC-style images.
    Ugc,
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Pipeline stage. Ordered; a running job only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    // Video pipeline
    Script,
    Audio,
    Clips,
    Assembly,
    LipSync,
    // UGC pipeline
    Prompts,
    Images,
}

impl Stage {
    /// Position in the stage sequence. Transitions must strictly increase.
    /// The two pipelines never share a job, so their ranks may overlap.
    fn rank(self) -> u8 {
        match self {
            Stage::Script => 1,
            Stage::Audio => 2,
            Stage::Clips => 3,
            Stage::Assembly => 4,
            Stage::LipSync => 5,
            Stage::Prompts => 1,
            Stage::Images => 2,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Script => "script",
            Stage::Audio => "audio",
            Stage::Clips => "clips",
            Stage::Assembly => "assembly",
            Stage::LipSync => "lipsync",
            Stage::Prompts => "prompts",
            Stage::Images => "images",
        };
        write!(f, "{s}")
    }
}

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Created, pipeline not yet started.
    Created,
    /// Pipeline executing the named stage.
    Running(Stage),
    /// Done successfully. Terminal.
    Completed,
    /// A stage failed; the job was abandoned. Terminal.
    Failed,
}

impl JobStatus {
    /// Can transition from self to `to`?
    ///
    /// Stages never run twice and never regress; failure is reachable from
    /// any non-terminal status; terminal statuses are frozen.
    pub fn can_transition_to(self, to: JobStatus) -> bool {
        use JobStatus::*;
        match (self, to) {
            (Completed | Failed, _) => false,
            (Created, Running(_)) | (Created, Failed) => true,
            (Running(a), Running(b)) => b.rank() > a.rank(),
            (Running(_), Completed) | (Running(_), Failed) => true,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Created => write!(f, "created"),
            JobStatus::Running(stage) => write!(f, "running:{stage}"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Final artifacts of a completed job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutput {
    Video {
        final_video: PathBuf,
        duration_secs: f64,
        clips_generated: usize,
    },
    Ugc {
        images: Vec<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

/// Structured narration script produced by the vision capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    /// Full narration text.
    pub script_text: String,
    /// The model's estimate of spoken length, in seconds. Advisory only —
    /// the real duration is measured from the synthesized audio.
    pub estimated_duration: f64,
    /// Ordered segments: intro, body, outro.
    pub segments: Vec<Segment>,
}

impl Script {
    /// Schema validation beyond what serde enforces. The pipeline relies on
    /// the first segment being the intro, the last being the outro, and a
    /// body segment existing between them.
    pub fn validate(&self) -> Result<()> {
        if self.script_text.trim().is_empty() {
            return Err(Error::Parse("script_text is empty".to_string()));
        }
        if self.segments.len() < 3 {
            return Err(Error::Parse(format!(
                "expected at least 3 segments (intro, body, outro), got {}",
                self.segments.len()
            )));
        }
        if self.segments[0].kind != SegmentKind::Intro {
            return Err(Error::Parse("first segment is not an intro".to_string()));
        }
        if self.segments[self.segments.len() - 1].kind != SegmentKind::Outro {
            return Err(Error::Parse("last segment is not an outro".to_string()));
        }
        Ok(())
    }
}

/// One segment of the script, carrying the generation prompt for its clips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    #[serde(rename = "type")]
    pub kind: SegmentKind,
    pub description: String,
    /// Intended sub-duration in seconds. Segment durations approximately
    /// sum to the target total.
    pub duration: f64,
    /// Prompt for the image-to-video capability.
    pub prompt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Intro,
    Body,
    Outro,
}

/// Voice configuration for speech synthesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub model: String,
    pub stability: f64,
    pub similarity_boost: f64,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            model: "aura-asteria-en".to_string(),
            stability: 0.5,
            similarity_boost: 0.75,
        }
    }
}

// ---------------------------------------------------------------------------
// Clip math
// ---------------------------------------------------------------------------

/// How many clips are needed to cover `audio_secs` of narration.
///
/// Fixed only once the audio is synthesized and measured — the clip count is
/// never derived from the script's estimated duration.
pub fn required_clips(audio_secs: f64, clip_secs: u32) -> usize {
    (audio_secs / clip_secs as f64).ceil() as usize
}

/// Select the script segment for clip `index` (0-based) out of `total`.
///
/// First clip uses the intro, last clip the outro, everything in between
/// reuses the single body segment's prompt.
pub fn segment_for_clip(segments: &[Segment], index: usize, total: usize) -> &Segment {
    if index == 0 {
        &segments[0]
    } else if index == total - 1 {
        &segments[segments.len() - 1]
    } else {
        &segments[1]
    }
}
