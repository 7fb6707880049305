//! The image-to-video sequencer.
//!
//! Stage order is fixed: script → audio → clips×N → assembly → lip-sync.
//! No stage is skipped, none is retried; the first error abandons the job.
//! Clip count is only known once the narration audio has been measured.

use std::path::PathBuf;

use tracing::{Instrument, info};

use crate::assemble::MediaAssembler;
use crate::capability::MediaCapabilities;
use crate::error::{Error, Result};
use crate::model::{
    JobId, JobKind, JobOutput, Stage, VoiceSettings, required_clips, segment_for_clip,
};
use crate::telemetry::job::start_job_span;
use crate::telemetry::metrics;

use super::Pipeline;

/// Inputs for one video production run.
#[derive(Debug, Clone)]
pub struct ProduceRequest {
    /// Source image; read locally and embedded into capability requests.
    pub image: PathBuf,
    /// Target narration length in seconds.
    pub target_secs: u32,
    pub voice: VoiceSettings,
}

impl<C, A> Pipeline<C, A>
where
    C: MediaCapabilities + 'static,
    A: MediaAssembler + 'static,
{
    /// Submit a video production job. Returns immediately; the pipeline runs
    /// out-of-band and the returned id is queryable at once.
    pub fn spawn_video(&self, request: ProduceRequest) -> JobId {
        let id = self.registry().create(JobKind::Video);
        metrics::jobs_submitted().add(1, &[]);

        let pipeline = self.clone();
        tokio::spawn(async move {
            let span = start_job_span("video", &id);
            async {
                match pipeline.execute_video(id, &request).await {
                    Ok(output) => {
                        let result = pipeline.registry().update(id, |job| {
                            job.set_progress("Video production complete!");
                            job.complete(output)
                        });
                        if let Err(e) = result {
                            pipeline.record_failure(id, &e);
                        } else {
                            info!(job = %id, "video production completed");
                        }
                    }
                    Err(e) => pipeline.record_failure(id, &e),
                }
            }
            .instrument(span)
            .await;
        });

        id
    }

    async fn execute_video(&self, id: JobId, request: &ProduceRequest) -> Result<JobOutput> {
        let dir = self.job_dir(id);
        tokio::fs::create_dir_all(&dir).await?;

        // Script
        self.enter_stage(id, Stage::Script, "Analyzing image and writing script...")?;
        let script = self
            .caps
            .generate_script(&request.image, request.target_secs)
            .await?;

        // Audio. The measured file duration, not the script's estimate,
        // fixes the clip count.
        self.enter_stage(id, Stage::Audio, "Generating narration audio...")?;
        let audio_path = dir.join("narration.mp3");
        self.caps
            .synthesize_speech(&script.script_text, &request.voice, &audio_path)
            .await?;
        let audio_secs = self.assembler.probe_duration(&audio_path).await?;
        let total = required_clips(audio_secs, self.clip_seconds);
        info!(job = %id, audio_secs, clips = total, "clip plan fixed");

        // Clips, strictly in order. Any single failure aborts the job.
        self.enter_stage(id, Stage::Clips, "Generating video clips...")?;
        let mut clip_paths: Vec<PathBuf> = Vec::with_capacity(total);
        for index in 0..total {
            let segment = segment_for_clip(&script.segments, index, total);
            let raw = dir.join(format!("clip_{:02}_raw.mp4", index + 1));
            self.caps
                .generate_clip(&request.image, &segment.prompt, index + 1, &raw)
                .await?;

            let trimmed = dir.join(format!("clip_{:02}.mp4", index + 1));
            self.assembler
                .trim_clip(&raw, &trimmed, self.clip_seconds)
                .await?;
            clip_paths.push(trimmed);

            metrics::clips_generated().add(1, &[]);
            self.registry().update(id, |job| {
                job.set_progress(format!("Generated clip {}/{total}", index + 1));
                Ok(())
            })?;
        }

        // Assembly. Every input is checked here, before the assembler is
        // invoked at all.
        self.enter_stage(id, Stage::Assembly, "Assembling video with audio...")?;
        for clip in &clip_paths {
            if !clip.exists() {
                return Err(Error::MissingInput(clip.clone()));
            }
        }
        if !audio_path.exists() {
            return Err(Error::MissingInput(audio_path.clone()));
        }
        let assembled = dir.join("assembled.mp4");
        self.assembler
            .concat_with_audio(&clip_paths, &audio_path, &assembled)
            .await?;

        // Lip-sync — the downloaded result is the final artifact.
        self.enter_stage(id, Stage::LipSync, "Applying lip synchronization...")?;
        let final_video = dir.join("final_synced.mp4");
        self.caps
            .lip_sync(&assembled, &audio_path, &final_video)
            .await?;

        Ok(JobOutput::Video {
            final_video,
            duration_secs: audio_secs,
            clips_generated: total,
        })
    }
}
