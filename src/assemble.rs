//! Media assembly: trim, concatenate, mux, probe.
//!
//! Treated as an external collaborator behind a trait; the shipped
//! implementation shells out to ffmpeg/ffprobe. Inputs are checked
//! explicitly — a missing file fails loudly, never a silent truncation.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Contract the pipeline consumes for clip trimming, final assembly, and
/// audio measurement.
pub trait MediaAssembler: Send + Sync {
    /// Trim `input` down to `seconds` and strip its audio track, writing the
    /// result to `output`.
    fn trim_clip(
        &self,
        input: &Path,
        output: &Path,
        seconds: u32,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Concatenate the ordered clips and mux the narration audio on top,
    /// trimming to the shorter of the two streams.
    fn concat_with_audio(
        &self,
        clips: &[PathBuf],
        audio: &Path,
        output: &Path,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Measure a media file's duration in seconds.
    fn probe_duration(&self, path: &Path) -> impl Future<Output = Result<f64>> + Send;
}

/// ffmpeg/ffprobe-backed assembler.
#[derive(Debug, Clone, Default)]
pub struct FfmpegAssembler;

impl MediaAssembler for FfmpegAssembler {
    async fn trim_clip(&self, input: &Path, output: &Path, seconds: u32) -> Result<()> {
        require_file(input)?;
        debug!(input = %input.display(), seconds, "trimming clip");

        run_ffmpeg(
            Command::new("ffmpeg")
                .arg("-y")
                .arg("-i")
                .arg(input)
                .args(["-t", &seconds.to_string(), "-an"])
                .args(["-c:v", "libx264", "-preset", "medium", "-crf", "23"])
                .arg(output),
        )
        .await
    }

    async fn concat_with_audio(
        &self,
        clips: &[PathBuf],
        audio: &Path,
        output: &Path,
    ) -> Result<()> {
        for clip in clips {
            require_file(clip)?;
        }
        require_file(audio)?;

        // Concat demuxer needs a list file; keep it next to the output.
        let list_path = output.with_extension("concat.txt");
        let mut list = String::new();
        for clip in clips {
            list.push_str(&format!("file '{}'\n", clip.display()));
        }
        tokio::fs::write(&list_path, list).await?;

        let combined = output.with_extension("combined.mp4");
        run_ffmpeg(
            Command::new("ffmpeg")
                .arg("-y")
                .args(["-f", "concat", "-safe", "0"])
                .arg("-i")
                .arg(&list_path)
                .args(["-c", "copy"])
                .arg(&combined),
        )
        .await?;

        info!(clips = clips.len(), "clips concatenated, attaching audio");

        run_ffmpeg(
            Command::new("ffmpeg")
                .arg("-y")
                .arg("-i")
                .arg(&combined)
                .arg("-i")
                .arg(audio)
                .args(["-c:v", "libx264", "-c:a", "aac"])
                .arg("-shortest")
                .args(["-preset", "medium", "-crf", "23"])
                .arg(output),
        )
        .await
    }

    async fn probe_duration(&self, path: &Path) -> Result<f64> {
        require_file(path)?;

        let out = Command::new("ffprobe")
            .args(["-v", "error"])
            .args(["-show_entries", "format=duration"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(path)
            .output()
            .await?;

        if !out.status.success() {
            return Err(Error::Other(format!(
                "ffprobe failed on {}: {}",
                path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        let text = String::from_utf8_lossy(&out.stdout);
        text.trim()
            .parse::<f64>()
            .map_err(|e| Error::Parse(format!("unparseable ffprobe duration '{}': {e}", text.trim())))
    }
}

fn require_file(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::MissingInput(path.to_path_buf()))
    }
}

async fn run_ffmpeg(cmd: &mut Command) -> Result<()> {
    let out = cmd.output().await?;
    if out.status.success() {
        Ok(())
    } else {
        Err(Error::Other(format!(
            "ffmpeg exited with status {}: {}",
            out.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&out.stderr).trim()
        )))
    }
}
