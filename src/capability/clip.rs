//! Image-to-video capability: asynchronous clip generation.

use std::path::Path;

use serde_json::{Value, json};
use tracing::info;

use crate::capability::{CapabilityKind, ProviderClient, file_data_url};
use crate::error::{Error, Result};
use crate::poller::{PollableTask, TaskHandle, TaskState, await_completion};

const CLIP_MODEL: &str = "google/veo-3.1-i2v";

/// The video model emits 8-second clips regardless of the requested pacing;
/// the assembler trims each one down afterwards.
const SUBMITTED_CLIP_SECONDS: u32 = 8;

impl ProviderClient {
    /// Generate one clip: submit, poll to completion, download the raw
    /// result to `dest`.
    pub async fn render_clip(
        &self,
        image: &Path,
        prompt: &str,
        index: usize,
        dest: &Path,
    ) -> Result<()> {
        let handle = self.submit_clip(image, prompt).await?;
        info!(clip = index, task_id = %handle.task_id, "clip task submitted");

        let task = ClipTask {
            client: self,
            handle: &handle,
        };
        let url = await_completion(&task, &self.clip_poll).await?;

        info!(clip = index, %url, "downloading clip");
        self.download(&url, dest).await
    }

    /// Submit a clip-generation task and return its handle.
    pub async fn submit_clip(&self, image: &Path, prompt: &str) -> Result<TaskHandle> {
        let image_url = file_data_url(image, "image/jpeg").await?;
        let payload = json!({
            "model": CLIP_MODEL,
            "prompt": format!("{prompt}. Maintain visual consistency. No audio."),
            "image_url": image_url,
            "aspect_ratio": "16:9",
            "duration": SUBMITTED_CLIP_SECONDS,
            "resolution": "1080p",
            "generate_audio": false,
        });

        let reply = self
            .post_media(CapabilityKind::Clip, "/v1/video/generate", &payload)
            .await?;

        let task_id = reply["id"]
            .as_str()
            .ok_or_else(|| Error::Parse("clip submission returned no task id".to_string()))?;
        Ok(TaskHandle::new(task_id))
    }
}

/// Poll adapter for an outstanding clip task.
pub struct ClipTask<'a> {
    pub client: &'a ProviderClient,
    pub handle: &'a TaskHandle,
}

impl PollableTask for ClipTask<'_> {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Clip
    }

    async fn check(&self) -> Result<TaskState> {
        let status = self
            .client
            .get_media(
                CapabilityKind::Clip,
                &format!("/v1/video/generate/{}", self.handle.task_id),
            )
            .await?;
        Ok(classify_clip_status(&status))
    }
}

/// Classify one status response from the video service.
///
/// Vocabulary: `complete`/`completed` succeed, `failed`/`error` fail,
/// anything else keeps polling. A success status without a result URL yet is
/// still pending. Provider versions disagree on the result field name, so
/// `video_url` is tried before `output_url` — first present value wins.
pub fn classify_clip_status(response: &Value) -> TaskState {
    let status = response["status"].as_str().unwrap_or_default();
    match status {
        "complete" | "completed" => {
            let url = ["video_url", "output_url"]
                .iter()
                .find_map(|field| response[field].as_str());
            match url {
                Some(url) => TaskState::Done(url.to_string()),
                None => TaskState::Pending,
            }
        }
        "failed" | "error" => {
            let reason = response["error"].as_str().unwrap_or("Unknown error");
            TaskState::Failed(reason.to_string())
        }
        _ => TaskState::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_is_pending() {
        let state = classify_clip_status(&json!({"status": "processing"}));
        assert_eq!(state, TaskState::Pending);
    }

    #[test]
    fn completed_with_video_url() {
        let state = classify_clip_status(&json!({
            "status": "completed",
            "video_url": "https://cdn.example/a.mp4",
        }));
        assert_eq!(state, TaskState::Done("https://cdn.example/a.mp4".into()));
    }

    #[test]
    fn video_url_wins_over_output_url() {
        let state = classify_clip_status(&json!({
            "status": "complete",
            "video_url": "https://cdn.example/primary.mp4",
            "output_url": "https://cdn.example/secondary.mp4",
        }));
        assert_eq!(
            state,
            TaskState::Done("https://cdn.example/primary.mp4".into())
        );
    }

    #[test]
    fn output_url_used_when_video_url_absent() {
        let state = classify_clip_status(&json!({
            "status": "completed",
            "output_url": "https://cdn.example/b.mp4",
        }));
        assert_eq!(state, TaskState::Done("https://cdn.example/b.mp4".into()));
    }

    #[test]
    fn completed_without_url_keeps_polling() {
        let state = classify_clip_status(&json!({"status": "completed"}));
        assert_eq!(state, TaskState::Pending);
    }

    #[test]
    fn failed_carries_upstream_error() {
        let state = classify_clip_status(&json!({
            "status": "failed",
            "error": "content policy",
        }));
        assert_eq!(state, TaskState::Failed("content policy".into()));
    }

    #[test]
    fn error_without_message_uses_placeholder() {
        let state = classify_clip_status(&json!({"status": "error"}));
        assert_eq!(state, TaskState::Failed("Unknown error".into()));
    }

    #[test]
    fn uppercase_status_is_not_terminal_here() {
        // The video service documents a lowercase vocabulary; uppercase
        // variants belong to the lip-sync service only.
        let state = classify_clip_status(&json!({"status": "COMPLETED"}));
        assert_eq!(state, TaskState::Pending);
    }
}
