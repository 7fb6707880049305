//! Lip-sync capability: asynchronous, with its own status vocabulary.

use std::path::Path;

use serde_json::{Value, json};
use tracing::info;

use crate::capability::{CapabilityKind, ProviderClient, file_base64};
use crate::error::{Error, Result};
use crate::poller::{PollableTask, TaskHandle, TaskState, await_completion};

const LIPSYNC_MODEL: &str = "sync-1.9.0-beta";

impl ProviderClient {
    /// Lip-sync `video` against `audio`, downloading the result to `dest`.
    pub async fn sync_lips(&self, video: &Path, audio: &Path, dest: &Path) -> Result<()> {
        let handle = self.submit_lipsync(video, audio).await?;
        info!(task_id = %handle.task_id, "lip-sync task submitted");

        let task = LipSyncTask {
            client: self,
            handle: &handle,
        };
        let url = await_completion(&task, &self.lipsync_poll).await?;

        info!(%url, "downloading lip-synced video");
        self.download(&url, dest).await
    }

    /// Submit a lip-sync task and return its handle. Both inputs travel as
    /// embedded base64 payloads.
    pub async fn submit_lipsync(&self, video: &Path, audio: &Path) -> Result<TaskHandle> {
        let payload = json!({
            "model": LIPSYNC_MODEL,
            "input": {
                "video": file_base64(video).await?,
                "audio": file_base64(audio).await?,
            },
        });

        let reply = self
            .post_sync(CapabilityKind::LipSync, "/v2/generate", &payload)
            .await?;

        let task_id = reply["id"]
            .as_str()
            .ok_or_else(|| Error::Parse(format!("lip-sync submission returned no id: {reply}")))?;
        Ok(TaskHandle::new(task_id))
    }
}

/// Poll adapter for an outstanding lip-sync task.
pub struct LipSyncTask<'a> {
    pub client: &'a ProviderClient,
    pub handle: &'a TaskHandle,
}

impl PollableTask for LipSyncTask<'_> {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::LipSync
    }

    async fn check(&self) -> Result<TaskState> {
        let status = self
            .client
            .get_sync(
                CapabilityKind::LipSync,
                &format!("/v2/generate/{}", self.handle.task_id),
            )
            .await?;
        Ok(classify_lipsync_status(&status))
    }
}

/// Classify one status response from the lip-sync service.
///
/// The vocabulary is case-insensitive: COMPLETED/COMPLETE succeed;
/// FAILED/REJECTED/CANCELLED/ERROR fail. Result field priority is
/// `output_url`, then `outputUrl`, then `video_url`.
pub fn classify_lipsync_status(response: &Value) -> TaskState {
    let status = response["status"]
        .as_str()
        .unwrap_or_default()
        .to_uppercase();
    match status.as_str() {
        "COMPLETED" | "COMPLETE" => {
            let url = ["output_url", "outputUrl", "video_url"]
                .iter()
                .find_map(|field| response[field].as_str());
            match url {
                Some(url) => TaskState::Done(url.to_string()),
                None => TaskState::Pending,
            }
        }
        "FAILED" | "REJECTED" | "CANCELLED" | "ERROR" => {
            let reason = response["error"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| format!("lip-sync failed with status: {status}"));
            TaskState::Failed(reason)
        }
        _ => TaskState::Pending,
    }
}
