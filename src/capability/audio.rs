//! Text-to-speech capability: narration text → audio file on disk.

use std::path::Path;

use serde_json::json;
use tracing::info;

use crate::capability::{CapabilityKind, ProviderClient};
use crate::error::Result;
use crate::model::VoiceSettings;

impl ProviderClient {
    /// Synthesize `text` with the configured voice, writing the raw audio
    /// stream to `dest`.
    ///
    /// The response carries no usable duration field; callers must measure
    /// the produced file themselves before sizing the clip plan.
    pub async fn speak(&self, text: &str, voice: &VoiceSettings, dest: &Path) -> Result<()> {
        let payload = json!({
            "model": voice.model,
            "text": text,
        });

        let bytes = self
            .post_media_bytes(CapabilityKind::Speech, "/v1/audio/speech", &payload)
            .await?;

        tokio::fs::write(dest, &bytes).await?;
        info!(bytes = bytes.len(), path = %dest.display(), "narration audio written");
        Ok(())
    }
}
