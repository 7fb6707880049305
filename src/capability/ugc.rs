//! UGC capabilities: prompt variation and product-image generation.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::capability::{CapabilityKind, ProviderClient, file_data_url};
use crate::error::{Error, Result};
use crate::model::UGC_VARIANTS;

const VARIATOR_MODEL: &str = "gpt-4o";
const UGC_IMAGE_MODEL: &str = "nano-banana-pro-edit";

#[derive(Debug, Deserialize)]
struct PromptBatch {
    prompts: Vec<String>,
}

impl ProviderClient {
    /// Ask the language model for four diverse UGC prompts built from one
    /// base intent.
    pub async fn variate_prompts(&self, intent: &str) -> Result<Vec<String>> {
        let instruction = format!(
            "Generate {UGC_VARIANTS} diverse prompts for user-generated-content style \
             product photos, all grounded in this intent: \"{intent}\". Vary the setting, \
             pose, and mood between prompts. Return ONLY valid JSON of the form \
             {{\"prompts\": [\"...\", \"...\", \"...\", \"...\"]}}."
        );

        let payload = json!({
            "model": VARIATOR_MODEL,
            "messages": [{ "role": "user", "content": instruction }],
        });

        let reply = self
            .post_media(CapabilityKind::PromptVariator, "/v1/chat/completions", &payload)
            .await?;

        let content = reply["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| Error::Parse("prompt variation reply has no content".to_string()))?;

        parse_prompts(content)
    }

    /// Generate one UGC image from the person and product photos plus a
    /// prompt, saving it to `dest`. Synchronous: one request, one image.
    pub async fn render_ugc_image(
        &self,
        person: &Path,
        product: &Path,
        prompt: &str,
        dest: &Path,
    ) -> Result<()> {
        let payload = json!({
            "model": UGC_IMAGE_MODEL,
            "prompt": prompt,
            "person_image_url": file_data_url(person, "image/jpeg").await?,
            "product_image_url": file_data_url(product, "image/jpeg").await?,
        });

        let reply = self
            .post_media(CapabilityKind::UgcImage, "/v1/images/generations", &payload)
            .await?;

        // Newer provider versions return a URL, older ones inline base64.
        let first = &reply["images"][0];
        if let Some(url) = first["url"].as_str() {
            self.download(url, dest).await?;
        } else if let Some(b64) = first["b64_json"].as_str() {
            let bytes = BASE64
                .decode(b64)
                .map_err(|e| Error::Parse(format!("bad base64 image payload: {e}")))?;
            tokio::fs::write(dest, bytes).await?;
        } else {
            return Err(Error::Parse(format!(
                "image response has neither url nor b64_json: {reply}"
            )));
        }

        info!(path = %dest.display(), "ugc image saved");
        Ok(())
    }
}

/// Parse the variator reply. Requires exactly [`UGC_VARIANTS`] non-empty
/// prompts; anything else is a schema violation.
pub fn parse_prompts(content: &str) -> Result<Vec<String>> {
    let raw = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    let batch: PromptBatch =
        serde_json::from_str(raw).map_err(|e| Error::Parse(format!("bad prompt JSON: {e}")))?;
    if batch.prompts.len() != UGC_VARIANTS {
        return Err(Error::Parse(format!(
            "expected {UGC_VARIANTS} prompts, got {}",
            batch.prompts.len()
        )));
    }
    if batch.prompts.iter().any(|p| p.trim().is_empty()) {
        return Err(Error::Parse("prompt variation contains an empty prompt".to_string()));
    }
    Ok(batch.prompts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_four_prompts() {
        let prompts =
            parse_prompts(r#"{"prompts": ["a", "b", "c", "d"]}"#).unwrap();
        assert_eq!(prompts, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn parses_fenced_reply() {
        let fenced = "```json\n{\"prompts\": [\"a\", \"b\", \"c\", \"d\"]}\n```";
        assert_eq!(parse_prompts(fenced).unwrap().len(), 4);
    }

    #[test]
    fn rejects_wrong_count() {
        assert!(matches!(
            parse_prompts(r#"{"prompts": ["a", "b"]}"#),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn rejects_empty_prompt() {
        assert!(matches!(
            parse_prompts(r#"{"prompts": ["a", "", "c", "d"]}"#),
            Err(Error::Parse(_))
        ));
    }
}
