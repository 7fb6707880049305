//! Vision/script capability: image + target duration → structured script.

use std::path::Path;

use serde_json::json;
use tracing::info;

use crate::capability::{CapabilityKind, ProviderClient, file_data_url};
use crate::error::{Error, Result};
use crate::model::Script;

const SCRIPT_MODEL: &str = "gpt-4o";

impl ProviderClient {
    /// Analyze `image` and generate a script for a `target_secs` video.
    pub async fn analyze_image(&self, image: &Path, target_secs: u32) -> Result<Script> {
        let image_url = file_data_url(image, "image/jpeg").await?;
        let body_secs = target_secs.saturating_sub(14);

        let instruction = format!(
            "Analyze this image and create a compelling {target_secs}-second video script. \
             The script should be engaging, descriptive, and suitable for narration.\n\
             Return ONLY valid JSON with this exact structure:\n\
             {{\n\
               \"script_text\": \"Full narration text here (approximately {target_secs} seconds when spoken)...\",\n\
               \"estimated_duration\": {target_secs},\n\
               \"segments\": [\n\
                 {{\"type\": \"intro\", \"description\": \"Opening shot showing...\", \"duration\": 7, \"prompt\": \"Cinematic opening shot of...\"}},\n\
                 {{\"type\": \"body\", \"description\": \"Main scene...\", \"duration\": {body_secs}, \"prompt\": \"Detailed scene showing...\"}},\n\
                 {{\"type\": \"outro\", \"description\": \"Closing shot...\", \"duration\": 7, \"prompt\": \"Final shot with...\"}}\n\
               ]\n\
             }}\n\
             Make the prompts detailed and visually descriptive for video generation."
        );

        let payload = json!({
            "model": SCRIPT_MODEL,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": instruction },
                    { "type": "image_url", "image_url": { "url": image_url } },
                ],
            }],
        });

        let reply = self
            .post_media(CapabilityKind::Script, "/v1/chat/completions", &payload)
            .await?;

        let content = reply["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| Error::Parse("script response has no message content".to_string()))?;

        let script = parse_script(content)?;
        info!(
            segments = script.segments.len(),
            estimated = script.estimated_duration,
            "script generated"
        );
        Ok(script)
    }
}

/// Parse a model reply into a [`Script`], tolerating a markdown code fence
/// around the JSON body but nothing looser than that.
pub fn parse_script(content: &str) -> Result<Script> {
    let raw = strip_code_fence(content);
    let script: Script =
        serde_json::from_str(raw).map_err(|e| Error::Parse(format!("bad script JSON: {e}")))?;
    script.validate()?;
    Ok(script)
}

/// Strip a surrounding ```json / ``` fence if present. Anything outside a
/// single fenced block is left to the JSON parser to reject.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the first newline.
    let rest = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SegmentKind;

    const VALID: &str = r#"{
        "script_text": "A quiet morning unfolds.",
        "estimated_duration": 21,
        "segments": [
            {"type": "intro", "description": "opening", "duration": 7, "prompt": "opening shot"},
            {"type": "body", "description": "main", "duration": 7, "prompt": "main scene"},
            {"type": "outro", "description": "closing", "duration": 7, "prompt": "closing shot"}
        ]
    }"#;

    #[test]
    fn parses_bare_json() {
        let script = parse_script(VALID).unwrap();
        assert_eq!(script.segments.len(), 3);
        assert_eq!(script.segments[0].kind, SegmentKind::Intro);
        assert_eq!(script.segments[2].kind, SegmentKind::Outro);
    }

    #[test]
    fn parses_fenced_json() {
        let fenced = format!("```json\n{VALID}\n```");
        assert!(parse_script(&fenced).is_ok());

        let plain_fence = format!("```\n{VALID}\n```");
        assert!(parse_script(&plain_fence).is_ok());
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_script("not json at all").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn rejects_wrong_segment_order() {
        let swapped = r#"{
            "script_text": "text",
            "estimated_duration": 21,
            "segments": [
                {"type": "body", "description": "d", "duration": 7, "prompt": "p"},
                {"type": "intro", "description": "d", "duration": 7, "prompt": "p"},
                {"type": "outro", "description": "d", "duration": 7, "prompt": "p"}
            ]
        }"#;
        assert!(matches!(parse_script(swapped), Err(Error::Parse(_))));
    }

    #[test]
    fn rejects_too_few_segments() {
        let two = r#"{
            "script_text": "text",
            "estimated_duration": 14,
            "segments": [
                {"type": "intro", "description": "d", "duration": 7, "prompt": "p"},
                {"type": "outro", "description": "d", "duration": 7, "prompt": "p"}
            ]
        }"#;
        assert!(matches!(parse_script(two), Err(Error::Parse(_))));
    }
}
