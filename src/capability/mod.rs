//! External capability clients.
//!
//! Each generation/analysis service is an opaque capability reached over
//! request/response. Synchronous capabilities (script, speech, prompts, UGC
//! images) are a single call; asynchronous ones (clip, lip-sync) submit a
//! task and go through the poller. One file per capability; the shared HTTP
//! plumbing lives here.

pub mod audio;
pub mod clip;
pub mod lipsync;
pub mod script;
pub mod ugc;

use std::path::Path;
use std::time::{Duration, Instant};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{Script, VoiceSettings};
use crate::poller::PollConfig;
use crate::telemetry::metrics;

/// Closed set of capability tags, carried in errors and spans so a failure
/// names the service that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    Script,
    Speech,
    Clip,
    LipSync,
    PromptVariator,
    UgcImage,
}

impl std::fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CapabilityKind::Script => "script",
            CapabilityKind::Speech => "speech",
            CapabilityKind::Clip => "clip",
            CapabilityKind::LipSync => "lipsync",
            CapabilityKind::PromptVariator => "prompt-variator",
            CapabilityKind::UgcImage => "ugc-image",
        };
        write!(f, "{s}")
    }
}

/// The shared capability-invocation interface the sequencers drive.
///
/// Capabilities are selected explicitly by the pipeline, never discovered
/// dynamically. Tests substitute fakes at this seam.
pub trait MediaCapabilities: Send + Sync {
    /// Analyze the source image and produce a structured narration script.
    fn generate_script(
        &self,
        image: &Path,
        target_secs: u32,
    ) -> impl Future<Output = Result<Script>> + Send;

    /// Synthesize narration audio, writing the byte stream to `dest`.
    /// Duration is deliberately not returned — callers measure it from the
    /// file.
    fn synthesize_speech(
        &self,
        text: &str,
        voice: &VoiceSettings,
        dest: &Path,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Generate one video clip from the image and prompt, downloading the
    /// raw result to `dest`. Blocks through submission, polling, and fetch.
    fn generate_clip(
        &self,
        image: &Path,
        prompt: &str,
        index: usize,
        dest: &Path,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Lip-sync the assembled video against the narration audio, downloading
    /// the final result to `dest`.
    fn lip_sync(
        &self,
        video: &Path,
        audio: &Path,
        dest: &Path,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Produce the four diverse UGC prompts for a base intent.
    fn vary_prompts(&self, intent: &str) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Generate one UGC-style image from a person photo, a product photo and
    /// a prompt, saving it to `dest`.
    fn generate_ugc_image(
        &self,
        person: &Path,
        product: &Path,
        prompt: &str,
        dest: &Path,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// HTTP client for the real providers: one media API (bearer auth) and one
/// lip-sync API (x-api-key auth).
pub struct ProviderClient {
    http: reqwest::Client,
    media_base: String,
    media_key: SecretString,
    sync_base: String,
    sync_key: SecretString,
    /// Poll bounds for clip generation (80-100s typical completion).
    pub clip_poll: PollConfig,
    /// Poll bounds for lip-sync. Deliberately a much shorter budget.
    pub lipsync_poll: PollConfig,
}

impl ProviderClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            http,
            media_base: config.media_api_base.trim_end_matches('/').to_string(),
            media_key: config.media_api_key.clone(),
            sync_base: config.sync_api_base.trim_end_matches('/').to_string(),
            sync_key: config.sync_api_key.clone(),
            clip_poll: PollConfig {
                interval: Duration::from_secs(10),
                max_attempts: 120,
            },
            lipsync_poll: PollConfig {
                interval: Duration::from_secs(10),
                max_attempts: 10,
            },
        })
    }

    /// POST a JSON body to a media-API route, returning the decoded JSON.
    /// Non-success responses become [`Error::Capability`] with the upstream
    /// body attached.
    pub(crate) async fn post_media<B: Serialize + ?Sized>(
        &self,
        kind: CapabilityKind,
        route: &str,
        body: &B,
    ) -> Result<serde_json::Value> {
        let started = Instant::now();
        let response = self
            .http
            .post(format!("{}{route}", self.media_base))
            .bearer_auth(self.media_key.expose_secret())
            .json(body)
            .send()
            .await?;
        record_duration(kind, started);
        expect_success(kind, response).await
    }

    /// Same as [`post_media`], but the response body is raw bytes (audio).
    pub(crate) async fn post_media_bytes<B: Serialize + ?Sized>(
        &self,
        kind: CapabilityKind,
        route: &str,
        body: &B,
    ) -> Result<Vec<u8>> {
        let started = Instant::now();
        let response = self
            .http
            .post(format!("{}{route}", self.media_base))
            .bearer_auth(self.media_key.expose_secret())
            .json(body)
            .send()
            .await?;
        record_duration(kind, started);
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Capability {
                kind,
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// POST to the lip-sync API. The service returns 200 or 201 on accepted
    /// submissions.
    pub(crate) async fn post_sync<B: Serialize + ?Sized>(
        &self,
        kind: CapabilityKind,
        route: &str,
        body: &B,
    ) -> Result<serde_json::Value> {
        let started = Instant::now();
        let response = self
            .http
            .post(format!("{}{route}", self.sync_base))
            .header("x-api-key", self.sync_key.expose_secret())
            .json(body)
            .send()
            .await?;
        record_duration(kind, started);
        expect_success(kind, response).await
    }

    /// GET a media-API route (status polls).
    pub(crate) async fn get_media(
        &self,
        kind: CapabilityKind,
        route: &str,
    ) -> Result<serde_json::Value> {
        let started = Instant::now();
        let response = self
            .http
            .get(format!("{}{route}", self.media_base))
            .bearer_auth(self.media_key.expose_secret())
            .send()
            .await?;
        record_duration(kind, started);
        expect_success(kind, response).await
    }

    /// GET a lip-sync-API route (status polls).
    pub(crate) async fn get_sync(
        &self,
        kind: CapabilityKind,
        route: &str,
    ) -> Result<serde_json::Value> {
        let started = Instant::now();
        let response = self
            .http
            .get(format!("{}{route}", self.sync_base))
            .header("x-api-key", self.sync_key.expose_secret())
            .send()
            .await?;
        record_duration(kind, started);
        expect_success(kind, response).await
    }

    /// Fetch a result artifact and write it to `dest`. A non-success
    /// response is fatal — result references are not retried.
    pub(crate) async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await?;
        tokio::fs::write(dest, &bytes).await?;
        Ok(())
    }
}

impl MediaCapabilities for ProviderClient {
    async fn generate_script(&self, image: &Path, target_secs: u32) -> Result<Script> {
        self.analyze_image(image, target_secs).await
    }

    async fn synthesize_speech(&self, text: &str, voice: &VoiceSettings, dest: &Path) -> Result<()> {
        self.speak(text, voice, dest).await
    }

    async fn generate_clip(
        &self,
        image: &Path,
        prompt: &str,
        index: usize,
        dest: &Path,
    ) -> Result<()> {
        self.render_clip(image, prompt, index, dest).await
    }

    async fn lip_sync(&self, video: &Path, audio: &Path, dest: &Path) -> Result<()> {
        self.sync_lips(video, audio, dest).await
    }

    async fn vary_prompts(&self, intent: &str) -> Result<Vec<String>> {
        self.variate_prompts(intent).await
    }

    async fn generate_ugc_image(
        &self,
        person: &Path,
        product: &Path,
        prompt: &str,
        dest: &Path,
    ) -> Result<()> {
        self.render_ugc_image(person, product, prompt, dest).await
    }
}

fn record_duration(kind: CapabilityKind, started: Instant) {
    metrics::capability_duration_ms().record(
        started.elapsed().as_secs_f64() * 1000.0,
        &[opentelemetry::KeyValue::new("capability", kind.to_string())],
    );
}

async fn expect_success(
    kind: CapabilityKind,
    response: reqwest::Response,
) -> Result<serde_json::Value> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Capability {
            kind,
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        });
    }
    Ok(response.json().await?)
}

/// Read a local file and embed it as a `data:` URL. Inputs are transmitted
/// as embedded payloads, never as externally hosted URLs.
pub(crate) async fn file_data_url(path: &Path, mime: &str) -> Result<String> {
    let bytes = read_input(path).await?;
    Ok(format!("data:{mime};base64,{}", BASE64.encode(bytes)))
}

/// Read a local file and return its bare base64 encoding.
pub(crate) async fn file_base64(path: &Path) -> Result<String> {
    let bytes = read_input(path).await?;
    Ok(BASE64.encode(bytes))
}

async fn read_input(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(Error::MissingInput(path.to_path_buf()));
    }
    Ok(tokio::fs::read(path).await?)
}
