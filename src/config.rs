//! Typed configuration from environment variables.
//!
//! Loads once at startup, fails fast if required vars are missing.
//! API keys are wrapped in secrecy::SecretString to prevent log leaks.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::{Error, Result};

/// Default base URL for the media generation API (script, speech, video, images).
pub const DEFAULT_MEDIA_API_BASE: &str = "https://api.aimlapi.com";

/// Default base URL for the lip-sync API.
pub const DEFAULT_SYNC_API_BASE: &str = "https://api.sync.so";

#[derive(Debug)]
pub struct Config {
    pub media_api_key: SecretString,
    pub sync_api_key: SecretString,
    pub media_api_base: String,
    pub sync_api_base: String,
    /// Directory for per-job intermediate and final artifacts.
    pub work_dir: PathBuf,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            media_api_key: SecretString::from(required_var("MEDIA_API_KEY")?),
            sync_api_key: SecretString::from(required_var("SYNC_API_KEY")?),
            media_api_base: std::env::var("MEDIA_API_BASE")
                .unwrap_or_else(|_| DEFAULT_MEDIA_API_BASE.to_string()),
            sync_api_base: std::env::var("SYNC_API_BASE")
                .unwrap_or_else(|_| DEFAULT_SYNC_API_BASE.to_string()),
            work_dir: std::env::var("REELSMITH_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./media_work")),
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| Error::Config(format!("required environment variable {name} is not set")))
}
