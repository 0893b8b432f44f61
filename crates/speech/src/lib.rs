//! Speech synthesis relay: forwards cleaned text plus a voice identifier
//! to the Murf API and returns the playable audio URL it answers with.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use mentor_config::SpeechConfig;

// ── Error taxonomy ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("speech API returned HTTP {0}")]
    Http(reqwest::StatusCode),
    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("response carried no audio reference")]
    NoAudio,
}

// ── Text cleaning ────────────────────────────────────────────────────────────

fn disallowed_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s.,!?]").expect("valid regex"))
}

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

/// Strip everything outside word characters, whitespace, and `.,!?`, then
/// collapse whitespace runs to a single space.  Keeps synthesis input free
/// of markdown markers and emoji the voice would read out loud.
pub fn clean_for_speech(text: &str) -> String {
    let stripped = disallowed_chars().replace_all(text, "");
    whitespace_runs().replace_all(&stripped, " ").trim().to_string()
}

// ── Murf client ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MurfClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    format: String,
}

#[derive(Debug, Deserialize)]
struct SynthesizeResponse {
    #[serde(rename = "audioFile")]
    audio_file: Option<String>,
}

impl MurfClient {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            format: config.format.clone(),
        }
    }

    /// One synthesis call.  No retry; a response without an audio URL is an
    /// error the HTTP layer turns into its fixed 500 payload.
    pub async fn synthesize(&self, text: &str, voice_id: &str) -> Result<String, SpeechError> {
        let payload = json!({
            "text": text,
            "voiceId": voice_id,
            "format": self.format,
        });

        let response = self
            .http
            .post(&self.api_url)
            .header("api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, voice_id, "speech API rejected the request");
            return Err(SpeechError::Http(status));
        }

        let raw = response.text().await?;
        let body: SynthesizeResponse = serde_json::from_str(&raw)?;

        match body.audio_file {
            Some(url) => {
                debug!(voice_id, chars = text.len(), "synthesis succeeded");
                Ok(url)
            }
            None => Err(SpeechError::NoAudio),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
