//! Generation client: relays a composed prompt to the Gemini
//! `generateContent` API, trying an ordered list of model identifiers
//! until one yields a candidate.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use mentor_config::LlmConfig;

// ── Error taxonomy ───────────────────────────────────────────────────────────

/// Why a generation attempt produced no text.
///
/// Callers degrade every variant to the same user-facing fallback reply;
/// the distinction exists so the log line says whether the service was
/// down, rate-limited, or returned nonsense.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("generation API returned HTTP {0}")]
    Http(reqwest::StatusCode),
    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("response contained no candidates")]
    NoCandidates,
    #[error("every configured model failed")]
    Exhausted,
}

// ── Generator seam ───────────────────────────────────────────────────────────

/// Anything that can turn a prompt into text.  The chat runtime depends on
/// this seam rather than on [`GeminiClient`] directly so tests can script
/// replies and count calls.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

// ── Gemini client ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    models: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
            models: config.models.clone(),
        }
    }

    fn endpoint_for(&self, model: &str) -> String {
        format!(
            "{}/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            model
        )
    }

    /// One attempt against one model.  No retry, no timeout beyond the
    /// transport default.
    async fn generate_with_model(&self, model: &str, prompt: &str) -> Result<String, GenerateError> {
        let payload = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .http
            .post(self.endpoint_for(model))
            .header("X-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerateError::Http(status));
        }

        // Read the body as text first so a nonsense payload is reported as
        // Malformed rather than folded into the transport error.
        let raw = response.text().await?;
        let body: GenerateContentResponse = serde_json::from_str(&raw)?;

        let Some(candidate) = body.candidates.first() else {
            return Err(GenerateError::NoCandidates);
        };

        Ok(join_parts(&candidate.content.parts))
    }
}

/// Concatenate a candidate's text fragments with a single space.
fn join_parts(parts: &[Part]) -> String {
    parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl TextGenerator for GeminiClient {
    /// Try each configured model in order; first candidate wins.  Per-model
    /// failures are logged and swallowed so the next identifier gets its
    /// shot; only when the whole list is spent does the caller see an error.
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        for model in &self.models {
            match self.generate_with_model(model, prompt).await {
                Ok(text) => {
                    debug!(model, reply_len = text.len(), "generation succeeded");
                    return Ok(text);
                }
                Err(error) => {
                    warn!(model, %error, "model attempt failed, trying next");
                }
            }
        }
        Err(GenerateError::Exhausted)
    }
}

// ── Structured reply extraction ──────────────────────────────────────────────

/// Pull a JSON object out of a model reply.
///
/// Models asked to "respond ONLY in JSON" still tend to wrap the object in
/// a fenced code block or surround it with prose, so a strict whole-string
/// parse would reject most real replies.  Two strategies, in order:
/// a fenced ```json block, then the span from the first `{` to the last
/// `}`.  Returns `None` when neither yields valid JSON of the requested
/// shape.
pub fn extract_json_reply<T: serde::de::DeserializeOwned>(reply: &str) -> Option<T> {
    if let Some(block) = fenced_json_block(reply) {
        if let Ok(value) = serde_json::from_str(block) {
            return Some(value);
        }
    }

    let trimmed = reply.trim();
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&trimmed[start..=end]).ok()
}

/// The contents of the first ```json fence, if the reply has one.
fn fenced_json_block(reply: &str) -> Option<&str> {
    let after_open = reply.split_once("```json")?.1;
    let body = after_open.trim_start();
    let (block, _) = body.split_once("```")?;
    Some(block.trim())
}

// ── Tests ────────────────────────────────────────────────────────────────────
