//! HTTP surface: the chat and speak relays plus static UI serving.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::error;

use mentor_runtime::ChatRuntime;
use mentor_speech::{MurfClient, clean_for_speech};

#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<ChatRuntime>,
    pub speech: Arc<MurfClient>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SpeakRequest {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "voiceId")]
    voice_id: Option<String>,
}

type ApiResponse = (StatusCode, Json<Value>);

/// Build the axum router.  Anything that is not an API route falls back
/// to the static UI directory.
pub fn router(state: AppState, public_dir: &str) -> Router {
    Router::new()
        .route("/chat", post(handle_chat))
        .route("/speak", post(handle_speak))
        .fallback_service(ServeDir::new(public_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `POST /chat` — one chat turn.  Generation failures still answer 200
/// with the runtime's fallback reply; only a missing message (400) or an
/// unreadable memory store (500) break the contract.
async fn handle_chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> ApiResponse {
    let Some(message) = request.message.filter(|m| !m.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Message required" })),
        );
    };

    match state.runtime.handle_turn(&message).await {
        Ok(reply) => (StatusCode::OK, Json(json!({ "reply": reply }))),
        Err(error) => {
            error!(%error, "chat turn failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Chat processing failed" })),
            )
        }
    }
}

/// `POST /speak` — relay text to the speech service and answer with the
/// playable audio URL.  The text is cleaned here so the character rule
/// lives in one place regardless of caller.
async fn handle_speak(
    State(state): State<AppState>,
    Json(request): Json<SpeakRequest>,
) -> ApiResponse {
    let (Some(text), Some(voice_id)) = (
        request.text.filter(|t| !t.is_empty()),
        request.voice_id.filter(|v| !v.is_empty()),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Text and voiceId required" })),
        );
    };

    match state.speech.synthesize(&clean_for_speech(&text), &voice_id).await {
        Ok(audio) => (StatusCode::OK, Json(json!({ "audio": audio }))),
        Err(error) => {
            error!(%error, voice_id, "speech synthesis failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Voice generation failed" })),
            )
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use mentor_config::{MemoryConfig, SpeechConfig};
    use mentor_llm::{GenerateError, TextGenerator};
    use mentor_memory::FileStore;

    struct CannedGenerator(&'static str);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
            Ok(self.0.to_string())
        }
    }

    fn state_with(dir: &TempDir, reply: &'static str) -> AppState {
        let store = Arc::new(FileStore::new(dir.path().join("memory.json")));
        let runtime = Arc::new(ChatRuntime::new(
            Arc::new(CannedGenerator(reply)),
            store,
            &MemoryConfig::default(),
        ));
        AppState {
            runtime,
            speech: Arc::new(MurfClient::new(&SpeechConfig::default())),
        }
    }

    #[tokio::test]
    async fn chat_without_message_is_400() {
        let dir = TempDir::new().unwrap();
        let state = state_with(&dir, "unused");

        let (status, Json(body)) =
            handle_chat(State(state), Json(ChatRequest { message: None })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Message required");
    }

    #[tokio::test]
    async fn chat_with_empty_message_is_400() {
        let dir = TempDir::new().unwrap();
        let state = state_with(&dir, "unused");

        let (status, Json(body)) = handle_chat(
            State(state),
            Json(ChatRequest {
                message: Some(String::new()),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Message required");
    }

    #[tokio::test]
    async fn chat_answers_with_the_reply() {
        let dir = TempDir::new().unwrap();
        let state = state_with(&dir, "rust is a fine choice.");

        let (status, Json(body)) = handle_chat(
            State(state),
            Json(ChatRequest {
                message: Some("which language?".to_string()),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "rust is a fine choice.");
    }

    #[tokio::test]
    async fn speak_without_voice_id_is_400() {
        let dir = TempDir::new().unwrap();
        let state = state_with(&dir, "unused");

        let (status, Json(body)) = handle_speak(
            State(state),
            Json(SpeakRequest {
                text: Some("hi".to_string()),
                voice_id: None,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Text and voiceId required");
    }

    #[tokio::test]
    async fn speak_without_text_is_400() {
        let dir = TempDir::new().unwrap();
        let state = state_with(&dir, "unused");

        let (status, Json(body)) = handle_speak(
            State(state),
            Json(SpeakRequest {
                text: None,
                voice_id: Some("en-US-natalie".to_string()),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Text and voiceId required");
    }

    #[tokio::test]
    async fn chat_request_accepts_empty_body_object() {
        let request: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(request.message.is_none());
    }

    #[tokio::test]
    async fn speak_request_uses_camel_case_voice_id() {
        let request: SpeakRequest =
            serde_json::from_str(r#"{"text":"hi","voiceId":"en-US-terrell"}"#).unwrap();
        assert_eq!(request.voice_id.as_deref(), Some("en-US-terrell"));
    }
}
