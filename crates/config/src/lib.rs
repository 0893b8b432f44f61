use std::env;
use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

// ── Server ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen port.  Overridden at runtime by the `PORT` environment
    /// variable when set.
    pub port: u16,
    /// Directory of static UI assets served at the router fallback.
    pub public_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            public_dir: "public".to_string(),
        }
    }
}

// ── Generation service ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the generation API.
    pub api_base: String,
    /// Ordered model identifiers.  Tried in order; the first model that
    /// yields a candidate wins.
    pub models: Vec<String>,
    /// API credential.  The `GEMINI_API_KEY` environment variable takes
    /// precedence over the config file value.
    pub api_key: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1".to_string(),
            models: vec![
                "models/gemini-2.5-flash".to_string(),
                "models/gemini-2.5-flash-lite".to_string(),
            ],
            api_key: String::new(),
        }
    }
}

// ── Speech synthesis ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Speech-synthesis endpoint URL.
    pub api_url: String,
    /// Requested audio encoding.
    pub format: String,
    /// API credential.  The `MURF_API_KEY` environment variable takes
    /// precedence over the config file value.
    pub api_key: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.murf.ai/v1/speech/generate".to_string(),
            format: "mp3".to_string(),
            api_key: String::new(),
        }
    }
}

// ── Memory ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Path of the persisted memory document.
    pub path: String,
    /// Messages longer than this many characters always trigger a memory
    /// check.
    pub long_message_chars: usize,
    /// A memory check also runs on every Nth turn regardless of content.
    pub check_turn_interval: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            path: "memory.json".to_string(),
            long_message_chars: 60,
            check_turn_interval: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// ── Top-level config ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub speech: SpeechConfig,
    pub memory: MemoryConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file is absent, then apply environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = fs::read_to_string(path) {
            config = toml::from_str(&raw)?;
        }

        if let Ok(key) = env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                config.llm.api_key = key;
            }
        }

        if let Ok(key) = env::var("MURF_API_KEY") {
            if !key.is_empty() {
                config.speech.api_key = key;
            }
        }

        if let Ok(port) = env::var("PORT") {
            if let Ok(port) = port.parse() {
                config.server.port = port;
            }
        }

        Ok(config)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let rendered = toml::to_string_pretty(self)?;
        fs::write(path, rendered)?;
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
