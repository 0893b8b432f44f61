//! Chat turn orchestration: compose the prompt from persona + memory +
//! user message, relay it to the generation client, and conditionally run
//! the memory-extraction flow as a second, independent call.

mod extractor;
mod triggers;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use tracing::{debug, warn};

use mentor_config::MemoryConfig;
use mentor_llm::TextGenerator;
use mentor_memory::{MemoryDocument, MemoryStore};

pub use triggers::{TRIGGER_KEYWORDS, should_check_memory};

/// Served whenever the generation client comes back empty-handed.
pub const FALLBACK_REPLY: &str = "Quota khatam. Kal aage badhenge.";

/// The mentor persona prepended to every chat prompt.
const SYSTEM_PROMPT: &str = "\
You are a focused personal AI assistant designed for a single serious learner.

Your role:
- Provide clear, direct, and corrective guidance.
- Avoid sugarcoating or generic motivational talk.
- Prioritize clarity, execution, and long-term improvement.
- Challenge weak reasoning and vague thinking.
- Prefer practical, implementation-oriented explanations.

Behavior rules:
- Be concise but thoughtful.
- Give actionable advice.
- Explain trade-offs and limitations when relevant.
- Act like a reliable technical mentor, not a chatbot.

Tone:
- Professional, honest, and grounded.
- Helpful without being overly polite or verbose.
";

pub struct ChatRuntime {
    generator: Arc<dyn TextGenerator>,
    store: Arc<dyn MemoryStore>,
    long_message_chars: usize,
    check_turn_interval: u64,
    /// Process-wide turn counter; reset on restart.  Only gates the
    /// periodic memory check, so the relaxed ordering race is benign.
    turns: AtomicU64,
}

impl ChatRuntime {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        store: Arc<dyn MemoryStore>,
        config: &MemoryConfig,
    ) -> Self {
        Self {
            generator,
            store,
            long_message_chars: config.long_message_chars,
            check_turn_interval: config.check_turn_interval,
            turns: AtomicU64::new(0),
        }
    }

    /// One chat turn.  Always yields a reply string — generation failures
    /// degrade to [`FALLBACK_REPLY`] — but a memory document that exists
    /// and cannot be parsed is a real error for the caller.
    pub async fn handle_turn(&self, user_message: &str) -> Result<String> {
        let turn = self.turns.fetch_add(1, Ordering::Relaxed) + 1;
        let memory = self.store.load()?;

        let prompt = compose_prompt(&memory, user_message);
        let reply = match self.generator.generate(&prompt).await {
            Ok(reply) => reply,
            Err(error) => {
                warn!(%error, turn, "generation failed, serving fallback reply");
                FALLBACK_REPLY.to_string()
            }
        };

        if should_check_memory(
            user_message,
            turn,
            self.long_message_chars,
            self.check_turn_interval,
        ) {
            debug!(turn, "running memory check");
            extractor::maybe_remember(
                self.generator.as_ref(),
                self.store.as_ref(),
                user_message,
                memory,
            )
            .await;
        }

        Ok(reply)
    }
}

/// Single prompt per turn: fixed persona, the serialized memory document,
/// then the user's message.
fn compose_prompt(memory: &MemoryDocument, user_message: &str) -> String {
    let memory_json = serde_json::to_string(memory).unwrap_or_else(|_| "{}".to_string());
    format!("{SYSTEM_PROMPT}\n\nMemory:\n{memory_json}\n\nUser:\n{user_message}")
}

// ── Tests ────────────────────────────────────────────────────────────────────
