use serde::Deserialize;
use tracing::{debug, info, warn};

use mentor_llm::{TextGenerator, extract_json_reply};
use mentor_memory::{Category, MemoryDocument, MemoryStore};

/// What the extraction call asks the model to answer with.
#[derive(Debug, Deserialize)]
pub(crate) struct MemoryDirective {
    pub remember: bool,
    #[serde(rename = "type")]
    pub category: String,
    pub content: String,
}

/// The structured-output prompt for the extraction call.  The reply is
/// parsed tolerantly; anything that does not yield a well-formed directive
/// is dropped without surfacing an error to the user.
pub(crate) fn extraction_prompt(user_message: &str) -> String {
    format!(
        r#"Respond ONLY in JSON:
{{
  "remember": true/false,
  "type": "goals | weaknesses | patterns | notes",
  "content": "short sentence"
}}
User message: "{user_message}"
"#
    )
}

/// Run the extraction flow against an already-loaded memory document:
/// second generation call, parse the directive, append with exact-match
/// dedup, persist the whole document.  Every failure path is a logged
/// no-op.
pub(crate) async fn maybe_remember(
    generator: &dyn TextGenerator,
    store: &dyn MemoryStore,
    user_message: &str,
    mut memory: MemoryDocument,
) {
    let reply = match generator.generate(&extraction_prompt(user_message)).await {
        Ok(reply) => reply,
        Err(error) => {
            debug!(%error, "memory extraction call failed");
            return;
        }
    };

    let Some(directive) = extract_json_reply::<MemoryDirective>(&reply) else {
        debug!("extraction reply carried no usable JSON directive");
        return;
    };

    if !directive.remember {
        return;
    }

    let Some(category) = Category::from_label(&directive.category) else {
        debug!(category = %directive.category, "unknown memory category, dropping directive");
        return;
    };

    if !memory.remember(category, &directive.content) {
        return;
    }

    match store.save(&memory) {
        Ok(()) => info!(category = category.slug(), "remembered a new fact"),
        Err(error) => warn!(%error, "failed to persist memory document"),
    }
}
