/// Substrings that mark a message as worth a memory check.  Matched
/// case-insensitively against the whole message.
pub const TRIGGER_KEYWORDS: &[&str] = &[
    "goal", "habit", "problem", "confused", "struggle", "plan", "future", "daily", "repeat",
    "lazy",
];

/// Decide whether this turn warrants the second, extraction-only
/// generation call.  True when the message is long, mentions a trigger
/// keyword, or the turn counter lands on the periodic interval — otherwise
/// the extraction flow is skipped entirely for the turn.
pub fn should_check_memory(
    message: &str,
    turn: u64,
    long_message_chars: usize,
    check_turn_interval: u64,
) -> bool {
    if message.chars().count() > long_message_chars {
        return true;
    }

    let lowered = message.to_lowercase();
    if TRIGGER_KEYWORDS.iter().any(|keyword| lowered.contains(keyword)) {
        return true;
    }

    check_turn_interval != 0 && turn % check_turn_interval == 0
}

// ── Tests ────────────────────────────────────────────────────────────────────
