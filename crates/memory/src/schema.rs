use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The four categories a learned fact can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Goals,
    Weaknesses,
    Patterns,
    Notes,
}

impl Category {
    /// Kebab-case slug used in JSON keys and log lines.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Goals => "goals",
            Self::Weaknesses => "weaknesses",
            Self::Patterns => "patterns",
            Self::Notes => "notes",
        }
    }

    /// Parse a category from its label (case-insensitive).
    ///
    /// The extraction model is instructed to answer with one of the four
    /// category names, but replies are not always well-behaved; anything
    /// unrecognised maps to `None` and the caller drops the directive.
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "goals" => Some(Self::Goals),
            "weaknesses" => Some(Self::Weaknesses),
            "patterns" => Some(Self::Patterns),
            "notes" => Some(Self::Notes),
            _ => None,
        }
    }
}

/// The whole persisted memory document.
///
/// All five keys are always present; a freshly initialized document has
/// them all empty.  Per-field `serde(default)` lets a hand-edited file
/// with a missing list still load.  There is no size bound, expiry, or
/// schema versioning — unbounded growth is a known limitation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryDocument {
    /// Free-form key/value facts about the user.  Never written by the
    /// service itself; present for future use.
    pub profile: BTreeMap<String, serde_json::Value>,
    pub goals: Vec<String>,
    pub weaknesses: Vec<String>,
    pub patterns: Vec<String>,
    pub notes: Vec<String>,
}

impl MemoryDocument {
    pub fn entries(&self, category: Category) -> &[String] {
        match category {
            Category::Goals => &self.goals,
            Category::Weaknesses => &self.weaknesses,
            Category::Patterns => &self.patterns,
            Category::Notes => &self.notes,
        }
    }

    /// Append `content` to a category unless an identical entry already
    /// exists (exact string match).  Returns whether the document changed.
    pub fn remember(&mut self, category: Category, content: &str) -> bool {
        let list = match category {
            Category::Goals => &mut self.goals,
            Category::Weaknesses => &mut self.weaknesses,
            Category::Patterns => &mut self.patterns,
            Category::Notes => &mut self.notes,
        };

        if list.iter().any(|entry| entry == content) {
            return false;
        }

        list.push(content.to_string());
        true
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
