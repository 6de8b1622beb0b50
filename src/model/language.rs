//! Language, keyed by ISO code.

use serde::{Deserialize, Serialize};

/// Longest ISO code a language may carry (ISO 639-3).
pub const MAX_ISO_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub iso: String,
    pub name: String,
    /// Optional short display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    /// Free-text note for content authors. Not read by traversal or export.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
}

impl Language {
    pub fn new(iso: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            iso: iso.into(),
            name: name.into(),
            short: None,
            note: String::new(),
        }
    }

    pub fn with_short(mut self, short: impl Into<String>) -> Self {
        self.short = Some(short.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short.as_deref().unwrap_or(&self.name))
    }
}
