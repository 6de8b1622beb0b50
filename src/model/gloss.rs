//! Gloss: a lexical unit in one language.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Opaque storage identifier. Never leaves the store in exported data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlossId(pub u64);

impl std::fmt::Display for GlossId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Natural identity of a gloss: `"{language_iso}:{content}"`.
///
/// Stable across re-import and re-keying of the store. The traversal
/// keys its visited set on it and exported records reference each other
/// through it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompoundKey(String);

impl CompoundKey {
    pub fn new(language_iso: &str, content: &str) -> Self {
        Self(format!("{language_iso}:{content}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split back into `(language_iso, content)`.
    ///
    /// ISO codes never contain `:`, so the first colon is the separator;
    /// the content itself may contain further colons.
    pub fn parts(&self) -> (&str, &str) {
        self.0.split_once(':').unwrap_or(("", self.0.as_str()))
    }
}

impl std::fmt::Display for CompoundKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CompoundKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Transcriptions are almost always zero, one or two entries.
pub type Transcriptions = SmallVec<[String; 2]>;

/// A gloss as handed out by a store.
///
/// Relations are not carried on the value; they are looked up through
/// [`GlossStore::related_glosses`](crate::storage::GlossStore::related_glosses).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gloss {
    pub id: GlossId,
    pub content: String,
    /// ISO code of the owning language.
    pub language: String,
    pub transcriptions: Transcriptions,
}

impl Gloss {
    pub fn new(id: GlossId, language: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            language: language.into(),
            transcriptions: Transcriptions::new(),
        }
    }

    pub fn with_transcriptions(mut self, transcriptions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.transcriptions = transcriptions.into_iter().map(Into::into).collect();
        self
    }

    pub fn compound_key(&self) -> CompoundKey {
        CompoundKey::new(&self.language, &self.content)
    }

    /// Paraphrase placeholders are written in square brackets, e.g. `"[to say hello]"`.
    pub fn is_paraphrased(&self) -> bool {
        self.content.starts_with('[') && self.content.ends_with(']')
    }

    pub fn is_in(&self, language_iso: &str) -> bool {
        self.language == language_iso
    }
}

impl std::fmt::Display for Gloss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.language, self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_key_format() {
        let g = Gloss::new(GlossId(7), "eng", "hello");
        assert_eq!(g.compound_key().as_str(), "eng:hello");
        assert_eq!(g.compound_key().to_string(), "eng:hello");
    }

    #[test]
    fn test_compound_key_parts_keep_colons_in_content() {
        let key = CompoundKey::new("deu", "Uhrzeit: 12:30");
        assert_eq!(key.parts(), ("deu", "Uhrzeit: 12:30"));
    }

    #[test]
    fn test_is_paraphrased() {
        assert!(Gloss::new(GlossId(1), "eng", "[greeting]").is_paraphrased());
        assert!(Gloss::new(GlossId(1), "eng", "[]").is_paraphrased());
        assert!(!Gloss::new(GlossId(1), "eng", "[greeting").is_paraphrased());
        assert!(!Gloss::new(GlossId(1), "eng", "greeting]").is_paraphrased());
        assert!(!Gloss::new(GlossId(1), "eng", "a [b] c").is_paraphrased());
    }

    #[test]
    fn test_compound_key_serializes_as_plain_string() {
        let key = CompoundKey::new("eng", "hi");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"eng:hi\"");
    }
}
