//! Notes attached to a gloss.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub note_type: String,
    pub content: String,
    /// Whether a learner sees the note before revealing the solution.
    #[serde(default)]
    pub show_before_solution: bool,
}

impl Note {
    pub fn new(note_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            note_type: note_type.into(),
            content: content.into(),
            show_before_solution: false,
        }
    }

    pub fn shown_before_solution(mut self) -> Self {
        self.show_before_solution = true;
        self
    }
}

impl std::fmt::Display for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.note_type, self.content)
    }
}
