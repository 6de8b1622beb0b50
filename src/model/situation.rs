//! Situation: a named learning scenario.

use serde::{Deserialize, Serialize};

/// Longest id a situation may carry.
pub const MAX_SITUATION_ID_LEN: usize = 64;

/// A situation. Its `glosses` and `descriptions` sets live in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Situation {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_link: Option<String>,
}

impl Situation {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), image_link: None }
    }

    pub fn with_image_link(mut self, link: impl Into<String>) -> Self {
        self.image_link = Some(link.into());
        self
    }
}

impl std::fmt::Display for Situation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}
