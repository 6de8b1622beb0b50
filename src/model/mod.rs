//! # Gloss Graph Model
//!
//! Plain DTOs shared by storage, traversal and export.
//!
//! Design rule: no I/O, no state, no async. Relation sets are not stored on
//! these values; a [`GlossStore`](crate::storage::GlossStore) resolves them.

pub mod gloss;
pub mod language;
pub mod situation;
pub mod note;
pub mod relation;

pub use gloss::{Gloss, GlossId, CompoundKey, Transcriptions};
pub use language::{Language, MAX_ISO_LEN};
pub use situation::{Situation, MAX_SITUATION_ID_LEN};
pub use note::Note;
pub use relation::Relation;
