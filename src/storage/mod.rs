//! # Gloss Store Trait
//!
//! The read contract between the traversal/export core and whatever holds
//! the gloss graph. The core never writes through it and never caches what
//! it returns; batching or caching is the store's business.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStore` | `memory` | In-memory graph for testing/embedding |

pub mod memory;

use async_trait::async_trait;
use crate::model::*;
use crate::Result;

pub use memory::MemoryStore;

// ============================================================================
// GlossStore Trait
// ============================================================================

/// Read-only access to the gloss graph.
///
/// Collections come back as snapshots. Callers that need one consistent
/// view across many calls (a whole batch export) should hand in a store
/// that is not being written concurrently, e.g. [`MemoryStore::snapshot`].
///
/// A relation pointing at a gloss the store cannot resolve must surface as
/// [`Error::DanglingReference`](crate::Error::DanglingReference), never as
/// a silently shorter list.
#[async_trait]
pub trait GlossStore: Send + Sync + 'static {
    // ========================================================================
    // Lookup
    // ========================================================================

    /// Get a gloss by storage id. Returns None if not found.
    async fn get_gloss(&self, id: GlossId) -> Result<Option<Gloss>>;

    /// Get a gloss by its natural key.
    async fn gloss_by_key(&self, key: &CompoundKey) -> Result<Option<Gloss>>;

    /// Every gloss, ordered by language then content.
    async fn all_glosses(&self) -> Result<Vec<Gloss>>;

    /// Every language, ordered by ISO code.
    async fn languages(&self) -> Result<Vec<Language>>;

    /// Every situation, ordered by id.
    async fn situations(&self) -> Result<Vec<Situation>>;

    // ========================================================================
    // Situation relations
    // ========================================================================

    /// The situation's relevant vocabulary. `NotFound` for an unknown id.
    async fn glosses_of_situation(&self, situation: &str) -> Result<Vec<Gloss>>;

    /// The situation's description glosses, one or more per language.
    async fn descriptions_of_situation(&self, situation: &str) -> Result<Vec<Gloss>>;

    // ========================================================================
    // Gloss relations
    // ========================================================================

    /// Glosses related to `gloss` by `relation`.
    ///
    /// Symmetric relations already include both directions; `Examples`
    /// returns the glosses whose `ClarifiesUsage` points at `gloss`.
    async fn related_glosses(&self, gloss: &Gloss, relation: Relation) -> Result<Vec<Gloss>>;

    /// Translations of `gloss`, in any language.
    async fn translations_of(&self, gloss: &Gloss) -> Result<Vec<Gloss>> {
        self.related_glosses(gloss, Relation::Translations).await
    }

    /// Notes attached to `gloss`.
    ///
    /// Default: no notes. Stores without note support need not override.
    async fn notes_of(&self, _gloss: &Gloss) -> Result<Vec<Note>> {
        Ok(Vec::new())
    }
}
