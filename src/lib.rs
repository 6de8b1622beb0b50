//! # gloss-rs: Gloss Graph Traversal and Dataset Export
//!
//! A lexical knowledge graph of *glosses* linked by seven typed relations,
//! grouped into learning *situations*, exported per native/target
//! language pair as JSON Lines datasets.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `GlossStore` is the contract between the engine and storage
//! 2. **Natural identity**: glosses are deduplicated and cross-referenced by
//!    `"{iso}:{content}"`, never by storage ids
//! 3. **Two-pass traversal**: a BFS closure, then exactly one lateral hop
//! 4. **Filtering at export time**: traversal knows nothing about paraphrases
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gloss_rs::{Exporter, Language, LanguagePair, Relation, Situation, MemorySink};
//!
//! # async fn example() -> gloss_rs::Result<()> {
//! let exporter = Exporter::open_memory().await?;
//! let db = exporter.store();
//! db.add_language(Language::new("eng", "English"))?;
//! db.add_language(Language::new("deu", "German"))?;
//!
//! let hello = db.create_gloss("eng", "hello", ["həˈləʊ"])?;
//! let hallo = db.create_gloss("deu", "hallo", ["ˈhalo"])?;
//! db.relate(hello, Relation::Translations, hallo)?;
//!
//! db.create_situation(Situation::new("greeting"))?;
//! db.add_situation_gloss("greeting", hello)?;
//! let en = db.create_gloss("eng", "Greeting someone", std::iter::empty::<String>())?;
//! let de = db.create_gloss("deu", "Jemanden begrüßen", std::iter::empty::<String>())?;
//! db.add_situation_description("greeting", en)?;
//! db.add_situation_description("greeting", de)?;
//!
//! let glosses = exporter.collect("greeting", &LanguagePair::new("deu", "eng")).await?;
//! assert_eq!(glosses.len(), 2);
//!
//! let batch = exporter.export_all().await?;
//! let mut sink = MemorySink::new();
//! batch.write_to(&mut sink)?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod traversal;
pub mod export;
pub mod tools;
pub mod config;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{
    Gloss, GlossId, CompoundKey, Language, Situation, Note, Relation,
};
pub use storage::{GlossStore, MemoryStore};
pub use traversal::{collect, LanguagePair};
pub use export::{
    GlossRecord, BatchExport, SituationDocument, PairVerdict,
    ExportSink, DirectorySink, MemorySink,
};
pub use config::ExportConfig;

// ============================================================================
// Top-level Exporter handle
// ============================================================================

/// The primary entry point. An `Exporter` wraps a gloss store and runs
/// traversals and exports against it.
pub struct Exporter<S: GlossStore> {
    store: S,
    config: ExportConfig,
}

impl<S: GlossStore> Exporter<S> {
    /// Create an Exporter over the given store with default configuration.
    pub fn with_store(store: S) -> Self {
        Self { store, config: ExportConfig::default() }
    }

    pub fn with_config(mut self, config: ExportConfig) -> Self {
        self.config = config;
        self
    }

    /// Glosses relevant to one situation and pair, unfiltered.
    pub async fn collect(&self, situation: &str, pair: &LanguagePair) -> Result<Vec<Gloss>> {
        traversal::collect(&self.store, situation, pair).await
    }

    /// Run both acceptance checks for one situation and pair.
    pub async fn validate(&self, situation: &str, pair: &LanguagePair) -> Result<PairVerdict> {
        let descriptions = self.store.descriptions_of_situation(situation).await?;
        export::validate_pair(&self.store, situation, &descriptions, pair).await
    }

    /// Filtered records for one situation and pair, or None if the pair
    /// is not accepted.
    pub async fn export_pair(&self, situation: &str, pair: &LanguagePair) -> Result<Option<Vec<GlossRecord>>> {
        match self.validate(situation, pair).await? {
            PairVerdict::Accepted(glosses) => {
                Ok(Some(export::to_records(&self.store, &glosses, Some(&pair.target)).await?))
            }
            _ => Ok(None),
        }
    }

    /// Unfiltered records for one situation and pair.
    pub async fn export_situation(&self, situation: &str, pair: &LanguagePair) -> Result<Vec<GlossRecord>> {
        export::export_situation(&self.store, situation, pair).await
    }

    /// Every situation × ordered pair. See [`export::export_all`].
    pub async fn export_all(&self) -> Result<BatchExport> {
        export::export_all(&self.store, &self.config).await
    }

    /// Every gloss as its own JSON file.
    pub async fn export_all_glosses(&self, sink: &mut dyn ExportSink) -> Result<usize> {
        export::export_all_glosses(&self.store, sink, &self.config).await
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }
}

/// In-memory graph for testing and embedding.
impl Exporter<MemoryStore> {
    pub async fn open_memory() -> Result<Self> {
        Ok(Self::with_store(MemoryStore::new()))
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// A relation points at a gloss the store cannot resolve.
    #[error("Dangling reference: {from} -[{relation}]-> gloss {target}")]
    DanglingReference { from: String, relation: String, target: GlossId },

    /// A language pair whose native and target languages are the same.
    #[error("Invalid language pair: {0}")]
    InvalidPair(String),

    /// No situation validated for any language pair.
    #[error("Nothing to export: {0}")]
    NothingToExport(String),

    #[error("Invalid export path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for the empty-export outcome, as opposed to a failure.
    pub fn is_nothing_to_export(&self) -> bool {
        matches!(self, Error::NothingToExport(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
