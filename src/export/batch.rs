//! Pair validation and the all-situations batch export.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::config::ExportConfig;
use crate::model::*;
use crate::storage::GlossStore;
use crate::traversal::{collect, LanguagePair};
use crate::{Error, Result};
use super::jsonl::{to_jsonl, ExportSink};
use super::record::{filter_for_export, to_records, GlossRecord};

// ============================================================================
// Pair validation
// ============================================================================

/// Outcome of checking one situation against one language pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairVerdict {
    /// Filtered traversal result, ready for serialization.
    Accepted(Vec<Gloss>),
    /// The situation lacks a description in the target or native language.
    MissingDescription,
    /// After filtering, the result lacks the target or native language.
    MissingLanguage,
}

impl PairVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PairVerdict::Accepted(_))
    }
}

/// Decide whether `situation` exports for `pair`.
///
/// `descriptions` are the situation's description glosses. The traversal
/// only runs when both languages are described.
#[tracing::instrument(skip(store, descriptions, pair), fields(pair = %pair))]
pub async fn validate_pair<S: GlossStore + ?Sized>(
    store: &S,
    situation: &str,
    descriptions: &[Gloss],
    pair: &LanguagePair,
) -> Result<PairVerdict> {
    pair.validate()?;
    let described = |iso: &str| descriptions.iter().any(|d| d.is_in(iso));
    if !described(&pair.target) || !described(&pair.native) {
        return Ok(PairVerdict::MissingDescription);
    }

    let glosses = filter_for_export(collect(store, situation, pair).await?, &pair.target);

    let present = |iso: &str| glosses.iter().any(|g| g.is_in(iso));
    if !present(&pair.target) || !present(&pair.native) {
        return Ok(PairVerdict::MissingLanguage);
    }
    Ok(PairVerdict::Accepted(glosses))
}

// ============================================================================
// Documents
// ============================================================================

/// The export of one situation for one accepted pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SituationDocument {
    pub situation_id: String,
    pub pair: LanguagePair,
    pub target_description: String,
    pub native_description: String,
    /// Empty when the situation has no image.
    pub image_link: String,
    pub records: Vec<GlossRecord>,
}

impl SituationDocument {
    /// `{situation}_{target}_{native}.jsonl`
    pub fn file_name(&self) -> String {
        format!("{}_{}.jsonl", self.situation_id, self.pair)
    }

    pub fn index_entry(&self) -> SituationIndexEntry {
        SituationIndexEntry {
            id: self.situation_id.clone(),
            target_description: self.target_description.clone(),
            native_description: self.native_description.clone(),
            image_link: self.image_link.clone(),
        }
    }
}

/// One line of `situations_{target}_{native}.jsonl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SituationIndexEntry {
    pub id: String,
    pub target_description: String,
    pub native_description: String,
    pub image_link: String,
}

/// One line of `native_languages.jsonl` / `target_languages.jsonl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub iso: String,
    pub name: String,
    pub short: String,
}

impl From<&Language> for LanguageEntry {
    fn from(language: &Language) -> Self {
        Self {
            iso: language.iso.clone(),
            name: language.name.clone(),
            short: language.short.clone().unwrap_or_default(),
        }
    }
}

// ============================================================================
// BatchExport
// ============================================================================

/// Every accepted situation × pair, plus the language indexes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchExport {
    /// Ordered by situation id, then target ISO, then native ISO.
    pub documents: Vec<SituationDocument>,
    /// Languages that appeared as native in an accepted pair, sorted by name.
    pub native_languages: Vec<LanguageEntry>,
    /// Languages that appeared as target in an accepted pair, sorted by name.
    pub target_languages: Vec<LanguageEntry>,
    pub generated_at: DateTime<Utc>,
}

impl BatchExport {
    /// Distinct accepted pairs, in document order.
    pub fn pairs(&self) -> Vec<&LanguagePair> {
        let mut seen = BTreeSet::new();
        self.documents
            .iter()
            .map(|d| &d.pair)
            .filter(|p| seen.insert(*p))
            .collect()
    }

    pub fn documents_for<'a>(&'a self, pair: &'a LanguagePair) -> impl Iterator<Item = &'a SituationDocument> + 'a {
        self.documents.iter().filter(move |d| &d.pair == pair)
    }

    pub fn document(&self, situation: &str, pair: &LanguagePair) -> Option<&SituationDocument> {
        self.documents.iter().find(|d| d.situation_id == situation && &d.pair == pair)
    }

    /// Write the file set:
    ///
    /// - `{situation}_{target}_{native}.jsonl` per document
    /// - `native_languages.jsonl`, `target_languages.jsonl`
    /// - `situations_{target}_{native}.jsonl` per pair
    ///
    /// Every path is computed before anything is written. If two files
    /// would share a path (a situation named `situations` shadows the pair
    /// index), nothing is written and [`Error::InvalidPath`] names the path.
    /// Returns the number of files written.
    pub fn write_to(&self, sink: &mut dyn ExportSink) -> Result<usize> {
        let mut files: Vec<(String, String)> = Vec::with_capacity(self.documents.len() + 4);

        for document in &self.documents {
            files.push((document.file_name(), to_jsonl(&document.records)?));
        }
        files.push(("native_languages.jsonl".into(), to_jsonl(&self.native_languages)?));
        files.push(("target_languages.jsonl".into(), to_jsonl(&self.target_languages)?));
        for pair in self.pairs() {
            let index: Vec<SituationIndexEntry> =
                self.documents_for(pair).map(SituationDocument::index_entry).collect();
            files.push((format!("situations_{pair}.jsonl"), to_jsonl(&index)?));
        }

        let mut paths = HashSet::with_capacity(files.len());
        for (path, _) in &files {
            if !paths.insert(path.as_str()) {
                return Err(Error::InvalidPath(format!("{path} would be written twice in one batch")));
            }
        }

        for (path, contents) in &files {
            sink.put(path, contents.as_bytes())?;
        }
        debug!(files = files.len(), "batch export written");
        Ok(files.len())
    }
}

// ============================================================================
// export_all
// ============================================================================

/// One situation × ordered pair.
struct Cell<'a> {
    situation: &'a Situation,
    descriptions: &'a [Gloss],
    pair: LanguagePair,
}

/// Export every situation for every ordered pair of distinct languages.
///
/// Cells are evaluated with at most `config.concurrency` in flight and
/// merged in cell order, so the result does not depend on the setting.
/// Returns [`Error::NothingToExport`] when no pair is accepted anywhere.
#[tracing::instrument(skip(store, config), fields(concurrency = config.concurrency))]
pub async fn export_all<S: GlossStore + ?Sized>(store: &S, config: &ExportConfig) -> Result<BatchExport> {
    config.validate()?;

    let mut languages = store.languages().await?;
    languages.sort_by(|a, b| a.iso.cmp(&b.iso));
    let mut situations = store.situations().await?;
    situations.sort_by(|a, b| a.id.cmp(&b.id));

    let mut described = Vec::with_capacity(situations.len());
    for situation in &situations {
        described.push((situation, store.descriptions_of_situation(&situation.id).await?));
    }

    let mut cells = Vec::new();
    for (situation, descriptions) in &described {
        for target in &languages {
            for native in &languages {
                if target.iso == native.iso {
                    continue;
                }
                cells.push(Cell {
                    situation,
                    descriptions,
                    pair: LanguagePair::new(native.iso.as_str(), target.iso.as_str()),
                });
            }
        }
    }
    let cell_count = cells.len();

    let outcomes: Vec<Option<SituationDocument>> = stream::iter(cells)
        .map(|cell| export_cell(store, cell))
        .buffered(config.concurrency)
        .try_collect()
        .await?;

    let mut documents = Vec::new();
    let mut native_isos = BTreeSet::new();
    let mut target_isos = BTreeSet::new();
    for document in outcomes.into_iter().flatten() {
        native_isos.insert(document.pair.native.clone());
        target_isos.insert(document.pair.target.clone());
        documents.push(document);
    }

    if documents.is_empty() {
        return Err(Error::NothingToExport("No valid language pairs found for export".into()));
    }

    let index = |isos: &BTreeSet<String>| {
        let mut entries: Vec<LanguageEntry> = languages
            .iter()
            .filter(|l| isos.contains(&l.iso))
            .map(LanguageEntry::from)
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    };

    let batch = BatchExport {
        native_languages: index(&native_isos),
        target_languages: index(&target_isos),
        documents,
        generated_at: Utc::now(),
    };
    info!(
        situations = situations.len(),
        cells = cell_count,
        accepted = batch.documents.len(),
        "batch export complete"
    );
    Ok(batch)
}

async fn export_cell<S: GlossStore + ?Sized>(store: &S, cell: Cell<'_>) -> Result<Option<SituationDocument>> {
    let situation = cell.situation;
    let glosses = match validate_pair(store, &situation.id, cell.descriptions, &cell.pair).await? {
        PairVerdict::Accepted(glosses) => glosses,
        verdict => {
            trace!(situation = %situation.id, pair = %cell.pair, ?verdict, "pair skipped");
            return Ok(None);
        }
    };

    let records = to_records(store, &glosses, Some(&cell.pair.target)).await?;
    let description = |iso: &str| {
        cell.descriptions
            .iter()
            .find(|d| d.is_in(iso))
            .map(|d| d.content.clone())
            .unwrap_or_default()
    };

    Ok(Some(SituationDocument {
        situation_id: situation.id.clone(),
        target_description: description(&cell.pair.target),
        native_description: description(&cell.pair.native),
        image_link: situation.image_link.clone().unwrap_or_default(),
        pair: cell.pair,
        records,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn test_missing_description_skips_traversal() {
        let db = MemoryStore::new();
        db.add_language(Language::new("eng", "English")).unwrap();
        db.add_language(Language::new("deu", "German")).unwrap();
        let desc = db.create_gloss("eng", "Greeting", std::iter::empty::<String>()).unwrap();
        db.create_situation(Situation::new("greeting")).unwrap();
        db.add_situation_description("greeting", desc).unwrap();

        let descriptions = db.descriptions_of_situation("greeting").await.unwrap();
        let verdict = validate_pair(&db, "greeting", &descriptions, &LanguagePair::new("deu", "eng"))
            .await
            .unwrap();
        assert_eq!(verdict, PairVerdict::MissingDescription);
    }

    #[test]
    fn test_language_entry_short_defaults_to_empty() {
        let entry = LanguageEntry::from(&Language::new("eng", "English"));
        assert_eq!(entry.short, "");
        let entry = LanguageEntry::from(&Language::new("deu", "German").with_short("DE"));
        assert_eq!(entry.short, "DE");
    }

    #[test]
    fn test_document_file_name() {
        let document = SituationDocument {
            situation_id: "greeting".into(),
            pair: LanguagePair::new("deu", "eng"),
            target_description: String::new(),
            native_description: String::new(),
            image_link: String::new(),
            records: Vec::new(),
        };
        assert_eq!(document.file_name(), "greeting_eng_deu.jsonl");
    }

    #[test]
    fn test_write_to_rejects_shadowed_index_file() {
        let document = |situation: &str| SituationDocument {
            situation_id: situation.into(),
            pair: LanguagePair::new("deu", "eng"),
            target_description: String::new(),
            native_description: String::new(),
            image_link: String::new(),
            records: Vec::new(),
        };
        let batch = BatchExport {
            documents: vec![document("greeting"), document("situations")],
            native_languages: Vec::new(),
            target_languages: Vec::new(),
            generated_at: Utc::now(),
        };

        let mut sink = crate::export::MemorySink::new();
        let err = batch.write_to(&mut sink).unwrap_err();
        assert!(matches!(&err, Error::InvalidPath(p) if p.starts_with("situations_eng_deu.jsonl")), "got {err:?}");
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_same_language_pair_is_invalid() {
        let db = MemoryStore::new();
        let err = validate_pair(&db, "greeting", &[], &LanguagePair::new("eng", "eng")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidPair(_)));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_work() {
        let db = MemoryStore::new();
        let config = ExportConfig { concurrency: 0, ..ExportConfig::default() };
        assert!(matches!(export_all(&db, &config).await, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_empty_store_has_nothing_to_export() {
        let db = MemoryStore::new();
        let err = export_all(&db, &ExportConfig::default()).await.unwrap_err();
        assert!(err.is_nothing_to_export());
    }
}
