//! Export filter and record serializer.

use serde::{Deserialize, Serialize};

use crate::model::*;
use crate::storage::GlossStore;
use crate::Result;

/// One exported gloss with every relation flattened to compound keys.
///
/// Field names of the relation lists are the relation wire names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossRecord {
    pub key: CompoundKey,
    pub content: String,
    pub language: String,
    #[serde(default)]
    pub transcriptions: Vec<String>,
    #[serde(default)]
    pub contains: Vec<CompoundKey>,
    #[serde(default)]
    pub translations: Vec<CompoundKey>,
    #[serde(default)]
    pub near_synonyms: Vec<CompoundKey>,
    #[serde(default)]
    pub near_homophones: Vec<CompoundKey>,
    #[serde(default)]
    pub clarifies_usage: Vec<CompoundKey>,
    #[serde(default)]
    pub to_be_differentiated_from: Vec<CompoundKey>,
    #[serde(default)]
    pub collocations: Vec<CompoundKey>,
    #[serde(default)]
    pub examples: Vec<CompoundKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,
}

impl GlossRecord {
    /// A record for `gloss` with no relations filled in.
    pub fn bare(gloss: &Gloss) -> Self {
        Self {
            key: gloss.compound_key(),
            content: gloss.content.clone(),
            language: gloss.language.clone(),
            transcriptions: gloss.transcriptions.to_vec(),
            contains: Vec::new(),
            translations: Vec::new(),
            near_synonyms: Vec::new(),
            near_homophones: Vec::new(),
            clarifies_usage: Vec::new(),
            to_be_differentiated_from: Vec::new(),
            collocations: Vec::new(),
            examples: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn related(&self, relation: Relation) -> &[CompoundKey] {
        match relation {
            Relation::Contains => &self.contains,
            Relation::Translations => &self.translations,
            Relation::NearSynonyms => &self.near_synonyms,
            Relation::NearHomophones => &self.near_homophones,
            Relation::ClarifiesUsage => &self.clarifies_usage,
            Relation::ToBeDifferentiatedFrom => &self.to_be_differentiated_from,
            Relation::Collocations => &self.collocations,
            Relation::Examples => &self.examples,
        }
    }

    fn related_mut(&mut self, relation: Relation) -> &mut Vec<CompoundKey> {
        match relation {
            Relation::Contains => &mut self.contains,
            Relation::Translations => &mut self.translations,
            Relation::NearSynonyms => &mut self.near_synonyms,
            Relation::NearHomophones => &mut self.near_homophones,
            Relation::ClarifiesUsage => &mut self.clarifies_usage,
            Relation::ToBeDifferentiatedFrom => &mut self.to_be_differentiated_from,
            Relation::Collocations => &mut self.collocations,
            Relation::Examples => &mut self.examples,
        }
    }
}

/// True for a paraphrase placeholder in the target language.
///
/// Native-language paraphrases stay in the export as scaffolding, and
/// glosses in any third language are never excluded.
pub fn is_excluded(gloss: &Gloss, target_iso: &str) -> bool {
    gloss.is_in(target_iso) && gloss.is_paraphrased()
}

/// Drop target-language paraphrases, keeping order.
pub fn filter_for_export(glosses: Vec<Gloss>, target_iso: &str) -> Vec<Gloss> {
    glosses.into_iter().filter(|g| !is_excluded(g, target_iso)).collect()
}

/// Serialize one gloss, one level deep in every exported relation.
///
/// With `target_iso` set, each relation list is filtered like
/// [`filter_for_export`]; with `None` everything is emitted.
pub async fn to_record<S: GlossStore + ?Sized>(
    store: &S,
    gloss: &Gloss,
    target_iso: Option<&str>,
) -> Result<GlossRecord> {
    let mut record = GlossRecord::bare(gloss);

    for relation in Relation::EXPORTED {
        let related = store.related_glosses(gloss, relation).await?;
        *record.related_mut(relation) = related
            .iter()
            .filter(|g| target_iso.is_none_or(|t| !is_excluded(g, t)))
            .map(Gloss::compound_key)
            .collect();
    }
    record.notes = store.notes_of(gloss).await?;

    Ok(record)
}

pub async fn to_records<S: GlossStore + ?Sized>(
    store: &S,
    glosses: &[Gloss],
    target_iso: Option<&str>,
) -> Result<Vec<GlossRecord>> {
    let mut records = Vec::with_capacity(glosses.len());
    for gloss in glosses {
        records.push(to_record(store, gloss, target_iso).await?);
    }
    Ok(records)
}
