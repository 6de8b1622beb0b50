//! In-memory gloss store.
//!
//! This is the reference implementation of `GlossStore`.
//! It uses plain maps protected by RwLock.
//!
//! ## Limitations
//!
//! - **No transactions**: writes are applied immediately. Multi-step edits
//!   (create a gloss, then relate it) are not atomic.
//! - **Readers see live data**: an export running while another thread
//!   writes may observe a half-applied edit. Take a [`MemoryStore::snapshot`]
//!   first when that matters.
//!
//! Use this store for:
//! - Testing the traversal and export engine
//! - Embedding the exporter in tools that load the graph from elsewhere

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use parking_lot::RwLock;
use async_trait::async_trait;

use crate::model::*;
use crate::{Error, Result};
use super::GlossStore;

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory gloss graph.
///
/// Cloning is cheap and yields a handle onto the same graph.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    /// iso → language
    languages: RwLock<BTreeMap<String, Language>>,
    glosses: RwLock<HashMap<GlossId, Gloss>>,
    /// natural key → id (enforces `(content, language)` uniqueness)
    keys: RwLock<HashMap<CompoundKey, GlossId>>,
    /// (gloss, relation) → related ids, in insertion order
    adjacency: RwLock<HashMap<(GlossId, Relation), Vec<GlossId>>>,
    /// situation id → situation with its gloss and description sets
    situations: RwLock<BTreeMap<String, SituationEntry>>,
    notes: RwLock<HashMap<GlossId, Vec<Note>>>,
    next_gloss_id: AtomicU64,
}

#[derive(Clone)]
struct SituationEntry {
    situation: Situation,
    glosses: Vec<GlossId>,
    descriptions: Vec<GlossId>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                languages: RwLock::new(BTreeMap::new()),
                glosses: RwLock::new(HashMap::new()),
                keys: RwLock::new(HashMap::new()),
                adjacency: RwLock::new(HashMap::new()),
                situations: RwLock::new(BTreeMap::new()),
                notes: RwLock::new(HashMap::new()),
                next_gloss_id: AtomicU64::new(1),
            }),
        }
    }

    /// Deep copy of the current graph. Later writes to `self` do not show
    /// up in the snapshot and vice versa.
    pub fn snapshot(&self) -> Self {
        let inner = &self.inner;
        Self {
            inner: Arc::new(MemoryInner {
                languages: RwLock::new(inner.languages.read().clone()),
                glosses: RwLock::new(inner.glosses.read().clone()),
                keys: RwLock::new(inner.keys.read().clone()),
                adjacency: RwLock::new(inner.adjacency.read().clone()),
                situations: RwLock::new(inner.situations.read().clone()),
                notes: RwLock::new(inner.notes.read().clone()),
                next_gloss_id: AtomicU64::new(inner.next_gloss_id.load(Ordering::Relaxed)),
            }),
        }
    }

    pub fn gloss_count(&self) -> usize {
        self.inner.glosses.read().len()
    }

    // ========================================================================
    // Languages
    // ========================================================================

    pub fn add_language(&self, language: Language) -> Result<()> {
        let iso = language.iso.as_str();
        if iso.is_empty() || iso.chars().count() > MAX_ISO_LEN || iso.contains(':') {
            return Err(Error::ConstraintViolation(format!(
                "Invalid ISO code '{iso}': expected 1 to {MAX_ISO_LEN} characters without ':'"
            )));
        }
        let mut languages = self.inner.languages.write();
        if languages.contains_key(iso) {
            return Err(Error::ConstraintViolation(format!("Language {iso} already exists")));
        }
        languages.insert(language.iso.clone(), language);
        Ok(())
    }

    pub fn language(&self, iso: &str) -> Option<Language> {
        self.inner.languages.read().get(iso).cloned()
    }

    // ========================================================================
    // Gloss CRUD
    // ========================================================================

    /// Create a gloss. Content is trimmed; blank transcription lines are dropped.
    pub fn create_gloss<I, T>(&self, language_iso: &str, content: &str, transcriptions: I) -> Result<GlossId>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let content = content.trim();
        if content.is_empty() {
            return Err(Error::ConstraintViolation("Gloss content is required".into()));
        }
        if !self.inner.languages.read().contains_key(language_iso) {
            return Err(Error::NotFound(format!("Language {language_iso}")));
        }

        let transcriptions: Vec<String> = transcriptions
            .into_iter()
            .map(Into::into)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        let key = CompoundKey::new(language_iso, content);
        let mut keys = self.inner.keys.write();
        if keys.contains_key(&key) {
            return Err(Error::ConstraintViolation(format!("Gloss {key} already exists")));
        }
        let id = GlossId(self.inner.next_gloss_id.fetch_add(1, Ordering::Relaxed));
        keys.insert(key, id);
        drop(keys);

        let gloss = Gloss::new(id, language_iso, content).with_transcriptions(transcriptions);
        self.inner.glosses.write().insert(id, gloss);
        Ok(id)
    }

    /// Return the id for `(language_iso, content)`, creating the gloss if
    /// needed. The flag is true when a gloss was created.
    pub fn get_or_create_gloss(&self, language_iso: &str, content: &str) -> Result<(GlossId, bool)> {
        if let Some(id) = self.gloss_id(language_iso, content.trim()) {
            return Ok((id, false));
        }
        let id = self.create_gloss(language_iso, content, std::iter::empty::<String>())?;
        Ok((id, true))
    }

    pub fn gloss_id(&self, language_iso: &str, content: &str) -> Option<GlossId> {
        self.inner.keys.read().get(&CompoundKey::new(language_iso, content)).copied()
    }

    /// Delete a gloss. Returns true if it existed.
    /// Fails while the gloss still takes part in any relation or situation.
    pub fn delete_gloss(&self, id: GlossId) -> Result<bool> {
        if !self.inner.glosses.read().contains_key(&id) {
            return Ok(false);
        }
        if self.is_referenced(id) {
            return Err(Error::ConstraintViolation(format!(
                "Cannot delete gloss {id} while it is still related or used by a situation. Detach it first."
            )));
        }

        let removed = self.inner.glosses.write().remove(&id);
        if let Some(gloss) = &removed {
            self.inner.keys.write().remove(&gloss.compound_key());
        }
        self.inner.notes.write().remove(&id);
        Ok(removed.is_some())
    }

    /// Delete a gloss together with all its edges, memberships and notes.
    pub fn detach_delete_gloss(&self, id: GlossId) -> Result<bool> {
        {
            let mut adj = self.inner.adjacency.write();
            adj.retain(|(owner, _), _| *owner != id);
            for targets in adj.values_mut() {
                targets.retain(|t| *t != id);
            }
            adj.retain(|_, targets| !targets.is_empty());
        }
        {
            let mut situations = self.inner.situations.write();
            for entry in situations.values_mut() {
                entry.glosses.retain(|g| *g != id);
                entry.descriptions.retain(|g| *g != id);
            }
        }
        self.delete_gloss(id)
    }

    fn is_referenced(&self, id: GlossId) -> bool {
        let related = self.inner.adjacency.read().iter().any(|((owner, _), targets)| {
            (*owner == id && !targets.is_empty()) || targets.contains(&id)
        });
        related
            || self.inner.situations.read().values().any(|entry| {
                entry.glosses.contains(&id) || entry.descriptions.contains(&id)
            })
    }

    // ========================================================================
    // Relations
    // ========================================================================

    /// Relate `a` to `b`. Duplicate edges are ignored.
    ///
    /// Symmetric relations are stored on both endpoints; `ClarifiesUsage`
    /// also maintains the `Examples` view on `b`. Relating through
    /// `Examples` is the same as `relate(b, ClarifiesUsage, a)`.
    pub fn relate(&self, a: GlossId, relation: Relation, b: GlossId) -> Result<()> {
        if relation.is_reverse_view() {
            return self.relate(b, Relation::ClarifiesUsage, a);
        }
        if a == b {
            return Err(Error::ConstraintViolation(format!(
                "Gloss {a} cannot be related to itself ({relation})"
            )));
        }
        {
            let glosses = self.inner.glosses.read();
            if !glosses.contains_key(&a) {
                return Err(Error::NotFound(format!("Source gloss {a}")));
            }
            if !glosses.contains_key(&b) {
                return Err(Error::NotFound(format!("Target gloss {b}")));
            }
        }

        let mut adj = self.inner.adjacency.write();
        push_unique(adj.entry((a, relation)).or_default(), b);
        if relation.is_symmetric() {
            push_unique(adj.entry((b, relation)).or_default(), a);
        } else if let Some(inverse) = relation.inverse() {
            push_unique(adj.entry((b, inverse)).or_default(), a);
        }
        Ok(())
    }

    /// Remove an edge. Returns true if it existed.
    pub fn unrelate(&self, a: GlossId, relation: Relation, b: GlossId) -> bool {
        if relation.is_reverse_view() {
            return self.unrelate(b, Relation::ClarifiesUsage, a);
        }
        let mut adj = self.inner.adjacency.write();
        let removed = remove_edge(&mut adj, (a, relation), b);
        if relation.is_symmetric() {
            remove_edge(&mut adj, (b, relation), a);
        } else if let Some(inverse) = relation.inverse() {
            remove_edge(&mut adj, (b, inverse), a);
        }
        removed
    }

    // ========================================================================
    // Situations
    // ========================================================================

    pub fn create_situation(&self, situation: Situation) -> Result<()> {
        let id = situation.id.trim().to_string();
        if id.is_empty() {
            return Err(Error::ConstraintViolation("Situation id is required".into()));
        }
        if id.chars().count() > MAX_SITUATION_ID_LEN {
            return Err(Error::ConstraintViolation(format!(
                "Situation id '{id}' exceeds {MAX_SITUATION_ID_LEN} characters"
            )));
        }
        let mut situations = self.inner.situations.write();
        if situations.contains_key(&id) {
            return Err(Error::ConstraintViolation(format!("A situation with id '{id}' already exists")));
        }
        let situation = Situation { id, ..situation };
        situations.insert(
            situation.id.clone(),
            SituationEntry { situation, glosses: Vec::new(), descriptions: Vec::new() },
        );
        Ok(())
    }

    pub fn add_situation_gloss(&self, situation: &str, gloss: GlossId) -> Result<()> {
        self.ensure_gloss(gloss)?;
        let mut situations = self.inner.situations.write();
        let entry = situations
            .get_mut(situation)
            .ok_or_else(|| Error::NotFound(format!("Situation {situation}")))?;
        push_unique(&mut entry.glosses, gloss);
        Ok(())
    }

    pub fn add_situation_description(&self, situation: &str, gloss: GlossId) -> Result<()> {
        self.ensure_gloss(gloss)?;
        let mut situations = self.inner.situations.write();
        let entry = situations
            .get_mut(situation)
            .ok_or_else(|| Error::NotFound(format!("Situation {situation}")))?;
        push_unique(&mut entry.descriptions, gloss);
        Ok(())
    }

    /// Delete a situation. Its glosses stay in the graph.
    pub fn delete_situation(&self, situation: &str) -> bool {
        self.inner.situations.write().remove(situation).is_some()
    }

    // ========================================================================
    // Notes
    // ========================================================================

    pub fn add_note(&self, gloss: GlossId, note: Note) -> Result<()> {
        self.ensure_gloss(gloss)?;
        self.inner.notes.write().entry(gloss).or_default().push(note);
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn ensure_gloss(&self, id: GlossId) -> Result<()> {
        if self.inner.glosses.read().contains_key(&id) {
            Ok(())
        } else {
            Err(Error::NotFound(format!("Gloss {id}")))
        }
    }

    /// Map ids to glosses; an id without a gloss is a dangling reference.
    fn resolve(&self, from: &str, relation: &str, ids: &[GlossId]) -> Result<Vec<Gloss>> {
        let glosses = self.inner.glosses.read();
        ids.iter()
            .map(|id| {
                glosses.get(id).cloned().ok_or_else(|| Error::DanglingReference {
                    from: from.to_string(),
                    relation: relation.to_string(),
                    target: *id,
                })
            })
            .collect()
    }

    fn situation_entry(&self, situation: &str) -> Result<SituationEntry> {
        self.inner
            .situations
            .read()
            .get(situation)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Situation {situation}")))
    }

    /// Drop a gloss without touching the edges that point at it.
    #[cfg(test)]
    pub(crate) fn forget_gloss_unchecked(&self, id: GlossId) {
        self.inner.glosses.write().remove(&id);
    }
}

fn push_unique(targets: &mut Vec<GlossId>, id: GlossId) {
    if !targets.contains(&id) {
        targets.push(id);
    }
}

fn remove_edge(
    adj: &mut HashMap<(GlossId, Relation), Vec<GlossId>>,
    key: (GlossId, Relation),
    target: GlossId,
) -> bool {
    let Some(targets) = adj.get_mut(&key) else {
        return false;
    };
    let before = targets.len();
    targets.retain(|t| *t != target);
    let removed = targets.len() != before;
    if targets.is_empty() {
        adj.remove(&key);
    }
    removed
}

// ============================================================================
// GlossStore impl
// ============================================================================

#[async_trait]
impl GlossStore for MemoryStore {
    async fn get_gloss(&self, id: GlossId) -> Result<Option<Gloss>> {
        Ok(self.inner.glosses.read().get(&id).cloned())
    }

    async fn gloss_by_key(&self, key: &CompoundKey) -> Result<Option<Gloss>> {
        let id = self.inner.keys.read().get(key).copied();
        Ok(id.and_then(|id| self.inner.glosses.read().get(&id).cloned()))
    }

    async fn all_glosses(&self) -> Result<Vec<Gloss>> {
        let mut glosses: Vec<Gloss> = self.inner.glosses.read().values().cloned().collect();
        glosses.sort_by(|a, b| (&a.language, &a.content).cmp(&(&b.language, &b.content)));
        Ok(glosses)
    }

    async fn languages(&self) -> Result<Vec<Language>> {
        Ok(self.inner.languages.read().values().cloned().collect())
    }

    async fn situations(&self) -> Result<Vec<Situation>> {
        Ok(self.inner.situations.read().values().map(|e| e.situation.clone()).collect())
    }

    async fn glosses_of_situation(&self, situation: &str) -> Result<Vec<Gloss>> {
        let entry = self.situation_entry(situation)?;
        self.resolve(situation, "glosses", &entry.glosses)
    }

    async fn descriptions_of_situation(&self, situation: &str) -> Result<Vec<Gloss>> {
        let entry = self.situation_entry(situation)?;
        self.resolve(situation, "descriptions", &entry.descriptions)
    }

    async fn related_glosses(&self, gloss: &Gloss, relation: Relation) -> Result<Vec<Gloss>> {
        let ids = self.inner.adjacency.read().get(&(gloss.id, relation)).cloned().unwrap_or_default();
        self.resolve(gloss.compound_key().as_str(), relation.name(), &ids)
    }

    async fn notes_of(&self, gloss: &Gloss) -> Result<Vec<Note>> {
        Ok(self.inner.notes.read().get(&gloss.id).cloned().unwrap_or_default())
    }
}

// ============================================================================
// Tests
// ============================================================================
