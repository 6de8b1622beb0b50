//! # Traversal Engine
//!
//! Decides which glosses belong to a situation's export for one
//! native/target language pair.
//!
//! ```text
//! situation glosses ──► core_closure (BFS over contains + translations)
//!                          │  frozen result
//!                          ▼
//!                       lateral_expansion (one hop over lateral relations,
//!                                          plus their other-language translations)
//! ```
//!
//! Nodes added by the lateral pass are terminal. Both passes share one
//! visited set keyed by
//! [`CompoundKey`], so a gloss is emitted at most once per call.
//!
//! Paraphrase filtering is not done here; see [`crate::export::record`].

use std::collections::VecDeque;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::model::*;
use crate::storage::GlossStore;
use crate::{Error, Result};

// ============================================================================
// Language pair
// ============================================================================

/// The two languages of an export.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LanguagePair {
    /// The learner's base language.
    pub native: String,
    /// The language being learned.
    pub target: String,
}

impl LanguagePair {
    pub fn new(native: impl Into<String>, target: impl Into<String>) -> Self {
        Self { native: native.into(), target: target.into() }
    }

    /// Native and target must differ.
    pub fn validate(&self) -> Result<()> {
        if self.native == self.target {
            return Err(Error::InvalidPair(format!(
                "native and target are both '{}'",
                self.native
            )));
        }
        Ok(())
    }

    pub fn contains(&self, iso: &str) -> bool {
        self.native == iso || self.target == iso
    }

    /// The opposite language of `iso` within the pair, if `iso` is one of them.
    pub fn other(&self, iso: &str) -> Option<&str> {
        if iso == self.native {
            Some(&self.target)
        } else if iso == self.target {
            Some(&self.native)
        } else {
            None
        }
    }
}

/// Formats as `{target}_{native}`, the pair key used in file names.
impl std::fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.target, self.native)
    }
}

// ============================================================================
// collect
// ============================================================================

/// Visited set of one `collect` call.
pub type Visited = HashSet<CompoundKey>;

/// How a Phase-1 queue entry was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reached {
    Seed,
    Contains,
    Translation,
}

/// Collect the glosses relevant to `situation` for `pair`, in discovery order.
///
/// Deterministic for a fixed store snapshot, free of duplicates by
/// compound key, and terminating on cyclic graphs. Any store error (most
/// importantly a dangling reference) aborts the whole call, as does a pair
/// whose two languages are the same.
#[tracing::instrument(skip(store, pair), fields(native = %pair.native, target = %pair.target))]
pub async fn collect<S: GlossStore + ?Sized>(
    store: &S,
    situation: &str,
    pair: &LanguagePair,
) -> Result<Vec<Gloss>> {
    pair.validate()?;
    let mut visited = Visited::new();

    let mut result = core_closure(store, situation, pair, &mut visited).await?;
    let core = result.len();

    let lateral = lateral_expansion(store, &result, pair, &mut visited).await?;
    result.extend(lateral);

    debug!(core, lateral = result.len() - core, "collected glosses");
    Ok(result)
}

/// Phase 1: breadth-first closure from the situation's glosses.
///
/// Follows `contains` into either pair language and `translations` into
/// the opposite pair language. Seeds are kept whatever their language;
/// a seed outside the pair simply does not expand its translations.
pub async fn core_closure<S: GlossStore + ?Sized>(
    store: &S,
    situation: &str,
    pair: &LanguagePair,
    visited: &mut Visited,
) -> Result<Vec<Gloss>> {
    let mut queue: VecDeque<(Gloss, Reached)> = store
        .glosses_of_situation(situation)
        .await?
        .into_iter()
        .map(|g| (g, Reached::Seed))
        .collect();
    let mut result = Vec::new();

    while let Some((gloss, reached)) = queue.pop_front() {
        let key = gloss.compound_key();
        if visited.contains(&key) {
            continue;
        }
        visited.insert(key);

        for contained in store.related_glosses(&gloss, Relation::Contains).await? {
            if pair.contains(&contained.language) && !visited.contains(&contained.compound_key()) {
                queue.push_back((contained, Reached::Contains));
            }
        }

        if let Some(other) = pair.other(&gloss.language) {
            for translation in store.translations_of(&gloss).await? {
                if translation.is_in(other) && !visited.contains(&translation.compound_key()) {
                    queue.push_back((translation, Reached::Translation));
                }
            }
        }

        trace!(gloss = %gloss, ?reached, "core");
        result.push(gloss);
    }

    Ok(result)
}

/// Phase 2: one hop over [`Relation::LATERAL`] from every Phase-1 gloss in
/// the pair, plus the other-language translations of each newly added gloss.
///
/// `frozen` is only read; returned glosses are not expanded further.
/// The first hop admits any language.
pub async fn lateral_expansion<S: GlossStore + ?Sized>(
    store: &S,
    frozen: &[Gloss],
    pair: &LanguagePair,
    visited: &mut Visited,
) -> Result<Vec<Gloss>> {
    let mut added = Vec::new();

    for seed in frozen {
        let Some(other) = pair.other(&seed.language) else {
            debug!(gloss = %seed, "situation gloss outside the pair, no lateral expansion");
            continue;
        };

        for relation in Relation::LATERAL {
            for related in store.related_glosses(seed, relation).await? {
                if !visited.insert(related.compound_key()) {
                    continue;
                }
                let translations = store.translations_of(&related).await?;
                trace!(gloss = %related, %relation, from = %seed, "lateral");
                added.push(related);

                for translation in translations {
                    if translation.is_in(other) && visited.insert(translation.compound_key()) {
                        added.push(translation);
                    }
                }
            }
        }
    }

    Ok(added)
}
