//! Editorial queries over the gloss graph.

use crate::model::*;
use crate::storage::GlossStore;
use crate::Result;

/// Maximum hits returned by [`search_glosses`].
pub const SEARCH_LIMIT: usize = 10;

/// Glosses in `native_iso` without any translation into `target_iso`,
/// ordered by content.
pub async fn untranslated_glosses<S: GlossStore + ?Sized>(
    store: &S,
    native_iso: &str,
    target_iso: &str,
) -> Result<Vec<Gloss>> {
    let mut missing = Vec::new();
    for gloss in store.all_glosses().await? {
        if !gloss.is_in(native_iso) {
            continue;
        }
        let translated = store
            .translations_of(&gloss)
            .await?
            .iter()
            .any(|t| t.is_in(target_iso));
        if !translated {
            missing.push(gloss);
        }
    }
    missing.sort_by(|a, b| a.content.cmp(&b.content));
    Ok(missing)
}

/// Case-insensitive substring search on content, optionally restricted to
/// one language. Ordered by content, at most [`SEARCH_LIMIT`] hits.
pub async fn search_glosses<S: GlossStore + ?Sized>(
    store: &S,
    query: &str,
    language_iso: Option<&str>,
) -> Result<Vec<Gloss>> {
    let needle = query.trim().to_lowercase();
    let mut hits: Vec<Gloss> = store
        .all_glosses()
        .await?
        .into_iter()
        .filter(|g| language_iso.is_none_or(|iso| g.is_in(iso)))
        .filter(|g| needle.is_empty() || g.content.to_lowercase().contains(&needle))
        .collect();
    hits.sort_by(|a, b| a.content.cmp(&b.content));
    hits.truncate(SEARCH_LIMIT);
    Ok(hits)
}
