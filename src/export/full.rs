//! Unfiltered exports: the whole graph, and one situation for one pair.

use hashbrown::HashSet;
use tracing::{debug, info};

use crate::config::ExportConfig;
use crate::model::*;
use crate::storage::GlossStore;
use crate::traversal::{collect, LanguagePair};
use crate::Result;
use super::jsonl::{to_jsonl, ExportSink};
use super::record::{to_record, to_records, GlossRecord};

/// Characters stripped from gloss content before it becomes a file name.
const UNSAFE_FILE_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// `{iso}/{prefix}/{iso}:{safe}.json`
///
/// `safe` is the content without [`UNSAFE_FILE_CHARS`], `prefix` its first
/// two characters (one if shorter). A prefix made only of dots becomes `_`
/// so it cannot name a parent directory.
pub fn gloss_file_path(gloss: &Gloss) -> String {
    let safe: String = gloss.content.chars().filter(|c| !UNSAFE_FILE_CHARS.contains(c)).collect();
    let mut prefix: String = safe.chars().take(2).collect();
    if prefix.is_empty() || prefix.chars().all(|c| c == '.') {
        prefix = "_".to_string();
    }
    let iso = &gloss.language;
    format!("{iso}/{prefix}/{iso}:{safe}.json")
}

/// `path` if nothing was written there yet, else `{stem}~{n}.json` with
/// the smallest free `n >= 2`.
fn first_free_path(path: String, taken: &HashSet<String>) -> String {
    if !taken.contains(&path) {
        return path;
    }
    let stem = path.strip_suffix(".json").unwrap_or(&path);
    let mut n = 2;
    loop {
        let candidate = format!("{stem}~{n}.json");
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Write every gloss as its own JSON document, with all relations and no
/// paraphrase filtering. Returns the number of files written.
///
/// Distinct contents can clean to the same [`gloss_file_path`] (`"ab"` and
/// `"a:b"`). Later glosses in store order then get a `~2`, `~3`, ...
/// suffix, so every gloss lands in its own file.
pub async fn export_all_glosses<S: GlossStore + ?Sized>(
    store: &S,
    sink: &mut dyn ExportSink,
    config: &ExportConfig,
) -> Result<usize> {
    config.validate()?;

    let glosses = store.all_glosses().await?;
    let mut written: HashSet<String> = HashSet::with_capacity(glosses.len());
    for gloss in &glosses {
        let record = to_record(store, gloss, None).await?;
        let json = if config.pretty_gloss_json {
            serde_json::to_string_pretty(&record)?
        } else {
            serde_json::to_string(&record)?
        };
        let base = gloss_file_path(gloss);
        let path = first_free_path(base.clone(), &written);
        if path != base {
            debug!(gloss = %gloss, %path, "file name taken, using suffixed path");
        }
        sink.put(&path, json.as_bytes())?;
        written.insert(path);
    }

    info!(glosses = glosses.len(), files = written.len(), "full gloss export written");
    Ok(written.len())
}

/// `glosses_{situation}_{native}_{target}.jsonl`
pub fn situation_file_name(situation: &str, pair: &LanguagePair) -> String {
    format!("glosses_{situation}_{}_{}.jsonl", pair.native, pair.target)
}

/// One situation for one pair, without acceptance checks or paraphrase
/// filtering.
pub async fn export_situation<S: GlossStore + ?Sized>(
    store: &S,
    situation: &str,
    pair: &LanguagePair,
) -> Result<Vec<GlossRecord>> {
    let glosses = collect(store, situation, pair).await?;
    to_records(store, &glosses, None).await
}

/// [`export_situation`] written to `sink` under [`situation_file_name`].
/// Returns the path written.
pub async fn write_situation_export<S: GlossStore + ?Sized>(
    store: &S,
    situation: &str,
    pair: &LanguagePair,
    sink: &mut dyn ExportSink,
) -> Result<String> {
    let records = export_situation(store, situation, pair).await?;
    let path = situation_file_name(situation, pair);
    sink.put(&path, to_jsonl(&records)?.as_bytes())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_of(iso: &str, content: &str) -> String {
        gloss_file_path(&Gloss::new(GlossId(1), iso, content))
    }

    #[test]
    fn test_gloss_file_path() {
        assert_eq!(path_of("eng", "hello"), "eng/he/eng:hello.json");
        assert_eq!(path_of("eng", "a"), "eng/a/eng:a.json");
        assert_eq!(path_of("deu", "Uhr: 12/30?"), "deu/Uh/deu:Uhr 1230.json");
        assert_eq!(path_of("eng", "[greeting]"), "eng/[g/eng:[greeting].json");
    }

    #[test]
    fn test_gloss_file_path_never_climbs() {
        assert_eq!(path_of("eng", "..."), "eng/_/eng:....json");
        assert_eq!(path_of("eng", "???"), "eng/_/eng:.json");
    }

    #[tokio::test]
    async fn test_colliding_file_names_get_suffixes() {
        use crate::export::MemorySink;
        use crate::storage::MemoryStore;

        let db = MemoryStore::new();
        db.add_language(Language::new("eng", "English")).unwrap();
        for content in ["ab", "a:b", "a/b", "???", "**"] {
            db.create_gloss("eng", content, std::iter::empty::<String>()).unwrap();
        }

        let mut sink = MemorySink::new();
        let config = ExportConfig { pretty_gloss_json: false, ..ExportConfig::default() };
        let count = export_all_glosses(&db, &mut sink, &config).await.unwrap();

        assert_eq!(count, 5);
        assert_eq!(sink.len(), 5);
        // Store order is by content: "**" < "???" < "a/b" < "a:b" < "ab".
        let key_at = |path: &str| {
            let record: GlossRecord = serde_json::from_str(sink.get_str(path).unwrap()).unwrap();
            record.key.to_string()
        };
        assert_eq!(key_at("eng/_/eng:.json"), "eng:**");
        assert_eq!(key_at("eng/_/eng:~2.json"), "eng:???");
        assert_eq!(key_at("eng/ab/eng:ab.json"), "eng:a/b");
        assert_eq!(key_at("eng/ab/eng:ab~2.json"), "eng:a:b");
        assert_eq!(key_at("eng/ab/eng:ab~3.json"), "eng:ab");
    }

    #[test]
    fn test_first_free_path_skips_taken_suffixes() {
        let taken: HashSet<String> = ["x/a.json", "x/a~2.json"].into_iter().map(String::from).collect();
        assert_eq!(first_free_path("x/a.json".into(), &taken), "x/a~3.json");
        assert_eq!(first_free_path("x/b.json".into(), &taken), "x/b.json");
    }

    #[test]
    fn test_situation_file_name() {
        assert_eq!(
            situation_file_name("greeting", &LanguagePair::new("deu", "eng")),
            "glosses_greeting_deu_eng.jsonl"
        );
    }
}
