//! JSON Lines rendering and export sinks.
//!
//! Every line is one compact JSON object; lines are joined with `\n` and
//! there is no trailing newline. Non-ASCII text is written verbatim.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::{Error, Result};

/// Render `items` as JSON Lines.
pub fn to_jsonl<T: Serialize>(items: &[T]) -> Result<String> {
    let lines = items
        .iter()
        .map(serde_json::to_string)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

/// Stream `items` as JSON Lines into `writer`.
pub fn write_jsonl<T: Serialize>(items: &[T], writer: &mut dyn Write) -> Result<()> {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            writer.write_all(b"\n")?;
        }
        serde_json::to_writer(&mut *writer, item)?;
    }
    Ok(())
}

// ============================================================================
// Sinks
// ============================================================================

/// Destination for exported files, addressed by `/`-separated relative paths.
///
/// Archive packaging (ZIP, HTTP download) lives outside this crate and
/// plugs in here.
pub trait ExportSink {
    fn put(&mut self, path: &str, contents: &[u8]) -> Result<()>;
}

/// Writes files below a root directory, creating subdirectories as needed.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ExportSink for DirectorySink {
    fn put(&mut self, path: &str, contents: &[u8]) -> Result<()> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if path.is_empty() || escapes {
            return Err(Error::InvalidPath(path.to_string()));
        }

        let full = self.root.join(relative);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(full, contents)?;
        Ok(())
    }
}

/// Keeps exported files in memory, ordered by path.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// File contents as UTF-8, if present and valid.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn into_files(self) -> BTreeMap<String, Vec<u8>> {
        self.files
    }
}

impl ExportSink for MemorySink {
    fn put(&mut self, path: &str, contents: &[u8]) -> Result<()> {
        if self.files.insert(path.to_string(), contents.to_vec()).is_some() {
            tracing::warn!(path, "export file overwritten");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_jsonl_joins_without_trailing_newline() {
        let out = to_jsonl(&[json!({"a": 1}), json!({"b": "ü"})]).unwrap();
        assert_eq!(out, "{\"a\":1}\n{\"b\":\"ü\"}");
        assert_eq!(to_jsonl::<serde_json::Value>(&[]).unwrap(), "");
    }

    #[test]
    fn test_write_jsonl_matches_to_jsonl() {
        let items = [json!({"k": "eng:hi"}), json!({"k": "deu:hallo"})];
        let mut buf = Vec::new();
        write_jsonl(&items, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), to_jsonl(&items).unwrap());
    }

    #[test]
    fn test_directory_sink_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        sink.put("eng/he/eng:hello.json", b"{}").unwrap();
        let written = std::fs::read_to_string(dir.path().join("eng/he/eng:hello.json")).unwrap();
        assert_eq!(written, "{}");
    }

    #[test]
    fn test_directory_sink_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        assert!(matches!(sink.put("../evil.jsonl", b""), Err(Error::InvalidPath(_))));
        assert!(matches!(sink.put("/etc/evil", b""), Err(Error::InvalidPath(_))));
        assert!(matches!(sink.put("", b""), Err(Error::InvalidPath(_))));
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        sink.put("b.jsonl", b"2").unwrap();
        sink.put("a.jsonl", b"1").unwrap();
        assert_eq!(sink.paths().collect::<Vec<_>>(), ["a.jsonl", "b.jsonl"]);
        assert_eq!(sink.get_str("b.jsonl"), Some("2"));
        assert_eq!(sink.len(), 2);
    }
}
