//! Export configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Knobs for batch and full exports.
///
/// Every field has a default, so `{}` is a valid configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Situation × pair cells evaluated concurrently during a batch export.
    /// Must be at least 1. Does not affect output.
    pub concurrency: usize,

    /// Indent per-gloss JSON files in the full export.
    pub pretty_gloss_json: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            pretty_gloss_json: true,
        }
    }
}

impl ExportConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("cannot parse export config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        assert_eq!(ExportConfig::from_json("{}").unwrap(), ExportConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = ExportConfig::from_json(r#"{"concurrency": 16}"#).unwrap();
        assert_eq!(config.concurrency, 16);
        assert!(config.pretty_gloss_json);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(ExportConfig::from_json(r#"{"concurrency": 0}"#), Err(Error::Config(_))));
        assert!(matches!(ExportConfig::from_json("not json"), Err(Error::Config(_))));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        std::fs::write(&path, r#"{"pretty_gloss_json": false}"#).unwrap();
        let config = ExportConfig::from_path(&path).unwrap();
        assert!(!config.pretty_gloss_json);
        assert!(matches!(ExportConfig::from_path(&dir.path().join("missing.json")), Err(Error::Io(_))));
    }
}
