//! Dataset export: turn traversal results into cross-referenced records.
//!
//! ```text
//! collect() → filter_for_export() → to_record() → SituationDocument
//!   → BatchExport::write_to(sink) → {situation}_{target}_{native}.jsonl + index files
//! ```
//!
//! Records reference each other only through [`CompoundKey`](crate::model::CompoundKey);
//! storage ids never appear in exported data.

pub mod record;
pub mod batch;
pub mod jsonl;
pub mod full;

pub use record::{GlossRecord, to_record, to_records, filter_for_export, is_excluded};
pub use batch::{
    BatchExport, SituationDocument, SituationIndexEntry, LanguageEntry, PairVerdict,
    validate_pair, export_all,
};
pub use jsonl::{ExportSink, DirectorySink, MemorySink, to_jsonl, write_jsonl};
pub use full::{
    export_situation, write_situation_export, export_all_glosses, gloss_file_path, situation_file_name,
};
