//! Export and import of the full task collection.

use crate::service::TaskService;
use opsboard_core::ExportDocument;
use opsboard_store::{parse_task_records, StorageMedium};
use thiserror::Error;
use time::OffsetDateTime;

/// Error returned by the import flow. On any of these the store — in-memory
/// and, as far as the medium allows, durable — is the same as immediately
/// before the import.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The document could not be understood; nothing was touched.
    #[error("invalid backup format: {0}")]
    Format(String),
    /// The storage medium rejected the imported snapshot; the pre-import
    /// collection was restored.
    #[error("storage rejected the imported snapshot")]
    Storage,
}

/// What an accepted import brought in.
#[derive(Debug, Clone)]
pub struct ImportReport {
    /// Number of tasks in the collection after the import.
    pub imported: usize,
    /// Scope key of the deployment the document came from.
    pub domain: String,
}

/// Parse a raw export document.
///
/// The one structural requirement is that `tasks` is a sequence; a document
/// violating that is rejected before anything is mutated. Individual records
/// that fail validation are dropped, exactly as the load path drops them.
/// Documents from older or foreign deployments that lack the metadata block
/// are accepted with fresh provenance.
///
/// # Errors
/// Returns [`ImportError::Format`] for unparseable JSON or a non-sequence
/// `tasks` field.
pub fn parse_export(raw: &str) -> Result<ExportDocument, ImportError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|err| ImportError::Format(err.to_string()))?;

    let Some(tasks_value) = value.get("tasks") else {
        return Err(ImportError::Format("missing tasks field".to_owned()));
    };
    let Some(tasks) = parse_task_records(tasks_value) else {
        return Err(ImportError::Format("tasks is not a sequence".to_owned()));
    };

    if let Ok(document) = serde_json::from_value::<ExportDocument>(value.clone()) {
        return Ok(document);
    }

    let domain = value
        .get("domain")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("unknown")
        .to_owned();
    Ok(ExportDocument::new(tasks, domain, OffsetDateTime::now_utc()))
}

impl<M: StorageMedium> TaskService<M> {
    /// Build a portable export of the persisted collection.
    #[must_use]
    pub fn export(&self) -> ExportDocument {
        self.store().export_snapshot()
    }

    /// Replace the whole collection with the contents of `raw`.
    ///
    /// The current in-memory collection is snapshotted first. When the
    /// gateway rejects the imported data the snapshot is restored and
    /// re-persisted best-effort, so the store never ends partially
    /// imported. On success the collection is reloaded from the gateway so
    /// in-memory and durable state match exactly.
    ///
    /// # Errors
    /// Returns [`ImportError::Format`] before any mutation, or
    /// [`ImportError::Storage`] after the rollback ran.
    pub fn import_raw(&mut self, raw: &str) -> Result<ImportReport, ImportError> {
        let document = parse_export(raw)?;
        let snapshot = self.tasks().to_vec();

        if self.store().import_snapshot(&document) {
            self.reload();
            Ok(ImportReport {
                imported: self.tasks().len(),
                domain: document.domain,
            })
        } else {
            self.restore(snapshot);
            let _ = self.save();
            Err(ImportError::Storage)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsboard_core::TaskDraft;
    use opsboard_store::{MemoryMedium, SnapshotStore};
    use std::collections::BTreeSet;
    use time::macros::date;

    fn service() -> TaskService<MemoryMedium> {
        TaskService::open(SnapshotStore::new(MemoryMedium::new(), "plant-a"))
    }

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            title: title.into(),
            description: format!("{title} body"),
            date: Some(date!(2024 - 06 - 01)),
            center: "hajeef".into(),
            priority: None,
            tags: BTreeSet::new(),
        }
    }

    #[test]
    fn parse_rejects_non_sequence_tasks() {
        let raw = r#"{"tasks": {"not": "a sequence"}}"#;
        let Err(ImportError::Format(reason)) = parse_export(raw) else {
            panic!("non-sequence tasks must be rejected");
        };
        assert!(reason.contains("sequence"));
    }

    #[test]
    fn parse_accepts_minimal_foreign_documents() {
        let document = parse_export(r#"{"tasks": []}"#)
            .unwrap_or_else(|err| panic!("minimal document must parse: {err}"));
        assert!(document.tasks.is_empty());
        assert_eq!(document.domain, "unknown");
    }

    #[test]
    fn import_of_malformed_document_leaves_state_untouched() {
        let mut service = service();
        service
            .add(draft("Survivor"))
            .unwrap_or_else(|err| panic!("valid draft must add: {err}"));
        let entries_before = service.store().medium().entries();
        let tasks_before = service.tasks().to_vec();

        let result = service.import_raw(r#"{"tasks": 7}"#);
        assert!(matches!(result, Err(ImportError::Format(_))));
        assert_eq!(service.tasks(), tasks_before.as_slice());
        assert_eq!(service.store().medium().entries(), entries_before);
    }

    #[test]
    fn import_failure_restores_pre_import_collection() {
        let mut service = service();
        service
            .add(draft("Original"))
            .unwrap_or_else(|err| panic!("valid draft must add: {err}"));
        let tasks_before = service.tasks().to_vec();

        let incoming = service.export();
        let raw = serde_json::to_string(&incoming)
            .unwrap_or_else(|err| panic!("export must serialize: {err}"));

        service.store().medium().set_available(false);
        let result = service.import_raw(&raw);
        assert!(matches!(result, Err(ImportError::Storage)));
        assert_eq!(service.tasks(), tasks_before.as_slice());
    }

    #[test]
    fn successful_import_matches_in_memory_and_durable_state() {
        let mut exporter = service();
        exporter
            .add(draft("Moved one"))
            .unwrap_or_else(|err| panic!("valid draft must add: {err}"));
        exporter
            .add(draft("Moved two"))
            .unwrap_or_else(|err| panic!("valid draft must add: {err}"));
        let raw = serde_json::to_string(&exporter.export())
            .unwrap_or_else(|err| panic!("export must serialize: {err}"));

        let mut importer = service();
        let report = importer
            .import_raw(&raw)
            .unwrap_or_else(|err| panic!("import must succeed: {err}"));
        assert_eq!(report.imported, 2);
        assert_eq!(report.domain, "plant-a");
        assert_eq!(importer.tasks(), importer.store().load().tasks.as_slice());
    }
}
