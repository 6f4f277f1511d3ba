use crate::task::{Status, Task};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Format version stamped into every export document.
pub const EXPORT_VERSION: &str = "1.0";

const EXPORT_TYPE_FULL_BACKUP: &str = "full-backup";

/// Portable snapshot of the full task collection plus provenance metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    /// Every task at snapshot time, in store order.
    pub tasks: Vec<Task>,
    /// When the snapshot was taken.
    #[serde(with = "time::serde::rfc3339")]
    pub export_date: OffsetDateTime,
    /// Scope key of the originating deployment, so snapshots stay traceable.
    pub domain: String,
    /// Document format version.
    pub version: String,
    /// Counts computed at snapshot time; never re-derived at import.
    pub metadata: ExportMetadata,
}

/// Summary block of an [`ExportDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    /// Total number of tasks in the snapshot.
    pub total_tasks: usize,
    /// Number of pending tasks.
    pub pending_tasks: usize,
    /// Number of completed tasks.
    pub completed_tasks: usize,
    /// Kind of export this document represents.
    pub export_type: String,
}

impl ExportDocument {
    /// Build a snapshot of `tasks` taken at `exported_at` for the deployment
    /// identified by `domain`.
    #[must_use]
    pub fn new(tasks: Vec<Task>, domain: impl Into<String>, exported_at: OffsetDateTime) -> Self {
        let metadata = ExportMetadata {
            total_tasks: tasks.len(),
            pending_tasks: tasks.iter().filter(|t| t.status == Status::Pending).count(),
            completed_tasks: tasks
                .iter()
                .filter(|t| t.status == Status::Completed)
                .count(),
            export_type: EXPORT_TYPE_FULL_BACKUP.to_owned(),
        };
        Self {
            tasks,
            export_date: exported_at,
            domain: domain.into(),
            version: EXPORT_VERSION.to_owned(),
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::TaskId;
    use crate::task::Priority;
    use std::collections::BTreeSet;
    use time::macros::{date, datetime};

    fn task(status: Status) -> Task {
        Task {
            id: TaskId::new(),
            title: "Sample".into(),
            description: "Body".into(),
            date: date!(2024 - 06 - 01),
            center: "ghado".into(),
            status,
            priority: Priority::Medium,
            tags: BTreeSet::new(),
            created_at: datetime!(2024-05-01 08:00 UTC),
        }
    }

    #[test]
    fn metadata_counts_by_status_at_snapshot_time() {
        let tasks = vec![
            task(Status::Pending),
            task(Status::Pending),
            task(Status::InProgress),
            task(Status::Completed),
        ];
        let doc = ExportDocument::new(tasks, "plant-a", datetime!(2024-06-01 12:00 UTC));
        assert_eq!(doc.metadata.total_tasks, 4);
        assert_eq!(doc.metadata.pending_tasks, 2);
        assert_eq!(doc.metadata.completed_tasks, 1);
        assert_eq!(doc.version, EXPORT_VERSION);
        assert_eq!(doc.metadata.export_type, "full-backup");
    }

    #[test]
    fn document_uses_wire_field_names() {
        let doc = ExportDocument::new(Vec::new(), "plant-a", datetime!(2024-06-01 12:00 UTC));
        let value = serde_json::to_value(&doc)
            .unwrap_or_else(|err| panic!("document must serialize: {err}"));
        assert!(value.get("exportDate").is_some());
        assert!(value["metadata"].get("totalTasks").is_some());
        assert!(value["metadata"].get("exportType").is_some());
    }
}
