//! Durable snapshot storage for opsboard task collections.
//!
//! The store writes the full task list to a primary slot, keeps a
//! timestamped backup copy beside it, and recovers from the backup whenever
//! the primary slot is missing or unreadable. All slots live in a pluggable
//! key/value [`StorageMedium`], namespaced by a per-deployment scope key so
//! deployments sharing a medium do not collide.

/// Error types.
pub mod error;
/// Key/value media implementations.
pub mod medium;

pub use error::StoreError;
pub use medium::{FileMedium, MemoryMedium, StorageMedium};

use opsboard_core::{ExportDocument, Task};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, warn};

const TASKS_SLOT: &str = "tasks";
const BACKUP_SLOT: &str = "tasks_backup";
const LAST_SYNC_SLOT: &str = "last_sync";
const PROBE_SLOT: &str = "storage_test";
const PROBE_VALUE: &str = "test";
const BACKUP_FORMAT_VERSION: &str = "1.0";

/// Where a loaded task list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// The primary slot was intact.
    Primary,
    /// The primary slot was missing or unreadable; the backup supplied the data.
    Backup,
    /// Neither slot held usable data; the store starts empty.
    Empty,
}

impl LoadSource {
    /// True when the data came from the backup slot and the caller should
    /// surface the recovery to the user.
    #[must_use]
    pub const fn is_recovery(self) -> bool {
        matches!(self, Self::Backup)
    }
}

/// Result of a load: the tasks plus where they came from.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// Validated task records. Records failing validation were dropped.
    pub tasks: Vec<Task>,
    /// Which slot supplied the data.
    pub source: LoadSource,
}

/// Envelope written to the backup slot alongside every save.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BackupEnvelope {
    data: Vec<Task>,
    timestamp: String,
    version: String,
}

/// Gateway over a [`StorageMedium`], owning the durable copies of the task
/// collection. It never holds a reference into a live in-memory list; every
/// operation works on serialized snapshots passed through it.
pub struct SnapshotStore<M> {
    medium: M,
    scope: String,
}

impl<M> SnapshotStore<M> {
    /// Create a store writing through `medium`, namespaced by `scope`.
    pub fn new(medium: M, scope: impl Into<String>) -> Self {
        Self {
            medium,
            scope: scope.into(),
        }
    }

    /// Scope key the slots are namespaced by.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Borrow the underlying medium.
    #[must_use]
    pub const fn medium(&self) -> &M {
        &self.medium
    }

    fn key(&self, slot: &str) -> String {
        format!("{}_{}", self.scope, slot)
    }
}

impl<M: StorageMedium> SnapshotStore<M> {
    /// Persist `tasks`: primary slot, then backup envelope, then the
    /// last-sync stamp. Returns `false` when the medium rejects any write;
    /// the failure is logged, never raised, and the caller's in-memory
    /// state is considered not yet durable.
    pub fn save(&self, tasks: &[Task]) -> bool {
        match self.try_save(tasks) {
            Ok(()) => true,
            Err(err) => {
                warn!(%err, "failed to persist tasks");
                false
            }
        }
    }

    fn try_save(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let now = OffsetDateTime::now_utc();
        let stamp = now.format(&Rfc3339)?;

        let serialized = serde_json::to_string(tasks).map_err(StoreError::Serialize)?;
        self.medium.write(&self.key(TASKS_SLOT), &serialized)?;

        let envelope = BackupEnvelope {
            data: tasks.to_vec(),
            timestamp: stamp.clone(),
            version: BACKUP_FORMAT_VERSION.to_owned(),
        };
        let serialized = serde_json::to_string(&envelope).map_err(StoreError::Serialize)?;
        self.medium.write(&self.key(BACKUP_SLOT), &serialized)?;

        self.medium.write(&self.key(LAST_SYNC_SLOT), &stamp)?;
        Ok(())
    }

    /// Load the task collection from the primary slot, falling back to
    /// [`recover`](Self::recover) when the slot is absent or unreadable.
    /// Parse failures never propagate; the outcome reports which slot
    /// supplied the data.
    pub fn load(&self) -> LoadOutcome {
        match self.medium.read(&self.key(TASKS_SLOT)) {
            Ok(Some(raw)) => parse_records(&raw).map_or_else(
                || {
                    debug!("primary slot is unreadable, trying backup");
                    self.recover()
                },
                |tasks| LoadOutcome {
                    tasks,
                    source: LoadSource::Primary,
                },
            ),
            Ok(None) => self.recover(),
            Err(err) => {
                warn!(%err, "failed to read primary slot");
                self.recover()
            }
        }
    }

    /// Load the backup slot's data. An absent or unreadable backup yields an
    /// empty collection; this never fails.
    pub fn recover(&self) -> LoadOutcome {
        let recovered = match self.medium.read(&self.key(BACKUP_SLOT)) {
            Ok(Some(raw)) => serde_json::from_str::<serde_json::Value>(&raw)
                .ok()
                .and_then(|envelope| {
                    envelope
                        .get("data")
                        .and_then(|data| parse_task_records(data))
                }),
            Ok(None) => None,
            Err(err) => {
                warn!(%err, "failed to read backup slot");
                None
            }
        };

        recovered.map_or(
            LoadOutcome {
                tasks: Vec::new(),
                source: LoadSource::Empty,
            },
            |tasks| LoadOutcome {
                tasks,
                source: LoadSource::Backup,
            },
        )
    }

    /// Round-trip a sentinel value through the medium to confirm it can be
    /// both written and read. Used at startup to decide whether to warn.
    pub fn check_availability(&self) -> bool {
        let key = self.key(PROBE_SLOT);
        if self.medium.write(&key, PROBE_VALUE).is_err() {
            return false;
        }
        let observed = match self.medium.read(&key) {
            Ok(value) => value,
            Err(_) => return false,
        };
        // Best-effort cleanup; a leftover probe value is harmless.
        let _ = self.medium.delete(&key);
        observed.as_deref() == Some(PROBE_VALUE)
    }

    /// Build a portable export of the persisted collection plus summary
    /// counts computed now.
    pub fn export_snapshot(&self) -> ExportDocument {
        let LoadOutcome { tasks, .. } = self.load();
        ExportDocument::new(tasks, self.scope.clone(), OffsetDateTime::now_utc())
    }

    /// Replace the persisted collection with the document's tasks. The
    /// document's shape was validated when it was parsed; this only reports
    /// whether the save went through.
    pub fn import_snapshot(&self, document: &ExportDocument) -> bool {
        self.save(&document.tasks)
    }

    /// Write a timestamped copy of the current export document under a
    /// fresh archive key, leaving the live slots untouched. Returns `false`
    /// when the medium rejects the write.
    pub fn archive_snapshot(&self) -> bool {
        let document = self.export_snapshot();
        let key = format!(
            "{}_archive_{}",
            self.scope,
            document.export_date.unix_timestamp()
        );
        let serialized = match serde_json::to_string(&document) {
            Ok(serialized) => serialized,
            Err(err) => {
                warn!(%err, "failed to serialize archive snapshot");
                return false;
            }
        };
        match self.medium.write(&key, &serialized) {
            Ok(()) => true,
            Err(err) => {
                warn!(%err, "failed to write archive snapshot");
                false
            }
        }
    }

    /// Timestamp of the last successful save, if one is recorded.
    pub fn last_sync(&self) -> Option<OffsetDateTime> {
        let raw = self.medium.read(&self.key(LAST_SYNC_SLOT)).ok()??;
        OffsetDateTime::parse(raw.trim(), &Rfc3339).ok()
    }
}

/// Parse a serialized task array. Returns `None` when the value is not an
/// array at all; individual records failing validation are dropped.
fn parse_records(raw: &str) -> Option<Vec<Task>> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    parse_task_records(&value)
}

/// Extract the valid task records from a JSON value. Returns `None` when the
/// value is not an array at all; individual records that fail to deserialize
/// or that break the required-field invariant are dropped. Shared by the
/// load path and by import-document parsing.
#[must_use]
pub fn parse_task_records(value: &serde_json::Value) -> Option<Vec<Task>> {
    let entries = value.as_array()?;
    let mut tasks = Vec::with_capacity(entries.len());
    let mut dropped = 0_usize;
    for entry in entries {
        match serde_json::from_value::<Task>(entry.clone()) {
            Ok(task) if task.has_required_fields() => tasks.push(task),
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        debug!(dropped, "dropped stored records failing validation");
    }
    Some(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsboard_core::{Status, TaskDraft, TaskId};
    use time::macros::{date, datetime};

    fn sample_task(title: &str) -> Task {
        TaskDraft {
            title: title.into(),
            description: format!("{title} body"),
            date: Some(date!(2024 - 06 - 01)),
            center: "ghado".into(),
            priority: None,
            tags: std::collections::BTreeSet::new(),
        }
        .build(TaskId::new(), datetime!(2024-05-01 08:00 UTC))
        .unwrap_or_else(|err| panic!("valid draft must build: {err}"))
    }

    fn store() -> SnapshotStore<MemoryMedium> {
        SnapshotStore::new(MemoryMedium::new(), "plant-a")
    }

    #[test]
    fn save_then_load_uses_primary_slot() {
        let store = store();
        let tasks = vec![sample_task("One"), sample_task("Two")];
        assert!(store.save(&tasks));

        let outcome = store.load();
        assert_eq!(outcome.source, LoadSource::Primary);
        assert_eq!(outcome.tasks, tasks);
    }

    #[test]
    fn corrupt_primary_falls_back_to_backup() {
        let store = store();
        let tasks = vec![sample_task("Kept")];
        assert!(store.save(&tasks));

        store
            .medium()
            .write("plant-a_tasks", "{not json")
            .unwrap_or_else(|err| panic!("write must succeed: {err}"));

        let outcome = store.load();
        assert_eq!(outcome.source, LoadSource::Backup);
        assert_eq!(outcome.tasks, tasks);
    }

    #[test]
    fn missing_primary_and_backup_starts_empty() {
        let outcome = store().load();
        assert_eq!(outcome.source, LoadSource::Empty);
        assert!(outcome.tasks.is_empty());
    }

    #[test]
    fn corrupt_backup_also_starts_empty() {
        let store = store();
        store
            .medium()
            .write("plant-a_tasks", "not an array at all")
            .unwrap_or_else(|err| panic!("write must succeed: {err}"));
        store
            .medium()
            .write("plant-a_tasks_backup", "[1, 2, 3]")
            .unwrap_or_else(|err| panic!("write must succeed: {err}"));

        let outcome = store.load();
        assert_eq!(outcome.source, LoadSource::Empty);
        assert!(outcome.tasks.is_empty());
    }

    #[test]
    fn records_failing_validation_are_dropped_on_load() {
        let store = store();
        let good = sample_task("Good");
        let good_json = serde_json::to_value(&good)
            .unwrap_or_else(|err| panic!("task must serialize: {err}"));
        let blank_title = serde_json::json!({
            "id": TaskId::new().to_string(),
            "title": "   ",
            "description": "body",
            "date": "2024-06-01",
            "center": "ghado",
            "status": "pending",
            "createdAt": "2024-05-01T08:00:00Z"
        });
        let raw = serde_json::to_string(&serde_json::Value::Array(vec![
            good_json,
            blank_title,
            serde_json::json!("garbage"),
        ]))
        .unwrap_or_else(|err| panic!("array must serialize: {err}"));
        store
            .medium()
            .write("plant-a_tasks", &raw)
            .unwrap_or_else(|err| panic!("write must succeed: {err}"));

        let outcome = store.load();
        assert_eq!(outcome.source, LoadSource::Primary);
        assert_eq!(outcome.tasks, vec![good]);
    }

    #[test]
    fn unavailable_medium_fails_save_and_probe() {
        let store = store();
        store.medium().set_available(false);

        assert!(!store.save(&[sample_task("Lost")]));
        assert!(!store.check_availability());
    }

    #[test]
    fn probe_round_trips_and_cleans_up() {
        let store = store();
        assert!(store.check_availability());
        assert!(!store.medium().entries().contains_key("plant-a_storage_test"));
    }

    #[test]
    fn save_records_last_sync() {
        let store = store();
        assert!(store.last_sync().is_none());
        assert!(store.save(&[sample_task("Synced")]));
        assert!(store.last_sync().is_some());
    }

    #[test]
    fn export_snapshot_counts_by_status() {
        let store = store();
        let mut done = sample_task("Done");
        done.status = Status::Completed;
        assert!(store.save(&[sample_task("Open"), done]));

        let document = store.export_snapshot();
        assert_eq!(document.domain, "plant-a");
        assert_eq!(document.metadata.total_tasks, 2);
        assert_eq!(document.metadata.pending_tasks, 1);
        assert_eq!(document.metadata.completed_tasks, 1);
    }

    #[test]
    fn import_snapshot_replaces_persisted_collection() {
        let store = store();
        assert!(store.save(&[sample_task("Before")]));

        let replacement = vec![sample_task("After")];
        let document = ExportDocument::new(
            replacement.clone(),
            "plant-b",
            datetime!(2024-06-01 12:00 UTC),
        );
        assert!(store.import_snapshot(&document));

        let outcome = store.load();
        assert_eq!(outcome.tasks, replacement);
    }

    #[test]
    fn archive_snapshot_writes_a_parseable_document() {
        let store = store();
        assert!(store.save(&[sample_task("Archived")]));
        assert!(store.archive_snapshot());

        let entries = store.medium().entries();
        let (key, raw) = entries
            .iter()
            .find(|(key, _)| key.starts_with("plant-a_archive_"))
            .unwrap_or_else(|| panic!("archive key must exist"));
        let document: ExportDocument = serde_json::from_str(raw)
            .unwrap_or_else(|err| panic!("archive under {key} must parse: {err}"));
        assert_eq!(document.metadata.total_tasks, 1);
    }
}
