//! The authoritative task store and its lifecycle operations.

use crate::task_patch::TaskPatch;
use opsboard_core::{
    derive_view, overdue_count, Task, TaskDraft, TaskId, TaskStats, ValidationError, ViewQuery,
};
use opsboard_store::{LoadSource, SnapshotStore, StorageMedium};
use thiserror::Error;
use time::{Date, OffsetDateTime};

/// Error returned by [`TaskService::update`].
#[derive(Debug, Error)]
pub enum UpdateError {
    /// A replacement field was blank; nothing was mutated.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// No task carries the given identifier.
    #[error("task not found: {0}")]
    NotFound(TaskId),
}

/// Result of [`TaskService::add`].
#[derive(Debug, Clone)]
pub struct AddOutcome {
    /// The created task, already part of the in-memory collection.
    pub task: Task,
    /// Whether the collection reached durable storage. The in-memory
    /// addition stands either way; a `false` here means the next save must
    /// retry.
    pub persisted: bool,
}

/// Result of [`TaskService::update`].
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    /// The task after the patch was merged.
    pub task: Task,
    /// Whether the collection reached durable storage.
    pub persisted: bool,
}

/// Result of [`TaskService::delete`].
#[derive(Debug, Clone, Copy)]
pub struct DeleteOutcome {
    /// Whether a task was actually removed. Deleting an absent id is a
    /// no-op, not an error.
    pub removed: bool,
    /// Whether the collection reached durable storage.
    pub persisted: bool,
}

/// Result of [`TaskService::cycle_status`].
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    /// The task after its status advanced one step.
    pub task: Task,
    /// Whether the collection reached durable storage.
    pub persisted: bool,
}

/// Owner of the live task collection. Every mutation goes through here and
/// is handed to the snapshot store for durability; storage failures are
/// reported in the outcome, never fatal, and the service keeps operating on
/// in-memory state.
pub struct TaskService<M> {
    store: SnapshotStore<M>,
    tasks: Vec<Task>,
    load_source: LoadSource,
}

impl<M: StorageMedium> TaskService<M> {
    /// Construct the service, loading the collection from `store` once.
    /// Inspect [`load_source`](Self::load_source) afterwards to surface a
    /// recovery to the user.
    #[must_use]
    pub fn open(store: SnapshotStore<M>) -> Self {
        let outcome = store.load();
        Self {
            store,
            tasks: outcome.tasks,
            load_source: outcome.source,
        }
    }

    /// The current in-memory collection, in store order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Which slot the initial load came from.
    #[must_use]
    pub const fn load_source(&self) -> LoadSource {
        self.load_source
    }

    /// Borrow the underlying snapshot store.
    #[must_use]
    pub const fn store(&self) -> &SnapshotStore<M> {
        &self.store
    }

    /// Persist the current in-memory collection. Used by explicit saves,
    /// the autosave safety net, and the import rollback path.
    pub fn save(&self) -> bool {
        self.store.save(&self.tasks)
    }

    /// Validate `draft` and append it as a fresh pending task.
    ///
    /// The in-memory addition is not rolled back when persistence fails;
    /// the outcome reports `persisted: false` and the next save retries.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] when required fields are blank or
    /// absent; nothing is mutated in that case.
    pub fn add(&mut self, draft: TaskDraft) -> Result<AddOutcome, ValidationError> {
        let task = draft.build(TaskId::new(), OffsetDateTime::now_utc())?;
        self.tasks.push(task.clone());
        let persisted = self.save();
        Ok(AddOutcome { task, persisted })
    }

    /// Merge `patch` over the task with `id` and persist.
    ///
    /// # Errors
    /// Returns [`UpdateError::Validation`] for blank replacement fields and
    /// [`UpdateError::NotFound`] when no task carries `id`; nothing is
    /// mutated on either error.
    pub fn update(&mut self, id: TaskId, patch: TaskPatch) -> Result<UpdateOutcome, UpdateError> {
        patch.validate()?;
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return Err(UpdateError::NotFound(id));
        };
        patch.apply(task);
        let task = task.clone();
        let persisted = self.save();
        Ok(UpdateOutcome { task, persisted })
    }

    /// Remove the task with `id`, if present, and persist.
    pub fn delete(&mut self, id: TaskId) -> DeleteOutcome {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        let removed = self.tasks.len() != before;
        let persisted = self.save();
        DeleteOutcome { removed, persisted }
    }

    /// Advance the task's status one step along the fixed cycle
    /// pending → in progress → completed → pending. Returns `None` when no
    /// task carries `id`.
    pub fn cycle_status(&mut self, id: TaskId) -> Option<CycleOutcome> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        task.status = task.status.next();
        let task = task.clone();
        let persisted = self.save();
        Some(CycleOutcome { task, persisted })
    }

    /// Derive the display list for the current collection under `query`.
    #[must_use]
    pub fn view(&self, query: &ViewQuery, today: Date) -> Vec<Task> {
        derive_view(&self.tasks, query, today)
    }

    /// Status counts over the current collection.
    #[must_use]
    pub fn stats(&self) -> TaskStats {
        TaskStats::collect(&self.tasks)
    }

    /// Number of tasks past due as of `today`.
    #[must_use]
    pub fn overdue_count(&self, today: Date) -> usize {
        overdue_count(&self.tasks, today)
    }

    /// Replace the in-memory collection with whatever durable storage holds.
    pub fn reload(&mut self) -> LoadSource {
        let outcome = self.store.load();
        self.tasks = outcome.tasks;
        self.load_source = outcome.source;
        outcome.source
    }

    pub(crate) fn restore(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }
}
