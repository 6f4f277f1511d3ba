//! Field-level edits applied to an existing task.

use opsboard_core::{Priority, Status, Task, ValidationError};
use std::collections::BTreeSet;
use time::Date;

/// Shallow replacement patch for a task. Each `Some` field overwrites the
/// corresponding task field; `None` leaves it untouched. The identifier and
/// creation timestamp have no counterpart here, so an edit can never rewrite
/// them.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement due date.
    pub date: Option<Date>,
    /// Replacement center.
    pub center: Option<String>,
    /// Replacement workflow status (the edit path of the status cycle).
    pub status: Option<Status>,
    /// Replacement priority.
    pub priority: Option<Priority>,
    /// Replacement tag set.
    pub tags: Option<BTreeSet<String>>,
}

impl TaskPatch {
    /// Returns true when the patch would not change anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.center.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.tags.is_none()
    }

    /// Check that no replacement value would break the required-field
    /// invariant. Runs before any mutation.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] naming every blank replacement field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            missing.push("title");
        }
        if self
            .description
            .as_deref()
            .is_some_and(|d| d.trim().is_empty())
        {
            missing.push("description");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }

    /// Merge the patch over `task`, field by field.
    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(date) = self.date {
            task.date = date;
        }
        if let Some(center) = self.center {
            task.center = center;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(tags) = self.tags {
            task.tags = tags;
        }
    }
}
