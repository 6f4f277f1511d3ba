use crate::id::TaskId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;
use time::{Date, OffsetDateTime};

time::serde::format_description!(due_date, Date, "[year]-[month]-[day]");

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Not yet started. Every task begins here.
    #[default]
    Pending,
    /// Actively being worked on.
    // Older snapshots wrote the bare token "progress"; keep accepting it.
    #[serde(alias = "progress")]
    InProgress,
    /// Finished.
    Completed,
}

impl Status {
    /// String representation used on the wire and in filter tokens.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Advance one step along the fixed cycle
    /// pending → in progress → completed → pending.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Pending => Self::InProgress,
            Self::InProgress => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }

    /// Parse a user-facing status token.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "in_progress" | "in-progress" | "progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Importance level of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Can wait.
    Low,
    /// The default level.
    #[default]
    Medium,
    /// Needs attention first.
    High,
}

impl Priority {
    /// String representation used on the wire and in CLI flags.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parse a user-facing priority token.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work tied to a center, due date, priority, and status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, assigned at creation, never rewritten.
    pub id: TaskId,
    /// Short task title. Never blank for an accepted task.
    pub title: String,
    /// Longer task body. Never blank for an accepted task.
    pub description: String,
    /// Due date, day granularity.
    #[serde(with = "due_date")]
    pub date: Date,
    /// Named location the task belongs to. The allowed set is configuration,
    /// not a core concern.
    pub center: String,
    /// Current workflow status.
    pub status: Status,
    /// Importance level.
    #[serde(default)]
    pub priority: Priority,
    /// Free-text labels, duplicates collapsed.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Creation timestamp, set once.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Task {
    /// Whether the task is past due: never for a completed task, otherwise
    /// true iff the due date is strictly before `today`.
    #[must_use]
    pub fn is_overdue(&self, today: Date) -> bool {
        if self.status == Status::Completed {
            return false;
        }
        self.date < today
    }

    /// Whether the record satisfies the required-field invariant. Records
    /// loaded from storage that fail this check are dropped.
    #[must_use]
    pub fn has_required_fields(&self) -> bool {
        !self.title.trim().is_empty() && !self.description.trim().is_empty()
    }
}

/// Error raised when a draft or edit is missing required fields. Nothing is
/// mutated when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required fields: {}", missing.join(", "))]
pub struct ValidationError {
    /// Names of the fields that were blank or absent.
    pub missing: Vec<&'static str>,
}

/// User-provided fields for a task that does not exist yet.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    /// Required title.
    pub title: String,
    /// Required description.
    pub description: String,
    /// Required due date.
    pub date: Option<Date>,
    /// Target center.
    pub center: String,
    /// Importance level; medium when unspecified.
    pub priority: Option<Priority>,
    /// Free-text labels.
    pub tags: BTreeSet<String>,
}

impl TaskDraft {
    /// Check the required-field invariant without constructing anything.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] naming every blank or absent field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.description.trim().is_empty() {
            missing.push("description");
        }
        if self.date.is_none() {
            missing.push("date");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }

    /// Turn the draft into a full task. Validation happens before the task
    /// is constructed; a rejected draft produces nothing.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] when required fields are blank or absent.
    pub fn build(self, id: TaskId, created_at: OffsetDateTime) -> Result<Task, ValidationError> {
        self.validate()?;
        let Some(date) = self.date else {
            return Err(ValidationError { missing: vec!["date"] });
        };
        Ok(Task {
            id,
            title: self.title,
            description: self.description,
            date,
            center: self.center,
            status: Status::Pending,
            priority: self.priority.unwrap_or_default(),
            tags: self.tags,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn draft(title: &str, description: &str, date: Option<Date>) -> TaskDraft {
        TaskDraft {
            title: title.into(),
            description: description.into(),
            date,
            center: "ghado".into(),
            priority: None,
            tags: BTreeSet::new(),
        }
    }

    #[test]
    fn build_assigns_pending_status_and_default_priority() {
        let task = draft("Check pumps", "Inspect pump room", Some(date!(2024 - 06 - 01)))
            .build(TaskId::new(), datetime!(2024-05-01 08:00 UTC))
            .unwrap_or_else(|err| panic!("valid draft must build: {err}"));
        assert_eq!(task.status, Status::Pending);
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn build_rejects_blank_fields_listing_each() {
        let Err(err) = draft("  ", "", None).build(TaskId::new(), datetime!(2024-05-01 08:00 UTC))
        else {
            panic!("blank draft must be rejected");
        };
        assert_eq!(err.missing, vec!["title", "description", "date"]);
    }

    #[test]
    fn status_cycle_closes_after_three_steps() {
        let start = Status::Pending;
        assert_eq!(start.next().next().next(), start);
        assert_eq!(Status::InProgress.next().next().next(), Status::InProgress);
    }

    #[test]
    fn overdue_ignores_completed_tasks() {
        let mut task = draft("Old", "Past due", Some(date!(2024 - 01 - 01)))
            .build(TaskId::new(), datetime!(2024-01-01 00:00 UTC))
            .unwrap_or_else(|err| panic!("valid draft must build: {err}"));
        assert!(task.is_overdue(date!(2024 - 06 - 01)));

        task.status = Status::Completed;
        assert!(!task.is_overdue(date!(2024 - 06 - 01)));
    }

    #[test]
    fn overdue_is_strict_day_comparison() {
        let task = draft("Today", "Due today", Some(date!(2024 - 06 - 01)))
            .build(TaskId::new(), datetime!(2024-05-01 08:00 UTC))
            .unwrap_or_else(|err| panic!("valid draft must build: {err}"));
        assert!(!task.is_overdue(date!(2024 - 06 - 01)));
        assert!(task.is_overdue(date!(2024 - 06 - 02)));
    }

    #[test]
    fn status_accepts_legacy_progress_token() {
        let status: Status = serde_json::from_str("\"progress\"")
            .unwrap_or_else(|err| panic!("legacy token must deserialize: {err}"));
        assert_eq!(status, Status::InProgress);
        let json = serde_json::to_string(&status)
            .unwrap_or_else(|err| panic!("status must serialize: {err}"));
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn task_serializes_with_wire_field_names() {
        let task = draft("Wire", "Field names", Some(date!(2024 - 06 - 01)))
            .build(TaskId::new(), datetime!(2024-05-01 08:00 UTC))
            .unwrap_or_else(|err| panic!("valid draft must build: {err}"));
        let value = serde_json::to_value(&task)
            .unwrap_or_else(|err| panic!("task must serialize: {err}"));
        assert_eq!(value["date"], "2024-06-01");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("created_at").is_none());
    }
}
