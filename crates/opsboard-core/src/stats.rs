use crate::task::{Status, Task};
use time::Date;

/// Counts of a task collection broken down by workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskStats {
    /// Total number of tasks.
    pub total: usize,
    /// Tasks not yet started.
    pub pending: usize,
    /// Tasks being worked on.
    pub in_progress: usize,
    /// Finished tasks.
    pub completed: usize,
}

impl TaskStats {
    /// Tally `tasks` by status.
    #[must_use]
    pub fn collect(tasks: &[Task]) -> Self {
        let mut stats = Self {
            total: tasks.len(),
            ..Self::default()
        };
        for task in tasks {
            match task.status {
                Status::Pending => stats.pending += 1,
                Status::InProgress => stats.in_progress += 1,
                Status::Completed => stats.completed += 1,
            }
        }
        stats
    }
}

/// Number of tasks past due as of `today`.
#[must_use]
pub fn overdue_count(tasks: &[Task], today: Date) -> usize {
    tasks.iter().filter(|task| task.is_overdue(today)).count()
}
