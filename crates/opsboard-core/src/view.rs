use crate::task::{Status, Task};
use crate::text_matcher::TextMatcher;
use time::Date;

/// Time-period filter, evaluated against the caller's reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    /// No period restriction.
    #[default]
    All,
    /// Due date falls in the reference date's calendar month and year.
    Month,
    /// Due date falls in the reference date's calendar year.
    Year,
}

impl Period {
    /// Parse a user-facing period token. Unknown tokens mean no restriction.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "month" => Self::Month,
            "year" => Self::Year,
            _ => Self::All,
        }
    }
}

/// Ordering applied to the derived list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Chronological by due date, earliest first.
    DateAsc,
    /// Chronological by due date, latest first.
    DateDesc,
    /// The mode the UI labels "priority". It ranks by workflow status
    /// (completed, then in progress, then pending), not by the priority
    /// field — the behavior the tool has always shipped with.
    Priority,
}

impl SortMode {
    /// Parse a user-facing sort token. Unrecognized tokens leave the list
    /// order untouched.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "date-asc" => Some(Self::DateAsc),
            "date-desc" => Some(Self::DateDesc),
            "priority" => Some(Self::Priority),
            _ => None,
        }
    }
}

/// Active filter/sort/search state a display list is derived from.
#[derive(Debug, Clone)]
pub struct ViewQuery {
    /// Case-insensitive substring search over title, description, center.
    pub search: Option<String>,
    /// Exact center filter; `None` shows every center.
    pub center: Option<String>,
    /// Exact status filter; `None` shows every status.
    pub status: Option<Status>,
    /// Time-period filter.
    pub period: Period,
    /// Ordering; `None` keeps insertion order.
    pub sort: Option<SortMode>,
}

impl Default for ViewQuery {
    fn default() -> Self {
        Self {
            search: None,
            center: None,
            status: None,
            period: Period::All,
            sort: Some(SortMode::DateDesc),
        }
    }
}

/// Weight table behind [`SortMode::Priority`]. Lower sorts first.
const fn status_rank(status: Status) -> u8 {
    match status {
        Status::Completed => 0,
        Status::InProgress => 1,
        Status::Pending => 2,
    }
}

/// Derive the display list for `tasks` under `query`, with period filters
/// evaluated against `today`. Filters compose by intersection in a fixed
/// order (search, center, status, period) so identical inputs always produce
/// identical output. The input slice is never mutated; sorting happens on
/// the returned copy.
#[must_use]
pub fn derive_view(tasks: &[Task], query: &ViewQuery, today: Date) -> Vec<Task> {
    let matcher = query.search.as_deref().and_then(TextMatcher::new);

    let mut view: Vec<Task> = tasks
        .iter()
        .filter(|task| matcher.as_ref().is_none_or(|m| m.matches(task)))
        .filter(|task| {
            query
                .center
                .as_deref()
                .is_none_or(|center| task.center == center)
        })
        .filter(|task| query.status.is_none_or(|status| task.status == status))
        .filter(|task| match query.period {
            Period::All => true,
            Period::Month => {
                task.date.month() == today.month() && task.date.year() == today.year()
            }
            Period::Year => task.date.year() == today.year(),
        })
        .cloned()
        .collect();

    match query.sort {
        Some(SortMode::DateAsc) => view.sort_by(|a, b| a.date.cmp(&b.date)),
        Some(SortMode::DateDesc) => view.sort_by(|a, b| b.date.cmp(&a.date)),
        Some(SortMode::Priority) => view.sort_by_key(|task| status_rank(task.status)),
        None => {}
    }

    view
}
