use crate::task::Task;

/// Case-insensitive substring matcher for task fields.
pub struct TextMatcher {
    needle: String,
}

impl TextMatcher {
    /// Normalize a query string into a matcher. Returns `None` for blank inputs.
    pub fn new(query: &str) -> Option<Self> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            needle: trimmed.to_ascii_lowercase(),
        })
    }

    /// Determine whether any searchable field on the task contains the query.
    /// Title, description, and center all count; matching one is enough.
    pub fn matches(&self, task: &Task) -> bool {
        self.matches_field(&task.title)
            || self.matches_field(&task.description)
            || self.matches_field(&task.center)
    }

    fn matches_field(&self, value: &str) -> bool {
        value.to_ascii_lowercase().contains(&self.needle)
    }
}
