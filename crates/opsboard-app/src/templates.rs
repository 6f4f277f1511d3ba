//! Prefill templates for recurring task shapes.

use opsboard_core::Priority;

/// A canned starting point for a new task. Only prefills the draft; the
/// caller still supplies the due date and center.
#[derive(Debug, Clone, Copy)]
pub struct TaskTemplate {
    /// Token used to select the template.
    pub name: &'static str,
    /// Prefilled title.
    pub title: &'static str,
    /// Prefilled description.
    pub description: &'static str,
    /// Prefilled priority.
    pub priority: Priority,
}

/// The built-in template set.
pub const BUILTIN_TEMPLATES: &[TaskTemplate] = &[
    TaskTemplate {
        name: "maintenance",
        title: "Routine Maintenance Check",
        description: "Perform routine maintenance inspection and service.\n\n1. Check equipment condition\n2. Test all components\n3. Clean and lubricate as needed\n4. Document findings",
        priority: Priority::Medium,
    },
    TaskTemplate {
        name: "inspection",
        title: "Equipment Inspection",
        description: "Conduct thorough equipment inspection.\n\n1. Safety check\n2. Performance evaluation\n3. Check for wear and tear\n4. Document issues found",
        priority: Priority::High,
    },
    TaskTemplate {
        name: "cleaning",
        title: "Facility Cleaning",
        description: "Complete cleaning of facility areas.\n\n1. Clean equipment surfaces\n2. Sanitize work areas\n3. Dispose of waste properly\n4. Check cleaning supplies",
        priority: Priority::Low,
    },
];

/// Look up a built-in template by name.
#[must_use]
pub fn find_template(name: &str) -> Option<&'static TaskTemplate> {
    BUILTIN_TEMPLATES
        .iter()
        .find(|template| template.name.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_are_found_case_insensitively() {
        let template = find_template(" Cleaning ")
            .unwrap_or_else(|| panic!("cleaning template must exist"));
        assert_eq!(template.title, "Facility Cleaning");
        assert_eq!(template.priority, Priority::Low);
        assert!(find_template("unknown").is_none());
    }
}
