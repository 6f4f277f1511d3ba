//! Notification seam between the store and the presentation layer.

use crate::service::TaskService;
use opsboard_store::StorageMedium;
use time::Date;

/// How loud a notification should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Background information (recoveries, template loads).
    Info,
    /// An operation completed as asked.
    Success,
    /// Something degraded but the tool keeps working.
    Warning,
    /// An operation did not go through.
    Error,
}

impl Severity {
    /// Token used when rendering the severity.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Sink for user-facing messages. Implemented by the presentation layer;
/// library code never prints.
pub trait Notifier {
    /// Surface `message` to the user at the given severity.
    fn notify(&self, message: &str, severity: Severity);
}

/// Notifier that drops everything, for headless use and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _message: &str, _severity: Severity) {}
}

/// Surface the startup signals a fresh session cares about: an unavailable
/// medium, a backup recovery, and any overdue tasks.
pub fn report_startup<M: StorageMedium>(
    service: &TaskService<M>,
    storage_available: bool,
    today: Date,
    notifier: &dyn Notifier,
) {
    if !storage_available {
        notifier.notify(
            "Storage is not available. Your changes may not be saved.",
            Severity::Warning,
        );
    }
    if service.load_source().is_recovery() {
        notifier.notify("Recovered data from backup", Severity::Info);
    }
    let overdue = service.overdue_count(today);
    if overdue > 0 {
        notifier.notify(&format!("You have {overdue} overdue tasks"), Severity::Warning);
    }
}
