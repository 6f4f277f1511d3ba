//! Application layer for opsboard.
//!
//! This crate owns the authoritative in-memory task collection, the
//! import/export flow, configuration, and the seams the presentation layer
//! plugs into. Nothing here prints or renders; front-ends consume typed
//! outcomes and the [`Notifier`](notify::Notifier) seam.

pub mod autosave;
pub mod config;
pub mod notify;
pub mod service;
pub mod task_patch;
pub mod templates;
pub mod transfer;

// Re-exports for convenience
pub use autosave::Autosave;
pub use config::{AppConfig, AutosaveConfig, CenterDef, CentersConfig, StorageConfig};
pub use notify::{report_startup, Notifier, NullNotifier, Severity};
pub use service::{
    AddOutcome, CycleOutcome, DeleteOutcome, TaskService, UpdateError, UpdateOutcome,
};
pub use task_patch::TaskPatch;
pub use templates::{find_template, TaskTemplate, BUILTIN_TEMPLATES};
pub use transfer::{parse_export, ImportError, ImportReport};
