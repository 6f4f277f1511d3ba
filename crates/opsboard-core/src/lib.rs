//! Domain types & pure derivations for opsboard.

/// Portable export document.
pub mod export;
/// Identifier types.
pub mod id;
/// Aggregate counts over a task collection.
pub mod stats;
/// The task entity and its lifecycle primitives.
pub mod task;
/// Free-text search matcher.
pub mod text_matcher;
/// Display-list derivation (filter, sort, search).
pub mod view;

pub use export::{ExportDocument, ExportMetadata, EXPORT_VERSION};
pub use id::TaskId;
pub use stats::{overdue_count, TaskStats};
pub use task::{Priority, Status, Task, TaskDraft, ValidationError};
pub use text_matcher::TextMatcher;
pub use view::{derive_view, Period, SortMode, ViewQuery};
