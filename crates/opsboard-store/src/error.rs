//! Error types for opsboard store operations.

use thiserror::Error;

/// Errors that can occur while talking to the storage medium. None of these
/// cross the gateway boundary as failures; the gateway converts them into
/// reported outcomes.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The storage medium rejected the operation (disabled, out of space).
    #[error("storage medium unavailable: {0}")]
    Unavailable(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize a snapshot to JSON.
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Failed to format a timestamp for the sync slot.
    #[error("failed to format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}
