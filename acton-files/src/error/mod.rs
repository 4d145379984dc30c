//! Error types and error handling

use crate::storage::StorageError;
use thiserror::Error;

/// Errors raised by attachment operations
///
/// "No file" and "no upload" are not errors: lookups return `None` or a
/// fallback URL and uploads without a file are skipped. What remains are
/// backend failures, which pass through untouched, and configuration or
/// input problems that would otherwise turn into a broken path.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// The storage backend failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// No backend is registered under the disk name
    #[error("Unknown disk: {0}")]
    UnknownDisk(String),

    /// The disk has no root directory configured
    #[error("No root configured for disk: {0}")]
    MissingDiskRoot(String),

    /// No fallback URL is configured for the table
    #[error("No fallback URL configured for table: {0}")]
    MissingFallback(String),

    /// A per-record path was requested for a context without a key
    #[error("Record of table {0} has no key")]
    MissingRecordKey(String),

    /// A logical file or folder name that cannot be used as a path segment
    #[error("Invalid file name: {0:?}")]
    InvalidName(String),

    /// A base64 payload could not be decoded
    #[error("Invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

/// Result type for attachment operations
pub type AttachmentResult<T> = Result<T, AttachmentError>;
