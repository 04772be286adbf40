//! Inspection error types

use std::io;
use std::path::Path;
use thiserror::Error;

/// The main error type for disk inspection
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while opening or reading a source
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Source path does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Source exists but may not be opened
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A read extends past the end of the source
    #[error("Read of {length} bytes at offset {offset} exceeds source size {size}")]
    OutOfRange { offset: u64, length: u64, size: u64 },

    /// Neither a GPT nor an MBR partition table was found
    #[error("Unrecognized partition table: {0}")]
    UnrecognizedFormat(String),

    /// A GPT header or partition array checksum did not match
    #[error("Checksum verification failed: {0}")]
    ChecksumMismatch(String),

    /// The partition entry array extends past the end of the source
    #[error("Truncated partition table: {required} bytes required, {available} available")]
    TruncatedTable { required: u64, available: u64 },

    /// A partition entry (or the entry layout) is malformed
    #[error("Invalid partition entry: {0}")]
    InvalidEntry(String),

    /// Invalid operation or configuration
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type alias for inspection operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Map an error raised while opening `path` to the matching variant
    pub fn from_open(err: io::Error, path: &Path) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
            io::ErrorKind::PermissionDenied => {
                Error::PermissionDenied(path.display().to_string())
            }
            _ => Error::Io(err),
        }
    }

    /// Create an unrecognized format error
    pub fn unrecognized_format(msg: impl Into<String>) -> Self {
        Error::UnrecognizedFormat(msg.into())
    }

    /// Create a checksum mismatch error
    pub fn checksum_mismatch(msg: impl Into<String>) -> Self {
        Error::ChecksumMismatch(msg.into())
    }

    /// Create an invalid entry error for the slot at `index`
    pub fn invalid_entry(index: usize, reason: impl std::fmt::Display) -> Self {
        Error::InvalidEntry(format!("slot {}: {}", index, reason))
    }

    /// Create an invalid entry error describing the table layout rather than one slot
    pub fn invalid_layout(msg: impl Into<String>) -> Self {
        Error::InvalidEntry(msg.into())
    }

    /// Create an invalid operation error
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Error::InvalidOperation(msg.into())
    }
}
