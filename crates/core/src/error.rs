//! Error types shared across the backup layers
//!
//! Per-record failures are reported to the accounting sink as a
//! [`FailureReason`]; only failures of the shared reconciliation state abort
//! a pass. We use `thiserror` for `Display` and `Error` implementations.

use std::fmt;
use std::io;
use thiserror::Error;

/// Error returned by a backup entity store write.
#[derive(Debug, Error)]
pub enum BackupStoreError {
    /// Transport I/O failure
    #[error("I/O error writing entity {key}: {source}")]
    Io {
        /// Entity key being written
        key: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The store refused the write
    #[error("Entity {key} rejected: {reason}")]
    Rejected {
        /// Entity key being written
        key: String,
        /// Store-provided description
        reason: String,
    },
}

impl BackupStoreError {
    /// Key of the entity the failed write targeted.
    pub fn key(&self) -> &str {
        match self {
            BackupStoreError::Io { key, .. } | BackupStoreError::Rejected { key, .. } => key,
        }
    }
}

/// Closed set of per-item failure reasons reported to accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// Restore entity key is not an integer
    UnexpectedKey,
    /// Vendor extension guard marker did not match
    EndMarkerNotFound,
    /// Malformed record stream
    ReadingCallData,
    /// Encoding or writing a record to the backup store failed
    BackupCallFailed,
    /// Record was written by a newer, unknown format
    UnsupportedVersion,
}

impl FailureReason {
    /// Stable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            FailureReason::UnexpectedKey => "unexpected_key",
            FailureReason::EndMarkerNotFound => "end_oem_marker_not_found",
            FailureReason::ReadingCallData => "error_reading_call_data",
            FailureReason::BackupCallFailed => "backup_call_failed",
            FailureReason::UnsupportedVersion => "unsupported_version",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
