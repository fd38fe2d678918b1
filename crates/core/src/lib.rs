//! Core types and traits for call log backup
//!
//! This crate defines the foundational types used throughout the system:
//! - CallRecord: one call log entry, the unit of backup and restore
//! - VendorExtension: opaque namespaced payload carried with a record
//! - BackupEntity: one (key, payload) pair read back from the backup store
//! - FailureReason: closed set of per-item failure codes
//! - Traits: collaborator contracts (call log, subscriptions, entity store, accounting)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{BackupStoreError, FailureReason};
pub use traits::{
    AccountingSink, BackupSink, CallLogReader, CallLogWriter, NoopAccounting,
    SubscriptionDirectory,
};
pub use types::{
    call_types, entity_key, AccountHandle, BackupEntity, CallRecord, RecordSummary,
    VendorExtension, BLOCK_REASON_NOT_BLOCKED, MISSED_REASON_NOT_MISSED, NO_VENDOR_NAMESPACE,
    TELEPHONY_COMPONENT_NAME,
};
