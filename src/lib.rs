//! Incremental backup and restore of the device call log
//!
//! Each backup pass compares the live call log against the ids recorded by the
//! previous pass, writes new calls to the backup store as versioned binary
//! records, and deletes calls that disappeared. Restore decodes every stored
//! record independently and inserts it into the call log.
//!
//! # Quick Start
//!
//! ```ignore
//! use calllog_backup::{BackupAgent, BackupConfig};
//!
//! let agent = BackupAgent::new(BackupConfig::default())?;
//!
//! // Backup: previous state in, new state out
//! let summary = agent.backup(old_state, &call_log, &subscriptions, &mut store, &mut new_state)?;
//!
//! // Restore
//! let restored = agent.restore(entities, &mut call_log_writer);
//! ```
//!
//! # Architecture
//!
//! - `calllog-core`: records, collaborator traits, failure reasons
//! - `calllog-durability`: wire primitives, state and record codecs
//! - `calllog-engine`: reconciliation, migration, configuration, entry points

pub use calllog_core::*;
pub use calllog_durability::{
    extension, NoVendorExtension, ReconciliationState, RecordCodec, RecordDecodeError,
    RecordEncodeError, StateCodec, StateError, UnknownRevision, VendorExtensionHooks, WireError,
    END_VENDOR_MARKER, GRANDFATHERED_RECORD_VERSION, NO_PREVIOUS_STATE, RECORD_FORMAT_VERSION,
    SCHEMA_REVISIONS, STATE_FORMAT_VERSION,
};
pub use calllog_engine::{
    read_live_calls, testing, BackupAgent, BackupConfig, BackupError, BackupSummary,
    ConfigError, IdentifierMigrator, MigrationOutcome, ReconcileReport, Reconciler,
    RestoreSummary, CALL_LOGS_DATA_TYPE, CONFIG_FILE_NAME,
};
