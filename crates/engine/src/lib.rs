//! Backup and restore orchestration for the call log
//!
//! This crate sits on top of the formats in `calllog-durability`:
//! - BackupAgent: backup and restore entry points
//! - Reconciler: diff of the live call log against the backup store
//! - IdentifierMigrator: subscription id → card id rewriting
//! - BackupConfig: `calllog-backup.toml` settings
//! - testing: in-memory platform collaborators

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod agent;
pub mod config;
pub mod migrator;
pub mod reconcile;
pub mod testing;

pub use agent::{read_live_calls, BackupAgent, BackupError, BackupSummary, RestoreSummary};
pub use config::{BackupConfig, ConfigError, CALL_LOGS_DATA_TYPE, CONFIG_FILE_NAME};
pub use migrator::{should_rewrite_for_backup, IdentifierMigrator, MigrationOutcome};
pub use reconcile::{ReconcileReport, Reconciler};
