//! Integration tests for backup and restore passes.
//!
//! These drive `BackupAgent` against in-memory collaborators across several
//! passes, the way a host runs it: state saved by one pass feeds the next, and
//! the store a device backed up into is restored on another.

#[path = "../common/mod.rs"]
mod common;

mod format_compat;
mod logging;
mod reconciliation;
mod restore;
