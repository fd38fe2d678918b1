//! Collaborator contracts consumed by the backup engine
//!
//! The engine never talks to the call log, the subscription service or the
//! backup transport directly. Each is injected through one of these traits so
//! a pass is pure computation plus calls to the collaborators.

use std::collections::HashMap;

use crate::error::{BackupStoreError, FailureReason};
use crate::types::CallRecord;

/// Source of the live call log.
pub trait CallLogReader {
    /// Every entry currently on the device, in the store's natural order.
    ///
    /// Implementations may include voicemail entries; the engine filters them
    /// at read time.
    fn read_calls(&self) -> Vec<CallRecord>;
}

/// Source of the subscription id → card identifier mapping.
pub trait SubscriptionDirectory {
    /// Snapshot the mapping for one pass.
    ///
    /// Returns `None` when the subscription service is unavailable.
    fn snapshot(&self) -> Option<HashMap<i32, String>>;
}

/// Write side of the backup entity store.
pub trait BackupSink {
    /// Store `payload` under `key`, replacing any previous entity.
    fn write_entity(&mut self, key: &str, payload: &[u8]) -> Result<(), BackupStoreError>;

    /// Write a deletion marker for `key`.
    fn delete_entity(&mut self, key: &str) -> Result<(), BackupStoreError>;
}

/// Destination of restored records.
pub trait CallLogWriter {
    /// Insert one restored record into the on-device call log.
    fn insert(&mut self, record: CallRecord);
}

/// Per-item success/failure counters.
///
/// Methods take `&self`: the sink is shared by the engine for the whole pass
/// and implementations bring their own interior mutability.
pub trait AccountingSink: Send + Sync {
    /// Items written to or retained in the backup.
    fn items_backed_up(&self, data_type: &str, count: u32);

    /// Items that could not be backed up.
    fn items_backup_failed(&self, data_type: &str, count: u32, reason: FailureReason);

    /// Items restored into the call log.
    fn items_restored(&self, data_type: &str, count: u32);

    /// Items that could not be restored.
    fn items_restore_failed(&self, data_type: &str, count: u32, reason: FailureReason);
}

/// Accounting sink that drops every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAccounting;

impl AccountingSink for NoopAccounting {
    fn items_backed_up(&self, _data_type: &str, _count: u32) {}

    fn items_backup_failed(&self, _data_type: &str, _count: u32, _reason: FailureReason) {}

    fn items_restored(&self, _data_type: &str, _count: u32) {}

    fn items_restore_failed(&self, _data_type: &str, _count: u32, _reason: FailureReason) {}
}
