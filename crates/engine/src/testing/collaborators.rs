//! Fixed-data platform collaborators

use std::collections::HashMap;

use calllog_core::{
    AccountingSink, CallLogReader, CallLogWriter, CallRecord, FailureReason,
    SubscriptionDirectory,
};
use parking_lot::Mutex;

/// Call log returning a fixed set of records.
#[derive(Debug, Clone, Default)]
pub struct StaticCallLog {
    records: Vec<CallRecord>,
}

impl StaticCallLog {
    /// Call log holding `records`, in order.
    pub fn new(records: Vec<CallRecord>) -> Self {
        StaticCallLog { records }
    }

    /// Replace the live records.
    pub fn set(&mut self, records: Vec<CallRecord>) {
        self.records = records;
    }
}

impl CallLogReader for StaticCallLog {
    fn read_calls(&self) -> Vec<CallRecord> {
        self.records.clone()
    }
}

/// Subscription directory with a fixed mapping.
#[derive(Debug, Clone, Default)]
pub struct StaticSubscriptions {
    mapping: Option<HashMap<i32, String>>,
}

impl StaticSubscriptions {
    /// Directory mapping subscription ids to card identifiers.
    pub fn new(mapping: impl IntoIterator<Item = (i32, String)>) -> Self {
        StaticSubscriptions {
            mapping: Some(mapping.into_iter().collect()),
        }
    }

    /// Directory that reports itself unavailable.
    pub fn unavailable() -> Self {
        StaticSubscriptions { mapping: None }
    }
}

impl SubscriptionDirectory for StaticSubscriptions {
    fn snapshot(&self) -> Option<HashMap<i32, String>> {
        self.mapping.clone()
    }
}

#[derive(Debug, Default)]
struct Counters {
    backed_up: u32,
    restored: u32,
    backup_failed: HashMap<FailureReason, u32>,
    restore_failed: HashMap<FailureReason, u32>,
    data_types: Vec<String>,
}

/// Accounting sink that counts every signal.
#[derive(Debug, Default)]
pub struct RecordingAccounting {
    counters: Mutex<Counters>,
}

impl RecordingAccounting {
    /// Sink with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Items reported backed up.
    pub fn backed_up(&self) -> u32 {
        self.counters.lock().backed_up
    }

    /// Items reported restored.
    pub fn restored(&self) -> u32 {
        self.counters.lock().restored
    }

    /// Backup failures reported with `reason`.
    pub fn backup_failed(&self, reason: FailureReason) -> u32 {
        self.counters
            .lock()
            .backup_failed
            .get(&reason)
            .copied()
            .unwrap_or(0)
    }

    /// Restore failures reported with `reason`.
    pub fn restore_failed(&self, reason: FailureReason) -> u32 {
        self.counters
            .lock()
            .restore_failed
            .get(&reason)
            .copied()
            .unwrap_or(0)
    }

    /// Distinct data type labels seen, in first-seen order.
    pub fn data_types(&self) -> Vec<String> {
        self.counters.lock().data_types.clone()
    }

    /// Whether no signal was recorded.
    pub fn is_empty(&self) -> bool {
        let counters = self.counters.lock();
        counters.backed_up == 0
            && counters.restored == 0
            && counters.backup_failed.is_empty()
            && counters.restore_failed.is_empty()
    }

    fn record(&self, data_type: &str, f: impl FnOnce(&mut Counters)) {
        let mut counters = self.counters.lock();
        if !counters.data_types.iter().any(|d| d == data_type) {
            counters.data_types.push(data_type.to_string());
        }
        f(&mut counters);
    }
}

impl AccountingSink for RecordingAccounting {
    fn items_backed_up(&self, data_type: &str, count: u32) {
        self.record(data_type, |c| c.backed_up += count);
    }

    fn items_backup_failed(&self, data_type: &str, count: u32, reason: FailureReason) {
        self.record(data_type, |c| *c.backup_failed.entry(reason).or_insert(0) += count);
    }

    fn items_restored(&self, data_type: &str, count: u32) {
        self.record(data_type, |c| c.restored += count);
    }

    fn items_restore_failed(&self, data_type: &str, count: u32, reason: FailureReason) {
        self.record(data_type, |c| *c.restore_failed.entry(reason).or_insert(0) += count);
    }
}

/// Call log writer that keeps inserted records.
#[derive(Debug, Clone, Default)]
pub struct CollectingWriter {
    records: Vec<CallRecord>,
}

impl CollectingWriter {
    /// Empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserted records, in insertion order.
    pub fn records(&self) -> &[CallRecord] {
        &self.records
    }

    /// Take the inserted records.
    pub fn into_records(self) -> Vec<CallRecord> {
        self.records
    }
}

impl CallLogWriter for CollectingWriter {
    fn insert(&mut self, record: CallRecord) {
        self.records.push(record);
    }
}
