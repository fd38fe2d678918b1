//! Incremental reconciliation of the live call log against the backup store
//!
//! One pass compares the ids the backup already holds (`known`, from the
//! reconciliation state) with the ids in the live call log:
//!
//! | in known | in live | action                              |
//! |----------|---------|-------------------------------------|
//! | no       | yes     | migrate, encode, write entity, add  |
//! | yes      | yes     | retain                              |
//! | yes      | no      | write deletion marker, remove       |
//!
//! The state is only mutated after the matching store write succeeded, so
//! `known` never claims an entity the store does not hold. A failed write is
//! retried by the next pass.

use std::collections::BTreeSet;

use calllog_core::{entity_key, AccountingSink, BackupSink, CallRecord, FailureReason};
use calllog_durability::{ReconciliationState, RecordCodec};
use tracing::{debug, error};

use crate::migrator::{IdentifierMigrator, MigrationOutcome};

/// What one reconciliation pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Ids written to the store, in live order
    pub added: Vec<i32>,
    /// Ids deleted from the store, ascending
    pub removed: Vec<i32>,
    /// Live records already held by the store
    pub retained: usize,
    /// Ids whose add failed (encode or write)
    pub add_failed: Vec<i32>,
    /// Ids whose deletion marker could not be written
    pub remove_failed: Vec<i32>,
    /// Records whose account id was rewritten
    pub migrated: usize,
}

/// Diff engine for one backup pass.
pub struct Reconciler<'a> {
    codec: &'a RecordCodec,
    accounting: &'a dyn AccountingSink,
    data_type: &'a str,
    verbose: bool,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler.
    pub fn new(
        codec: &'a RecordCodec,
        accounting: &'a dyn AccountingSink,
        data_type: &'a str,
    ) -> Self {
        Reconciler {
            codec,
            accounting,
            data_type,
            verbose: false,
        }
    }

    /// Include record details in debug logs.
    pub fn with_verbose_records(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run one pass over `live`, mutating `state` to match the store.
    ///
    /// `live` must already exclude voicemail entries. It is consumed exactly
    /// once, in order.
    pub fn reconcile<I>(
        &self,
        state: &mut ReconciliationState,
        live: I,
        migrator: &IdentifierMigrator,
        sink: &mut dyn BackupSink,
    ) -> ReconcileReport
    where
        I: IntoIterator<Item = CallRecord>,
    {
        let mut report = ReconcileReport::default();
        let mut to_remove: BTreeSet<i32> = state.ids().clone();

        for mut record in live {
            if state.contains(record.id) {
                to_remove.remove(&record.id);
                report.retained += 1;
                self.accounting.items_backed_up(self.data_type, 1);
                continue;
            }

            if migrator.migrate(&mut record) == MigrationOutcome::Rewritten {
                report.migrated += 1;
            }

            debug!(target: "calllog::backup", call = %record.summary(self.verbose), "Adding call to backup");
            if self.add(&record, sink) {
                state.insert(record.id);
                report.added.push(record.id);
            } else {
                report.add_failed.push(record.id);
            }
        }

        for id in to_remove {
            debug!(target: "calllog::backup", id, "Removing call from backup");
            match sink.delete_entity(&entity_key(id)) {
                Ok(()) => {
                    state.remove(id);
                    report.removed.push(id);
                }
                Err(e) => {
                    error!(target: "calllog::backup", id, error = %e, "Failed to remove call");
                    report.remove_failed.push(id);
                }
            }
        }

        report
    }

    fn add(&self, record: &CallRecord, sink: &mut dyn BackupSink) -> bool {
        let written = match self.codec.encode(record) {
            Ok(payload) => sink
                .write_entity(&entity_key(record.id), &payload)
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match written {
            Ok(()) => {
                self.accounting.items_backed_up(self.data_type, 1);
                true
            }
            Err(e) => {
                error!(
                    target: "calllog::backup",
                    call = %record.summary(self.verbose),
                    error = %e,
                    "Failed to backup call"
                );
                self.accounting
                    .items_backup_failed(self.data_type, 1, FailureReason::BackupCallFailed);
                false
            }
        }
    }
}
