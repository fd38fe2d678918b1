//! Backup pass

use std::io::{self, Read, Write};

use calllog_core::{BackupSink, CallLogReader, CallRecord, SubscriptionDirectory};
use calllog_durability::{StateCodec, StateError, NO_PREVIOUS_STATE};
use tracing::{error, info};

use super::BackupAgent;
use crate::migrator::IdentifierMigrator;
use crate::reconcile::Reconciler;

/// Outcome of a completed backup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupSummary {
    /// Ids written to the store
    pub added: Vec<i32>,
    /// Ids deleted from the store
    pub removed: Vec<i32>,
    /// Live records the store already held
    pub retained: usize,
    /// Ids whose store write failed; retried next pass
    pub failed: Vec<i32>,
    /// Version of the state the pass started from (0 if none)
    pub previous_state_version: i32,
}

impl BackupSummary {
    /// Whether the pass was a first backup.
    pub fn is_first_backup(&self) -> bool {
        self.previous_state_version == NO_PREVIOUS_STATE
    }
}

/// Errors that abort a backup pass.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    /// Previous state is corrupt; nothing was written to the store
    #[error("Failed to load previous backup state: {0}")]
    State(#[from] StateError),

    /// Store was updated but the new state could not be saved
    #[error("Failed to persist backup state: {0}")]
    StatePersist(#[source] io::Error),
}

/// Read the live call log, dropping voicemail entries.
pub fn read_live_calls(reader: &dyn CallLogReader) -> Vec<CallRecord> {
    reader
        .read_calls()
        .into_iter()
        .filter(|record| !record.is_voicemail())
        .collect()
}

impl BackupAgent {
    /// Run one backup pass.
    ///
    /// `old_state` holds the state saved by the previous pass (empty on the
    /// first one). `new_state` receives the state to hand to the next pass.
    pub fn backup<R, W>(
        &self,
        old_state: R,
        calls: &dyn CallLogReader,
        subscriptions: &dyn SubscriptionDirectory,
        sink: &mut dyn BackupSink,
        mut new_state: W,
    ) -> Result<BackupSummary, BackupError>
    where
        R: Read,
        W: Write,
    {
        let mut state = StateCodec::read_from(old_state).map_err(|e| {
            error!(target: "calllog::backup", error = %e, "Aborting backup");
            e
        })?;
        let previous_state_version = state.version();
        info!(
            target: "calllog::backup",
            previous_version = previous_state_version,
            known = state.len(),
            "Starting call log backup"
        );

        let migrator = IdentifierMigrator::snapshot(subscriptions);
        let live = read_live_calls(calls);

        let report = Reconciler::new(&self.codec, self.accounting.as_ref(), &self.config.data_type)
            .with_verbose_records(self.config.verbose_records)
            .reconcile(&mut state, live, &migrator, sink);

        let bytes = StateCodec::encode(&state);
        new_state
            .write_all(&bytes)
            .and_then(|()| new_state.flush())
            .map_err(|e| {
                error!(target: "calllog::backup", error = %e, "Failed to save backup state");
                BackupError::StatePersist(e)
            })?;

        let mut failed = report.add_failed;
        failed.extend(report.remove_failed);

        info!(
            target: "calllog::backup",
            added = report.added.len(),
            removed = report.removed.len(),
            retained = report.retained,
            failed = failed.len(),
            migrated = report.migrated,
            "Finished call log backup"
        );

        Ok(BackupSummary {
            added: report.added,
            removed: report.removed,
            retained: report.retained,
            failed,
            previous_state_version,
        })
    }
}
