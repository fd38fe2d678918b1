//! Restore pass

use calllog_core::{BackupEntity, CallLogWriter, CallRecord, FailureReason};
use calllog_durability::RecordDecodeError;
use tracing::{debug, error, info, warn};

use super::BackupAgent;

/// Outcome of a restore pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Records inserted into the call log
    pub restored: usize,
    /// Entities discarded, with the reason reported for each
    pub failed: Vec<(String, FailureReason)>,
    /// Voicemail records dropped without insertion
    pub skipped_voicemail: usize,
}

enum EntityOutcome {
    Restore(CallRecord),
    SkipVoicemail,
}

impl BackupAgent {
    /// Restore every entity of a backup stream into the call log.
    ///
    /// Entities are independent: a malformed entity is reported to
    /// accounting and skipped, and the stream continues.
    pub fn restore<I>(&self, entities: I, writer: &mut dyn CallLogWriter) -> RestoreSummary
    where
        I: IntoIterator<Item = BackupEntity>,
    {
        let data_type = self.config.data_type.as_str();
        let mut summary = RestoreSummary::default();
        info!(target: "calllog::restore", "Starting call log restore");

        for entity in entities {
            match self.restore_entity(&entity) {
                Ok(EntityOutcome::Restore(record)) => {
                    debug!(
                        target: "calllog::restore",
                        call = %record.summary(self.config.verbose_records),
                        "Restoring call"
                    );
                    writer.insert(record);
                    self.accounting.items_restored(data_type, 1);
                    summary.restored += 1;
                }
                Ok(EntityOutcome::SkipVoicemail) => {
                    summary.skipped_voicemail += 1;
                }
                Err(reason) => {
                    self.accounting.items_restore_failed(data_type, 1, reason);
                    summary.failed.push((entity.key, reason));
                }
            }
        }

        info!(
            target: "calllog::restore",
            restored = summary.restored,
            failed = summary.failed.len(),
            skipped_voicemail = summary.skipped_voicemail,
            "Finished call log restore"
        );
        summary
    }

    fn restore_entity(&self, entity: &BackupEntity) -> Result<EntityOutcome, FailureReason> {
        let id: i32 = entity.key.parse().map_err(|_| {
            error!(target: "calllog::restore", key = %entity.key, "Unexpected key found in restore");
            FailureReason::UnexpectedKey
        })?;

        let record = self.codec.decode(id, &entity.payload).map_err(|e| {
            match &e {
                RecordDecodeError::UnsupportedVersion { .. } => {
                    warn!(target: "calllog::restore", id, error = %e, "Skipping call from newer backup");
                }
                _ => {
                    error!(target: "calllog::restore", id, error = %e, "Failed to read call data");
                }
            }
            e.reason()
        })?;

        if record.is_voicemail() {
            return Ok(EntityOutcome::SkipVoicemail);
        }
        Ok(EntityOutcome::Restore(record))
    }
}
