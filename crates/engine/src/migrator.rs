//! Account identifier migration for telephony calls.
//!
//! Telephony accounts are identified on-device by subscription id, but
//! subscription ids are device-specific. Before a telephony call leaves the
//! device its account id is rewritten to the card identifier, which is
//! portable, and the record is flagged as pending migration. The reverse
//! mapping happens after restore, outside this crate, once the destination
//! device has registered the account.

use std::collections::HashMap;

use calllog_core::{CallRecord, SubscriptionDirectory, TELEPHONY_COMPONENT_NAME};
use tracing::{error, info};

/// Whether a record's account id must be rewritten before backup.
///
/// True only for telephony accounts whose id is still in subscription form.
pub fn should_rewrite_for_backup(
    account_component_name: Option<&str>,
    migration_pending: bool,
) -> bool {
    account_component_name == Some(TELEPHONY_COMPONENT_NAME) && !migration_pending
}

/// Result of applying the migrator to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Record does not need rewriting
    NotApplicable,
    /// Account id was replaced with the card identifier
    Rewritten,
    /// Rewrite was needed but no card identifier was found
    LookupMiss,
}

/// Subscription → card identifier rewriting for one backup pass.
#[derive(Debug, Clone, Default)]
pub struct IdentifierMigrator {
    subscriptions: Option<HashMap<i32, String>>,
}

impl IdentifierMigrator {
    /// Migrator over a mapping snapshot; `None` means the service is unavailable.
    pub fn new(subscriptions: Option<HashMap<i32, String>>) -> Self {
        IdentifierMigrator { subscriptions }
    }

    /// Snapshot the directory once for this pass.
    pub fn snapshot(directory: &dyn SubscriptionDirectory) -> Self {
        let subscriptions = directory.snapshot();
        if subscriptions.is_none() {
            error!(target: "calllog::migration", "Subscription database is not available");
        }
        Self::new(subscriptions)
    }

    /// Whether a mapping snapshot is available.
    pub fn is_available(&self) -> bool {
        self.subscriptions.is_some()
    }

    /// Card identifier for the subscription id held in `account_id`.
    fn card_id_for(&self, account_id: Option<&str>) -> Option<&str> {
        let subscriptions = self.subscriptions.as_ref()?;
        let subscription_id: i32 = account_id?.parse().ok()?;
        subscriptions.get(&subscription_id).map(String::as_str)
    }

    /// Rewrite `record` into portable form if it needs it.
    ///
    /// A lookup miss leaves the record untouched.
    pub fn migrate(&self, record: &mut CallRecord) -> MigrationOutcome {
        if !self.is_available()
            || !should_rewrite_for_backup(
                record.account_component_name.as_deref(),
                record.migration_pending,
            )
        {
            return MigrationOutcome::NotApplicable;
        }

        match self.card_id_for(record.account_id.as_deref()) {
            Some(card_id) => {
                info!(target: "calllog::migration", id = record.id, "Rewrote subscription id to card id");
                record.account_id = Some(card_id.to_string());
                record.migration_pending = true;
                MigrationOutcome::Rewritten
            }
            None => {
                info!(target: "calllog::migration", id = record.id, "No card id for subscription");
                MigrationOutcome::LookupMiss
            }
        }
    }
}
