//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::sync::{Arc, Once};

pub use calllog_backup::testing::{
    CollectingWriter, InMemoryBackupStore, RecordingAccounting, StaticCallLog,
    StaticSubscriptions, StoreOp,
};
pub use calllog_backup::{
    call_types, BackupAgent, BackupConfig, BackupEntity, BackupError, BackupSummary, CallRecord,
    FailureReason, RecordCodec, RestoreSummary, StateCodec, TELEPHONY_COMPONENT_NAME,
};

// ============================================================================
// Initialization
// ============================================================================

static INIT_LOGGING: Once = Once::new();

/// Install a fmt subscriber once per test binary when `RUST_LOG` is set.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_test_writer()
                .try_init();
        }
    });
}

// ============================================================================
// Records
// ============================================================================

/// Outgoing call with deterministic field values.
pub fn call(id: i32) -> CallRecord {
    let mut r = CallRecord::new(id);
    r.date = 1_700_000_000_000 + i64::from(id) * 60_000;
    r.duration = i64::from(id % 300);
    r.number = Some(format!("+1555{:07}", id));
    r.call_type = call_types::OUTGOING;
    r.number_presentation = 1;
    r.account_component_name = Some("com.example.voip/.CallService".to_string());
    r.account_id = Some(format!("acct-{}", id % 3));
    r
}

/// Voicemail entry.
pub fn voicemail(id: i32) -> CallRecord {
    let mut r = call(id);
    r.call_type = call_types::VOICEMAIL;
    r
}

/// Telephony call whose account id is still a subscription id.
pub fn telephony_call(id: i32, subscription_id: i32) -> CallRecord {
    let mut r = call(id);
    r.account_component_name = Some(TELEPHONY_COMPONENT_NAME.to_string());
    r.account_id = Some(subscription_id.to_string());
    r
}

pub fn calls(ids: impl IntoIterator<Item = i32>) -> Vec<CallRecord> {
    ids.into_iter().map(call).collect()
}

/// Byte offset of the end-of-extension marker in an encoded record.
pub fn marker_offset(payload: &[u8]) -> Option<usize> {
    payload
        .windows(4)
        .position(|w| w == calllog_backup::END_VENDOR_MARKER.to_be_bytes())
}

// ============================================================================
// Device harness
// ============================================================================

/// One device's backup world: call log, subscriptions, store and saved state.
pub struct Device {
    pub agent: BackupAgent,
    pub accounting: Arc<RecordingAccounting>,
    pub call_log: StaticCallLog,
    pub subscriptions: StaticSubscriptions,
    pub store: InMemoryBackupStore,
    pub state: Vec<u8>,
}

impl Device {
    pub fn new() -> Self {
        Self::with_config(BackupConfig::default())
    }

    pub fn with_config(config: BackupConfig) -> Self {
        init_test_logging();
        let accounting = Arc::new(RecordingAccounting::new());
        let agent = BackupAgent::new(config)
            .unwrap()
            .with_accounting(accounting.clone());
        Device {
            agent,
            accounting,
            call_log: StaticCallLog::default(),
            subscriptions: StaticSubscriptions::unavailable(),
            store: InMemoryBackupStore::new(),
            state: Vec::new(),
        }
    }

    /// Run a backup pass; on success the new state replaces the saved one.
    pub fn backup(&mut self) -> Result<BackupSummary, BackupError> {
        let mut new_state = Vec::new();
        let summary = self.agent.backup(
            &self.state[..],
            &self.call_log,
            &self.subscriptions,
            &mut self.store,
            &mut new_state,
        )?;
        self.state = new_state;
        Ok(summary)
    }

    /// Ids recorded in the saved state.
    pub fn known_ids(&self) -> Vec<i32> {
        StateCodec::decode(&self.state)
            .unwrap()
            .ids()
            .iter()
            .copied()
            .collect()
    }

    /// Restore the store's contents with this device's agent.
    pub fn restore_into(&self, agent: &BackupAgent) -> (RestoreSummary, Vec<CallRecord>) {
        let mut writer = CollectingWriter::new();
        let summary = agent.restore(self.store.entities(), &mut writer);
        (summary, writer.into_records())
    }
}
