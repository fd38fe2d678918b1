//! Backup agent: the backup and restore entry points
//!
//! The agent owns one pass's worth of configuration: the record codec (with
//! any vendor extension hooks), the accounting sink, and the logging mode.
//! Platform collaborators are passed to each call.
//!
//! ## Backup pass
//!
//! 1. Decode the previous reconciliation state (fatal on corruption)
//! 2. Snapshot the subscription directory
//! 3. Read the live call log, dropping voicemail
//! 4. Reconcile against the backup store
//! 5. Encode and persist the new state
//!
//! ## Restore pass
//!
//! Each entity is decoded independently; a bad entity is counted and skipped.

mod backup;
mod restore;

pub use backup::{read_live_calls, BackupError, BackupSummary};
pub use restore::RestoreSummary;

use std::sync::Arc;

use calllog_core::{AccountingSink, NoopAccounting};
use calllog_durability::{RecordCodec, VendorExtensionHooks};

use crate::config::{BackupConfig, ConfigError};

/// Call log backup agent.
#[derive(Clone)]
pub struct BackupAgent {
    config: BackupConfig,
    codec: RecordCodec,
    accounting: Arc<dyn AccountingSink>,
}

impl std::fmt::Debug for BackupAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupAgent")
            .field("config", &self.config)
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl BackupAgent {
    /// Build an agent from validated configuration.
    pub fn new(config: BackupConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let codec = config.record_codec()?;
        Ok(BackupAgent {
            config,
            codec,
            accounting: Arc::new(NoopAccounting),
        })
    }

    /// Report per-item outcomes to `accounting`.
    pub fn with_accounting(mut self, accounting: Arc<dyn AccountingSink>) -> Self {
        self.accounting = accounting;
        self
    }

    /// Attach vendor extension hooks to the record codec.
    pub fn with_vendor_hooks(mut self, hooks: Arc<dyn VendorExtensionHooks>) -> Self {
        self.codec = self.codec.with_hooks(hooks);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &BackupConfig {
        &self.config
    }

    /// Record codec used for both directions.
    pub fn codec(&self) -> &RecordCodec {
        &self.codec
    }
}

impl Default for BackupAgent {
    fn default() -> Self {
        BackupAgent {
            config: BackupConfig::default(),
            codec: RecordCodec::new(),
            accounting: Arc::new(NoopAccounting),
        }
    }
}
