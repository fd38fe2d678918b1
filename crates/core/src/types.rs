//! Call record and vendor extension types
//!
//! `CallRecord` is the unit of work for both backup and restore. It is built
//! either from the live call log or from a decoded backup entity and is not
//! retained beyond one pass.

use std::fmt;

/// Call type codes as stored by the call log.
pub mod call_types {
    /// Incoming call
    pub const INCOMING: i32 = 1;
    /// Outgoing call
    pub const OUTGOING: i32 = 2;
    /// Missed call
    pub const MISSED: i32 = 3;
    /// Voicemail entry. Never backed up or restored.
    pub const VOICEMAIL: i32 = 4;
    /// Rejected call
    pub const REJECTED: i32 = 5;
    /// Blocked call
    pub const BLOCKED: i32 = 6;
    /// Answered on another device
    pub const ANSWERED_EXTERNALLY: i32 = 7;
}

/// Block reason meaning "not blocked".
pub const BLOCK_REASON_NOT_BLOCKED: i32 = 0;

/// Missed reason meaning "not missed".
pub const MISSED_REASON_NOT_MISSED: i64 = 0;

/// Account component name of the telephony connection service.
///
/// Accounts under this component changed identifier scheme: the backup carries
/// the card identifier, the device uses the subscription identifier.
pub const TELEPHONY_COMPONENT_NAME: &str =
    "com.android.phone/com.android.services.telephony.TelephonyConnectionService";

/// Namespace carried by an absent vendor extension.
pub const NO_VENDOR_NAMESPACE: &str = "no-oem-namespace";

/// One call log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    /// Live-collection identifier; also the backup entity key
    pub id: i32,
    /// Call start (milliseconds since epoch)
    pub date: i64,
    /// Duration in seconds
    pub duration: i64,
    /// Dialed or received number
    pub number: Option<String>,
    /// Digits dialed after the call connected
    pub post_dial_digits: Option<String>,
    /// Number the call was routed through
    pub via_number: Option<String>,
    /// One of [`call_types`]
    pub call_type: i32,
    /// Number presentation code
    pub number_presentation: i32,
    /// Flattened component name of the placing account
    pub account_component_name: Option<String>,
    /// Account identifier within the component
    pub account_id: Option<String>,
    /// Account address
    pub account_address: Option<String>,
    /// Bytes used by the call; 0 when unknown
    pub data_usage: i64,
    /// Feature bitmask
    pub features: i32,
    /// Whether the entry is visible to every user
    pub add_for_all_users: bool,
    /// Block reason code
    pub block_reason: i32,
    /// Label of the screening app that handled the call
    pub screening_app_name: Option<String>,
    /// Component of the screening service that handled the call
    pub screening_component_name: Option<String>,
    /// Missed reason bitmask
    pub missed_reason: i64,
    /// Account id holds the portable card identifier and awaits resolution
    pub migration_pending: bool,
    /// Call was made to or from a business
    pub business_call: bool,
    /// Display name asserted by the network
    pub asserted_display_name: Option<String>,
}

impl CallRecord {
    /// Create a record with every payload field at its default.
    pub fn new(id: i32) -> Self {
        CallRecord {
            id,
            date: 0,
            duration: 0,
            number: None,
            post_dial_digits: Some(String::new()),
            via_number: Some(String::new()),
            call_type: 0,
            number_presentation: 0,
            account_component_name: None,
            account_id: None,
            account_address: None,
            data_usage: 0,
            features: 0,
            add_for_all_users: true,
            block_reason: BLOCK_REASON_NOT_BLOCKED,
            screening_app_name: None,
            screening_component_name: None,
            missed_reason: MISSED_REASON_NOT_MISSED,
            migration_pending: false,
            business_call: false,
            asserted_display_name: Some(String::new()),
        }
    }

    /// Whether this is a voicemail entry.
    pub fn is_voicemail(&self) -> bool {
        self.call_type == call_types::VOICEMAIL
    }

    /// Whether the placing account belongs to the telephony connection service.
    pub fn is_telephony_account(&self) -> bool {
        self.account_component_name.as_deref() == Some(TELEPHONY_COMPONENT_NAME)
    }

    /// Data usage, with the 0 placeholder mapped to `None`.
    pub fn data_usage_or_none(&self) -> Option<i64> {
        match self.data_usage {
            0 => None,
            usage => Some(usage),
        }
    }

    /// Account handle, present only when both component name and id are set.
    pub fn account_handle(&self) -> Option<AccountHandle> {
        match (&self.account_component_name, &self.account_id) {
            (Some(component_name), Some(id)) => Some(AccountHandle {
                component_name: component_name.clone(),
                id: id.clone(),
            }),
            _ => None,
        }
    }

    /// Log-safe rendering of this record.
    ///
    /// Without `verbose` only the id is shown; the number and account are
    /// personal data.
    pub fn summary(&self, verbose: bool) -> RecordSummary<'_> {
        RecordSummary {
            record: self,
            verbose,
        }
    }
}

/// Phone account reference reconstructed on restore.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountHandle {
    /// Flattened component name
    pub component_name: String,
    /// Account identifier
    pub id: String,
}

/// Display adapter returned by [`CallRecord::summary`].
pub struct RecordSummary<'a> {
    record: &'a CallRecord,
    verbose: bool,
}

impl fmt::Display for RecordSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.record;
        if self.verbose {
            write!(
                f,
                "[{}, account: [{} : {}], {}, {}]",
                r.id,
                r.account_component_name.as_deref().unwrap_or("null"),
                r.account_id.as_deref().unwrap_or("null"),
                r.number.as_deref().unwrap_or("null"),
                r.date
            )
        } else {
            write!(f, "[{}]", r.id)
        }
    }
}

/// Opaque namespaced payload attached to a serialized record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorExtension {
    /// Owner of the payload; readers must match it before interpreting bytes
    pub namespace: String,
    /// Raw payload, empty when there is nothing to carry
    pub payload: Vec<u8>,
}

impl VendorExtension {
    /// Create an extension block.
    pub fn new(namespace: impl Into<String>, payload: Vec<u8>) -> Self {
        VendorExtension {
            namespace: namespace.into(),
            payload,
        }
    }

    /// The no-op extension written when no vendor hook is installed.
    pub fn none() -> Self {
        VendorExtension {
            namespace: NO_VENDOR_NAMESPACE.to_string(),
            payload: Vec::new(),
        }
    }

    /// Whether this is the reserved no-op extension.
    pub fn is_none(&self) -> bool {
        self.namespace == NO_VENDOR_NAMESPACE && self.payload.is_empty()
    }
}

impl Default for VendorExtension {
    fn default() -> Self {
        Self::none()
    }
}

/// One entity read back from the backup store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntity {
    /// Entity key (stringified record id for well-formed entities)
    pub key: String,
    /// Encoded record block
    pub payload: Vec<u8>,
}

impl BackupEntity {
    /// Create an entity.
    pub fn new(key: impl Into<String>, payload: Vec<u8>) -> Self {
        BackupEntity {
            key: key.into(),
            payload,
        }
    }
}

/// Entity key used for a record id.
pub fn entity_key(id: i32) -> String {
    id.to_string()
}
