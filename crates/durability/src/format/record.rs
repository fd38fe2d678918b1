//! Call record entity format.
//!
//! Each backed up call is one entity whose payload is a self-describing block
//! tagged with the schema revision it was written at. Fields were appended
//! over time; a reader applies exactly the field groups introduced up to the
//! block's revision, in the order they were introduced.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────┬────────────────────────────────────────────────────────┐
//! │ Version (4)  │ Field groups of every revision ≤ version, in order     │
//! └──────────────┴────────────────────────────────────────────────────────┘
//!
//! Revision 1002 (vendor extension):
//! ┌────────────────┬────────────┬─────────────────┬──────────────────────┐
//! │ Namespace (utf)│ Length (4) │ Payload (bytes) │ Marker (4) 0x60061E  │
//! └────────────────┴────────────┴─────────────────┴──────────────────────┘
//! ```
//!
//! Integers are big-endian; strings use the encodings in [`super::wire`].

use std::fmt;
use std::sync::Arc;

use calllog_core::{CallRecord, FailureReason, VendorExtension};

use super::wire::{DataReader, DataWriter, WireError};
use crate::extension::{self, NoVendorExtension, VendorExtensionHooks};

/// Revision written by an unpinned codec.
pub const RECORD_FORMAT_VERSION: i32 = 1010;

/// Newer-than-supported revision that is still accepted on restore.
///
/// Revision 1010 only added columns a reader can safely leave at their
/// defaults, so blocks carrying it are restored even by codecs that predate it.
pub const GRANDFATHERED_RECORD_VERSION: i32 = 1010;

/// Guard written after the vendor extension payload.
pub const END_VENDOR_MARKER: i32 = 0x60061E;

/// Wire shape of a column that is still framed but no longer populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetiredColumn {
    /// Optional string, written as a present empty string
    OptString,
    /// Optional int, written as absent
    OptInt,
}

const RETIRED_CALLER_ID_COLUMNS: &[RetiredColumn] = &[
    RetiredColumn::OptString,
    RetiredColumn::OptString,
    RetiredColumn::OptString,
    RetiredColumn::OptString,
    RetiredColumn::OptString,
    RetiredColumn::OptInt,
];

/// Fields appended by one schema revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    /// date, duration, number, type, presentation, account triple, data usage, features
    Base,
    /// vendor namespace, payload, guard marker
    VendorExtension,
    /// add-for-all-users flag
    AddForAllUsers,
    /// post-dial digits
    PostDialDigits,
    /// via number
    ViaNumber,
    /// block reason, screening app name, screening component name
    CallScreening,
    /// five strings and one optional int that are no longer populated
    RetiredCallerId,
    /// missed reason
    MissedReason,
    /// account migration pending flag
    MigrationPending,
    /// business call flag, asserted display name
    BusinessCall,
}

impl FieldGroup {
    /// Columns framed by this group once it is retired.
    pub fn retired_columns(self) -> &'static [RetiredColumn] {
        match self {
            FieldGroup::RetiredCallerId => RETIRED_CALLER_ID_COLUMNS,
            _ => &[],
        }
    }
}

/// One step in the record schema history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaRevision {
    /// Version number written into blocks of this revision
    pub version: i32,
    /// Fields this revision appended
    pub fields: FieldGroup,
    /// Fields are still framed in the stream but carry no data: encode
    /// writes [`FieldGroup::retired_columns`] blank, decode reads and drops them
    pub retired: bool,
}

const fn revision(version: i32, fields: FieldGroup) -> SchemaRevision {
    SchemaRevision {
        version,
        fields,
        retired: false,
    }
}

/// Every revision in the order its fields appear on the wire.
pub const SCHEMA_REVISIONS: &[SchemaRevision] = &[
    revision(1, FieldGroup::Base),
    revision(1002, FieldGroup::VendorExtension),
    revision(1003, FieldGroup::AddForAllUsers),
    revision(1004, FieldGroup::PostDialDigits),
    revision(1005, FieldGroup::ViaNumber),
    revision(1006, FieldGroup::CallScreening),
    SchemaRevision {
        version: 1007,
        fields: FieldGroup::RetiredCallerId,
        retired: true,
    },
    revision(1008, FieldGroup::MissedReason),
    revision(1009, FieldGroup::MigrationPending),
    revision(1010, FieldGroup::BusinessCall),
];

/// Whether `version` names a revision in [`SCHEMA_REVISIONS`].
pub fn is_known_revision(version: i32) -> bool {
    SCHEMA_REVISIONS.iter().any(|r| r.version == version)
}

fn revisions_through(version: i32) -> impl Iterator<Item = &'static SchemaRevision> {
    SCHEMA_REVISIONS
        .iter()
        .take_while(move |r| r.version <= version)
}

/// Errors that discard one record on restore.
#[derive(Debug, thiserror::Error)]
pub enum RecordDecodeError {
    /// Block was written by a newer format this codec does not know
    #[error("Backup version {version} is newer than the current supported version, {supported}")]
    UnsupportedVersion {
        /// Version found in the block
        version: i32,
        /// Highest version this codec reads
        supported: i32,
    },

    /// Guard after the vendor payload was wrong; the payload length is not trustworthy
    #[error("Did not find end-of-extension marker (found {found:#x})")]
    VendorMarkerMismatch {
        /// Value read where the marker should be
        found: i32,
    },

    /// Block is malformed
    #[error("Malformed record: {0}")]
    Wire(#[from] WireError),
}

impl RecordDecodeError {
    /// Accounting reason for this failure.
    pub fn reason(&self) -> FailureReason {
        match self {
            RecordDecodeError::UnsupportedVersion { .. } => FailureReason::UnsupportedVersion,
            RecordDecodeError::VendorMarkerMismatch { .. } => FailureReason::EndMarkerNotFound,
            RecordDecodeError::Wire(_) => FailureReason::ReadingCallData,
        }
    }
}

/// A record could not be encoded.
#[derive(Debug, thiserror::Error)]
#[error("Failed to encode record {id}: {source}")]
pub struct RecordEncodeError {
    /// Id of the record
    pub id: i32,
    /// Field-level failure
    #[source]
    pub source: WireError,
}

/// Requested pin is not a known revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Unknown record schema revision {0}")]
pub struct UnknownRevision(pub i32);

/// Codec for call record entity payloads.
#[derive(Clone)]
pub struct RecordCodec {
    version: i32,
    hooks: Arc<dyn VendorExtensionHooks>,
}

impl fmt::Debug for RecordCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordCodec")
            .field("version", &self.version)
            .field("namespace", &self.hooks.namespace())
            .finish()
    }
}

impl Default for RecordCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordCodec {
    /// Codec at [`RECORD_FORMAT_VERSION`] with no vendor extension.
    pub fn new() -> Self {
        RecordCodec {
            version: RECORD_FORMAT_VERSION,
            hooks: Arc::new(NoVendorExtension),
        }
    }

    /// Codec pinned to an older revision.
    ///
    /// Writes `version` and only the fields introduced up to it; reads fields
    /// only up to it, leaving newer fields at their defaults.
    pub fn pinned(version: i32) -> Result<Self, UnknownRevision> {
        if !is_known_revision(version) {
            return Err(UnknownRevision(version));
        }
        Ok(RecordCodec {
            version,
            ..Self::new()
        })
    }

    /// Replace the vendor extension hooks.
    pub fn with_hooks(mut self, hooks: Arc<dyn VendorExtensionHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Revision this codec writes.
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Whether a block of `version` may be decoded.
    ///
    /// Newer blocks are rejected rather than guessed at, except for the
    /// grandfathered revision.
    pub fn accepts_version(&self, version: i32) -> bool {
        version <= self.version || version == GRANDFATHERED_RECORD_VERSION
    }

    /// Encode a record.
    pub fn encode(&self, record: &CallRecord) -> Result<Vec<u8>, RecordEncodeError> {
        self.encode_inner(record).map_err(|source| RecordEncodeError {
            id: record.id,
            source,
        })
    }

    fn encode_inner(&self, record: &CallRecord) -> Result<Vec<u8>, WireError> {
        let mut out = DataWriter::new(Vec::with_capacity(256));
        out.write_i32(self.version)?;
        for rev in revisions_through(self.version) {
            if rev.retired {
                write_blank_columns(rev.fields.retired_columns(), &mut out)?;
            } else {
                self.encode_fields(rev.fields, &mut out, record)?;
            }
        }
        Ok(out.into_inner())
    }

    fn encode_fields(
        &self,
        fields: FieldGroup,
        out: &mut DataWriter<Vec<u8>>,
        r: &CallRecord,
    ) -> Result<(), WireError> {
        match fields {
            FieldGroup::Base => {
                out.write_i64(r.date)?;
                out.write_i64(r.duration)?;
                out.write_opt_string(r.number.as_deref())?;
                out.write_i32(r.call_type)?;
                out.write_i32(r.number_presentation)?;
                out.write_opt_string(r.account_component_name.as_deref())?;
                out.write_opt_string(r.account_id.as_deref())?;
                out.write_opt_string(r.account_address.as_deref())?;
                out.write_i64(r.data_usage)?;
                out.write_i32(r.features)?;
            }
            FieldGroup::VendorExtension => {
                let ext = self.hooks.produce(r);
                out.write_utf(&ext.namespace)?;
                out.write_len_prefixed(&ext.payload)?;
                out.write_i32(END_VENDOR_MARKER)?;
            }
            FieldGroup::AddForAllUsers => out.write_i32(r.add_for_all_users as i32)?,
            FieldGroup::PostDialDigits => out.write_opt_string(r.post_dial_digits.as_deref())?,
            FieldGroup::ViaNumber => out.write_opt_string(r.via_number.as_deref())?,
            FieldGroup::CallScreening => {
                out.write_i32(r.block_reason)?;
                out.write_opt_string(r.screening_app_name.as_deref())?;
                out.write_opt_string(r.screening_component_name.as_deref())?;
            }
            // No live columns.
            FieldGroup::RetiredCallerId => {}
            FieldGroup::MissedReason => out.write_i64(r.missed_reason)?,
            FieldGroup::MigrationPending => out.write_i32(r.migration_pending as i32)?,
            FieldGroup::BusinessCall => {
                out.write_i32(r.business_call as i32)?;
                out.write_opt_string(r.asserted_display_name.as_deref())?;
            }
        }
        Ok(())
    }

    /// Decode the block stored under entity `id`.
    pub fn decode(&self, id: i32, bytes: &[u8]) -> Result<CallRecord, RecordDecodeError> {
        let mut input = DataReader::new(bytes);
        let version = input.read_i32()?;

        if !self.accepts_version(version) {
            return Err(RecordDecodeError::UnsupportedVersion {
                version,
                supported: self.version,
            });
        }

        let mut record = CallRecord::new(id);
        for rev in revisions_through(version.min(self.version)) {
            if rev.retired {
                skip_columns(rev.fields.retired_columns(), &mut input)?;
            } else {
                self.decode_fields(rev.fields, &mut input, &mut record)?;
            }
        }

        // Telephony accounts always need their identifier resolved on the
        // destination device.
        if record.is_telephony_account() {
            record.migration_pending = true;
        }

        Ok(record)
    }

    fn decode_fields(
        &self,
        fields: FieldGroup,
        input: &mut DataReader<&[u8]>,
        r: &mut CallRecord,
    ) -> Result<(), RecordDecodeError> {
        match fields {
            FieldGroup::Base => {
                r.date = input.read_i64()?;
                r.duration = input.read_i64()?;
                r.number = input.read_opt_string()?;
                r.call_type = input.read_i32()?;
                r.number_presentation = input.read_i32()?;
                r.account_component_name = input.read_opt_string()?;
                r.account_id = input.read_opt_string()?;
                r.account_address = input.read_opt_string()?;
                r.data_usage = input.read_i64()?;
                r.features = input.read_i32()?;
            }
            FieldGroup::VendorExtension => {
                let namespace = input.read_utf()?;
                let payload = input.read_len_prefixed()?;
                let marker = input.read_i32()?;
                if marker != END_VENDOR_MARKER {
                    return Err(RecordDecodeError::VendorMarkerMismatch { found: marker });
                }
                extension::dispatch(
                    self.hooks.as_ref(),
                    r,
                    &VendorExtension::new(namespace, payload),
                );
            }
            FieldGroup::AddForAllUsers => r.add_for_all_users = input.read_i32()? == 1,
            FieldGroup::PostDialDigits => r.post_dial_digits = input.read_opt_string()?,
            FieldGroup::ViaNumber => r.via_number = input.read_opt_string()?,
            FieldGroup::CallScreening => {
                r.block_reason = input.read_i32()?;
                r.screening_app_name = input.read_opt_string()?;
                r.screening_component_name = input.read_opt_string()?;
            }
            FieldGroup::RetiredCallerId => {}
            FieldGroup::MissedReason => r.missed_reason = input.read_i64()?,
            FieldGroup::MigrationPending => r.migration_pending = input.read_i32()? != 0,
            FieldGroup::BusinessCall => {
                r.business_call = input.read_i32()? != 0;
                r.asserted_display_name = input.read_opt_string()?;
            }
        }
        Ok(())
    }
}

fn write_blank_columns(
    columns: &[RetiredColumn],
    out: &mut DataWriter<Vec<u8>>,
) -> Result<(), WireError> {
    for column in columns {
        match column {
            RetiredColumn::OptString => out.write_opt_string(Some(""))?,
            RetiredColumn::OptInt => out.write_opt_i32(None)?,
        }
    }
    Ok(())
}

fn skip_columns(
    columns: &[RetiredColumn],
    input: &mut DataReader<&[u8]>,
) -> Result<(), WireError> {
    for column in columns {
        match column {
            RetiredColumn::OptString => {
                input.read_opt_string()?;
            }
            RetiredColumn::OptInt => {
                input.read_opt_i32()?;
            }
        }
    }
    Ok(())
}
