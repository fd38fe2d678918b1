//! On-disk and on-wire byte formats.
//!
//! This module centralizes all serialization logic for backup data. Keeping
//! serialization separate from the reconciliation logic makes format
//! evolution easier to manage.
//!
//! # Module Structure
//!
//! - `wire`: big-endian primitives and modified UTF-8 strings
//! - `state`: reconciliation state blob
//! - `record`: call record entity payload and its schema revisions

pub mod record;
pub mod state;
pub mod wire;

pub use record::{
    is_known_revision, FieldGroup, RecordCodec, RecordDecodeError, RecordEncodeError,
    RetiredColumn, SchemaRevision, UnknownRevision, END_VENDOR_MARKER, GRANDFATHERED_RECORD_VERSION,
    RECORD_FORMAT_VERSION, SCHEMA_REVISIONS,
};
pub use state::{
    ReconciliationState, StateCodec, StateError, NO_PREVIOUS_STATE, STATE_FORMAT_VERSION,
};
pub use wire::{DataReader, DataWriter, WireError, MAX_UTF_LEN};
