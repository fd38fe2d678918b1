//! Durability layer for call log backup
//!
//! This crate owns every byte format that leaves the device:
//!
//! - Wire primitives: big-endian integers and modified UTF-8 strings
//! - Reconciliation state: the blob that survives between backup passes
//! - Call record entities: version-gated record payloads
//! - Vendor extension hooks: opaque per-record payload seam

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod extension; // Vendor extension seam
pub mod format; // Binary formats (state blob, record entities)

// === Re-exports ===
pub use extension::{NoVendorExtension, VendorExtensionHooks};
pub use format::{
    is_known_revision, FieldGroup, ReconciliationState, RecordCodec, RecordDecodeError,
    RecordEncodeError, RetiredColumn, SchemaRevision, StateCodec, StateError, UnknownRevision, WireError,
    END_VENDOR_MARKER, GRANDFATHERED_RECORD_VERSION, NO_PREVIOUS_STATE, RECORD_FORMAT_VERSION,
    SCHEMA_REVISIONS, STATE_FORMAT_VERSION,
};
