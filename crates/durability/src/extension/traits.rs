//! Vendor extension hook trait definitions.

use calllog_core::{CallRecord, VendorExtension, NO_VENDOR_NAMESPACE};

/// Vendor extension hooks.
///
/// Every encoded record carries one extension block. The hooks decide what
/// goes into it on backup and interpret it on restore. This provides a seam
/// for vendors to carry proprietary per-call data without changing the
/// record layout.
///
/// # Namespaces
///
/// The produced block is tagged with a namespace. On restore, `consume` is
/// only called when the block's namespace equals [`namespace`](Self::namespace);
/// blocks written by another vendor's hooks are skipped unread.
///
/// # Versioning
///
/// The payload is opaque to the record codec. Hooks that need to evolve their
/// payload should version and size-prefix it themselves.
pub trait VendorExtensionHooks: Send + Sync {
    /// Namespace these hooks write and accept.
    fn namespace(&self) -> &str;

    /// Produce the extension block for a record being backed up.
    fn produce(&self, record: &CallRecord) -> VendorExtension;

    /// Apply an extension block whose namespace matched to a restored record.
    fn consume(&self, record: &mut CallRecord, extension: &VendorExtension);
}

/// Hooks that carry nothing.
///
/// Writes the reserved no-op namespace with an empty payload and ignores
/// every block on restore.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoVendorExtension;

impl VendorExtensionHooks for NoVendorExtension {
    fn namespace(&self) -> &str {
        NO_VENDOR_NAMESPACE
    }

    fn produce(&self, _record: &CallRecord) -> VendorExtension {
        VendorExtension::none()
    }

    fn consume(&self, _record: &mut CallRecord, _extension: &VendorExtension) {}
}
