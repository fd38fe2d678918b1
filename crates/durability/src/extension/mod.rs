//! Vendor extension abstraction.
//!
//! The extension seam lets a vendor attach proprietary bytes to every backed
//! up record and read them back on restore. The default is
//! [`NoVendorExtension`], which writes the reserved no-op namespace.
//!
//! # Usage
//!
//! ```ignore
//! use calllog_durability::extension::{VendorExtensionHooks, NoVendorExtension};
//!
//! let hooks = NoVendorExtension;
//! let ext = hooks.produce(&record);
//! assert!(ext.is_none());
//! ```

mod traits;

pub use traits::{NoVendorExtension, VendorExtensionHooks};

use calllog_core::{CallRecord, VendorExtension};
use tracing::debug;

/// Hand a decoded extension block to the hooks if its namespace matches.
///
/// Returns whether the hooks consumed the block.
pub fn dispatch(
    hooks: &dyn VendorExtensionHooks,
    record: &mut CallRecord,
    extension: &VendorExtension,
) -> bool {
    if extension.namespace != hooks.namespace() {
        debug!(
            target: "calllog::restore",
            id = record.id,
            namespace = %extension.namespace,
            len = extension.payload.len(),
            "Skipping extension from foreign namespace"
        );
        return false;
    }
    hooks.consume(record, extension);
    true
}
