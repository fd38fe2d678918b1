//! In-memory collaborators for exercising backup and restore passes
//!
//! - **InMemoryBackupStore**: entity map with an ordered operation log and
//!   per-key write failure injection
//! - **StaticCallLog** / **StaticSubscriptions**: fixed live data
//! - **RecordingAccounting**: counts every accounting signal
//! - **CollectingWriter**: keeps restored records in insertion order
//!
//! # Example
//!
//! ```ignore
//! use calllog_engine::testing::{InMemoryBackupStore, StaticCallLog, StaticSubscriptions};
//!
//! let mut store = InMemoryBackupStore::new();
//! let summary = agent.backup(
//!     std::io::empty(),
//!     &StaticCallLog::new(calls),
//!     &StaticSubscriptions::unavailable(),
//!     &mut store,
//!     &mut new_state,
//! )?;
//! let restored = agent.restore(store.entities(), &mut writer);
//! ```

mod collaborators;
mod store;

pub use collaborators::{CollectingWriter, RecordingAccounting, StaticCallLog, StaticSubscriptions};
pub use store::{InMemoryBackupStore, StoreOp};
