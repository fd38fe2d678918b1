//! In-memory backup entity store

use std::collections::{BTreeMap, HashSet};
use std::io;

use calllog_core::{BackupEntity, BackupSink, BackupStoreError};

/// One applied store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// Entity written under key
    Write(String),
    /// Deletion marker written for key
    Delete(String),
}

/// Backup store held in memory.
///
/// Only operations that succeeded appear in [`ops`](Self::ops).
#[derive(Debug, Default)]
pub struct InMemoryBackupStore {
    entities: BTreeMap<String, Vec<u8>>,
    ops: Vec<StoreOp>,
    failing: HashSet<String>,
}

impl InMemoryBackupStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write and deletion for `key` fail.
    pub fn fail_writes_for(&mut self, key: impl Into<String>) {
        self.failing.insert(key.into());
    }

    /// Stop failing writes for `key`.
    pub fn heal(&mut self, key: &str) {
        self.failing.remove(key);
    }

    /// Stored payload for `key`.
    pub fn entity(&self, key: &str) -> Option<&[u8]> {
        self.entities.get(key).map(Vec::as_slice)
    }

    /// Stored keys, in key order.
    pub fn keys(&self) -> Vec<&str> {
        self.entities.keys().map(String::as_str).collect()
    }

    /// Snapshot of the store as a restore stream, in key order.
    pub fn entities(&self) -> Vec<BackupEntity> {
        self.entities
            .iter()
            .map(|(key, payload)| BackupEntity::new(key.clone(), payload.clone()))
            .collect()
    }

    /// Number of stored entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the store holds no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Applied operations, oldest first.
    pub fn ops(&self) -> &[StoreOp] {
        &self.ops
    }

    /// Forget the operation log, keeping the entities.
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    fn check(&self, key: &str) -> Result<(), BackupStoreError> {
        if self.failing.contains(key) {
            return Err(BackupStoreError::Io {
                key: key.to_string(),
                source: io::Error::new(io::ErrorKind::Other, "injected write failure"),
            });
        }
        Ok(())
    }
}

impl BackupSink for InMemoryBackupStore {
    fn write_entity(&mut self, key: &str, payload: &[u8]) -> Result<(), BackupStoreError> {
        self.check(key)?;
        self.entities.insert(key.to_string(), payload.to_vec());
        self.ops.push(StoreOp::Write(key.to_string()));
        Ok(())
    }

    fn delete_entity(&mut self, key: &str) -> Result<(), BackupStoreError> {
        self.check(key)?;
        self.entities.remove(key);
        self.ops.push(StoreOp::Delete(key.to_string()));
        Ok(())
    }
}
