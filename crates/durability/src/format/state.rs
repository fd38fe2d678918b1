//! Reconciliation state format.
//!
//! The state blob is the only data that survives between backup passes. It
//! records which record ids the backup store currently holds.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────┬──────────────┬────────────────────────────┐
//! │ Version (4)  │ Count (4)    │ Id (4) × Count, ascending  │
//! └──────────────┴──────────────┴────────────────────────────┘
//! ```
//!
//! All integers are big-endian. Count and ids are present only when
//! version ≥ 1.

use std::collections::BTreeSet;
use std::io::{self, Read, Write};

use tracing::{debug, warn};

use super::wire::{DataReader, DataWriter, WireError};

/// Version written by [`StateCodec::encode`].
pub const STATE_FORMAT_VERSION: i32 = 1010;

/// Version reported when there is no previous state.
pub const NO_PREVIOUS_STATE: i32 = 0;

/// Ids the backup store is known to hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationState {
    version: i32,
    ids: BTreeSet<i32>,
}

impl ReconciliationState {
    /// Empty state for a first backup.
    pub fn new() -> Self {
        ReconciliationState {
            version: NO_PREVIOUS_STATE,
            ids: BTreeSet::new(),
        }
    }

    /// State with the given version and ids.
    pub fn with_ids(version: i32, ids: impl IntoIterator<Item = i32>) -> Self {
        ReconciliationState {
            version,
            ids: ids.into_iter().collect(),
        }
    }

    /// Format version the state was loaded from.
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Whether this state came from a previous pass.
    pub fn has_previous(&self) -> bool {
        self.version != NO_PREVIOUS_STATE
    }

    /// Known ids in ascending order.
    pub fn ids(&self) -> &BTreeSet<i32> {
        &self.ids
    }

    /// Whether the backup holds `id`.
    pub fn contains(&self, id: i32) -> bool {
        self.ids.contains(&id)
    }

    /// Record that the backup now holds `id`.
    pub fn insert(&mut self, id: i32) -> bool {
        self.ids.insert(id)
    }

    /// Record that the backup no longer holds `id`.
    pub fn remove(&mut self, id: i32) -> bool {
        self.ids.remove(&id)
    }

    /// Number of known ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no ids are known.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for ReconciliationState {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that make a state blob unusable.
///
/// A missing or short version field is not an error; it decodes to an empty
/// state. Anything wrong after the version is fatal for the pass.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// Stream ended after the version field
    #[error("State truncated: expected {expected:?} ids, read {read}")]
    Truncated {
        /// Ids announced by the count field (`None` if the count itself was cut)
        expected: Option<i32>,
        /// Ids read before the stream ended
        read: usize,
    },

    /// Count field is negative
    #[error("State has negative id count {0}")]
    NegativeCount(i32),

    /// Reader failed for a reason other than end of stream
    #[error("I/O error reading state: {0}")]
    Io(#[from] io::Error),
}

/// Codec for [`ReconciliationState`].
pub struct StateCodec;

impl StateCodec {
    /// Decode a state blob held in memory.
    pub fn decode(bytes: &[u8]) -> Result<ReconciliationState, StateError> {
        Self::read_from(bytes)
    }

    /// Decode a state blob from a reader.
    pub fn read_from<R: Read>(reader: R) -> Result<ReconciliationState, StateError> {
        let mut input = DataReader::new(reader);

        let version = match input.read_i32() {
            Ok(v) => v,
            Err(WireError::UnexpectedEof) => {
                debug!(target: "calllog::state", "No previous state");
                return Ok(ReconciliationState::new());
            }
            Err(e) => return Err(into_state_error(e, None, 0)),
        };

        let mut state = ReconciliationState {
            version,
            ids: BTreeSet::new(),
        };
        if version < 1 {
            return Ok(state);
        }

        let count = input
            .read_i32()
            .map_err(|e| into_state_error(e, None, 0))?;
        if count < 0 {
            return Err(StateError::NegativeCount(count));
        }

        for read in 0..count as usize {
            let id = input
                .read_i32()
                .map_err(|e| into_state_error(e, Some(count), read))?;
            state.ids.insert(id);
        }

        if state.ids.len() != count as usize {
            warn!(
                target: "calllog::state",
                count,
                unique = state.ids.len(),
                "State contained duplicate ids"
            );
        }

        Ok(state)
    }

    /// Encode a state blob.
    ///
    /// Always writes [`STATE_FORMAT_VERSION`], whatever version the state was
    /// loaded from.
    pub fn encode(state: &ReconciliationState) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + 4 * state.ids.len());
        // Writes into a Vec cannot fail.
        let _ = Self::write_to(&mut bytes, state);
        bytes
    }

    /// Encode a state blob into a writer.
    pub fn write_to<W: Write>(writer: W, state: &ReconciliationState) -> io::Result<()> {
        let mut out = DataWriter::new(writer);
        out.write_i32(STATE_FORMAT_VERSION).map_err(into_io)?;
        out.write_i32(state.ids.len() as i32).map_err(into_io)?;
        for &id in &state.ids {
            out.write_i32(id).map_err(into_io)?;
        }
        out.flush().map_err(into_io)
    }
}

fn into_state_error(e: WireError, expected: Option<i32>, read: usize) -> StateError {
    match e {
        WireError::Io(io) => StateError::Io(io),
        _ => StateError::Truncated { expected, read },
    }
}

fn into_io(e: WireError) -> io::Error {
    match e {
        WireError::Io(io) => io,
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}
