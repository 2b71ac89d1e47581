//! Persistence sink for full-store snapshots, plus the bulk loader that
//! supplies the initial record sequence.

pub mod json;
pub mod memory;

pub use json::{load_table, JsonFileSink, LoadedTable};
pub use memory::MemorySink;

use crate::data::Record;

/// Borrowed view of the whole record store at one point in time
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub columns: &'a [String],
    pub records: &'a [Record],
}

impl<'a> Snapshot<'a> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Receives the full record sequence after every successful update.
///
/// Implementations write the snapshot wholesale; there is no incremental
/// or partial write.
pub trait SnapshotSink: Send + Sync {
    fn persist(&self, snapshot: &Snapshot<'_>) -> Result<(), PersistenceError>;

    /// Metadata of the last snapshot written, if the sink tracks it
    fn latest(&self) -> Option<SnapshotMetadata> {
        None
    }
}

/// Snapshot metadata
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SnapshotMetadata {
    /// Write time (epoch ms)
    pub saved_at: i64,
    pub record_count: usize,
    pub size_bytes: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}
