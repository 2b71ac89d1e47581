use super::{PersistenceError, Snapshot, SnapshotMetadata, SnapshotSink};
use crate::data::Record;
use parking_lot::Mutex;

/// Keeps every snapshot in memory, newest last
#[derive(Debug, Default)]
pub struct MemorySink {
    snapshots: Mutex<Vec<(SnapshotMetadata, Vec<Record>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.lock().len()
    }

    pub fn last_snapshot(&self) -> Option<Vec<Record>> {
        self.snapshots.lock().last().map(|(_, records)| records.clone())
    }
}

impl SnapshotSink for MemorySink {
    fn persist(&self, snapshot: &Snapshot<'_>) -> Result<(), PersistenceError> {
        let metadata = SnapshotMetadata {
            saved_at: chrono::Utc::now().timestamp_millis(),
            record_count: snapshot.len(),
            size_bytes: 0,
        };
        self.snapshots.lock().push((metadata, snapshot.records.to_vec()));
        Ok(())
    }

    fn latest(&self) -> Option<SnapshotMetadata> {
        self.snapshots.lock().last().map(|(metadata, _)| metadata.clone())
    }
}
