//! JSON file sink and loader.
//!
//! Snapshots are written as `{"saved_at", "columns", "records"}`. The
//! loader accepts that envelope or a bare array of row objects, so a
//! plain export of the inventory sheet can seed the store.

use super::{PersistenceError, Snapshot, SnapshotMetadata, SnapshotSink};
use crate::data::record::record_from_json;
use crate::data::Record;
use parking_lot::RwLock;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Serialize)]
struct SnapshotFile<'a> {
    saved_at: i64,
    columns: &'a [String],
    records: &'a [Record],
}

/// Ordered records read from a bulk source
#[derive(Debug, Clone, Default)]
pub struct LoadedTable {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

/// Writes every snapshot over a single JSON file
pub struct JsonFileSink {
    path: PathBuf,
    latest: RwLock<Option<SnapshotMetadata>>,
}

impl JsonFileSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            latest: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl SnapshotSink for JsonFileSink {
    fn persist(&self, snapshot: &Snapshot<'_>) -> Result<(), PersistenceError> {
        let saved_at = chrono::Utc::now().timestamp_millis();
        let data = serde_json::to_vec_pretty(&SnapshotFile {
            saved_at,
            columns: snapshot.columns,
            records: snapshot.records,
        })
        .map_err(|e| PersistenceError::Serialization(e.to_string()))?;

        // Write beside the target and rename so readers never see a torn file.
        // The temp file is removed on drop if any step fails.
        let mut temp = NamedTempFile::new_in(self.parent_dir())?;
        temp.write_all(&data)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| PersistenceError::Io(e.error))?;

        tracing::debug!(
            "Persisted {} records ({} bytes) to {}",
            snapshot.len(),
            data.len(),
            self.path.display()
        );

        *self.latest.write() = Some(SnapshotMetadata {
            saved_at,
            record_count: snapshot.len(),
            size_bytes: data.len(),
        });

        Ok(())
    }

    fn latest(&self) -> Option<SnapshotMetadata> {
        self.latest.read().clone()
    }
}

/// Read the initial record sequence from a JSON file
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<LoadedTable, PersistenceError> {
    let data = std::fs::read(path.as_ref())?;
    let json: serde_json::Value = serde_json::from_slice(&data)
        .map_err(|e| PersistenceError::Deserialization(e.to_string()))?;

    let (declared_columns, rows) = match &json {
        serde_json::Value::Array(rows) => (Vec::new(), rows),
        serde_json::Value::Object(envelope) => {
            let rows = envelope
                .get("records")
                .and_then(|r| r.as_array())
                .ok_or_else(|| {
                    PersistenceError::InvalidFormat("missing 'records' array".to_string())
                })?;
            let columns = envelope
                .get("columns")
                .and_then(|c| c.as_array())
                .map(|cols| {
                    cols.iter()
                        .filter_map(|c| c.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();
            (columns, rows)
        }
        _ => {
            return Err(PersistenceError::InvalidFormat(
                "expected an array of rows or a snapshot object".to_string(),
            ))
        }
    };

    let mut columns: Vec<String> = declared_columns;
    let mut records = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        let object = row.as_object().ok_or_else(|| {
            PersistenceError::InvalidFormat(format!("row {} is not an object", idx))
        })?;
        for name in object.keys() {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
        records.push(record_from_json(object));
    }

    Ok(LoadedTable { columns, records })
}
