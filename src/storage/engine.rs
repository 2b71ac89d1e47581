use crate::data::{InventoryRecord, Record, Value};
use crate::query::{self, QueryError, RangeBounds, RangeScan};
use parking_lot::RwLock;
use std::sync::Arc;

use super::persistence::{LoadedTable, SnapshotMetadata, SnapshotSink};
use super::store::RecordStore;
use super::update::{apply_update, UpdateError, UpdateRequest};

/// Shared entry point for every inventory operation.
///
/// Reads take the store's read lock and run concurrently. An update holds
/// the write lock across its whole find, mutate and persist sequence, so
/// concurrent updates never lose each other's changes and readers never
/// see a half-applied update.
pub struct InventoryEngine {
    store: RwLock<RecordStore>,
    sink: Arc<dyn SnapshotSink>,
}

impl InventoryEngine {
    pub fn new(store: RecordStore, sink: Arc<dyn SnapshotSink>) -> Self {
        Self {
            store: RwLock::new(store),
            sink,
        }
    }

    pub fn from_table(table: LoadedTable, sink: Arc<dyn SnapshotSink>) -> Self {
        Self::new(RecordStore::new(table.columns, table.records), sink)
    }

    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }

    pub fn columns(&self) -> Vec<String> {
        self.store.read().columns().to_vec()
    }

    /// SearchByID: typed record for an exact identity match
    pub fn search_by_id(&self, id: &Value) -> Result<InventoryRecord, QueryError> {
        let store = self.store.read();
        let record = query::find_by_id(&store, id)?;
        Ok(InventoryRecord::from_record(record)?)
    }

    /// Untyped full row for an exact identity match
    pub fn search_row_by_id(&self, id: &Value) -> Result<Record, QueryError> {
        let store = self.store.read();
        query::find_by_id(&store, id).map(Record::clone)
    }

    /// Search: typed record for a currency-normalized attribute match
    pub fn search(&self, field: &str, value: &str) -> Result<InventoryRecord, QueryError> {
        let store = self.store.read();
        let record = query::find_by_attribute(&store, field, value)?;
        Ok(InventoryRecord::from_record(record)?)
    }

    /// Feed every record in range to `emit` as the scan reaches it.
    ///
    /// `emit` returns `false` to stop early. The read lock is held for the
    /// duration of the scan. Returns the number of records emitted.
    pub fn scan_range<F>(&self, field: &str, bounds: RangeBounds, mut emit: F) -> usize
    where
        F: FnMut(&Record) -> bool,
    {
        let store = self.store.read();
        let mut emitted = 0;
        for record in RangeScan::new(&store, field, bounds) {
            emitted += 1;
            if !emit(record) {
                break;
            }
        }
        tracing::debug!(
            "Range scan on '{}' [{}, {}] emitted {} records",
            field,
            bounds.start,
            bounds.end,
            emitted
        );
        emitted
    }

    /// SearchRange, collected: bounds are parsed before any scan happens
    pub fn search_range(
        &self,
        field: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<InventoryRecord>, QueryError> {
        let bounds = RangeBounds::parse(start, end)?;
        let mut results = Vec::new();
        let mut failure = None;

        self.scan_range(field, bounds, |record| match InventoryRecord::from_record(record) {
            Ok(typed) => {
                results.push(typed);
                true
            }
            Err(e) => {
                failure = Some(e);
                false
            }
        });

        match failure {
            Some(e) => Err(e.into()),
            None => Ok(results),
        }
    }

    /// GetPercentile
    pub fn percentile(&self, field: &str, p: f64) -> Result<f64, QueryError> {
        let store = self.store.read();
        query::field_percentile(&store, field, p)
    }

    /// Update: strict match, single-field change, synchronous snapshot
    pub fn update(&self, request: &UpdateRequest) -> Result<(), UpdateError> {
        let mut store = self.store.write();
        let index = apply_update(&mut store, self.sink.as_ref(), request)?;
        tracing::info!(
            "Updated record {}: {}='{}' set {}",
            index,
            request.key_name,
            request.key_value,
            request.val_name
        );
        Ok(())
    }

    pub fn latest_snapshot(&self) -> Option<SnapshotMetadata> {
        self.sink.latest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::tests::make_record;
    use crate::data::record::{INVENTORY_ID, NAME, PRICE, QUANTITY_IN_STOCK};
    use crate::storage::persistence::MemorySink;

    fn make_engine(count: usize) -> (InventoryEngine, Arc<MemorySink>) {
        let records = (0..count)
            .map(|i| {
                make_record(
                    &format!("A{}", i),
                    Value::String(format!("{}.00", i)),
                    i as i64,
                    Value::Null,
                )
            })
            .collect();
        let sink = Arc::new(MemorySink::new());
        let engine = InventoryEngine::new(RecordStore::from_records(records), sink.clone());
        (engine, sink)
    }

    #[test]
    fn test_update_visible_to_following_reads() {
        let (engine, sink) = make_engine(3);

        engine
            .update(&UpdateRequest::new(INVENTORY_ID, "A1", NAME, "Gadget"))
            .unwrap();

        assert_eq!(engine.search_by_id(&Value::from("A1")).unwrap().name, "Gadget");
        assert_eq!(engine.search(NAME, "Gadget").unwrap().inventory_id, "A1");
        assert_eq!(
            sink.last_snapshot().unwrap()[1].get(NAME),
            Some(&Value::from("Gadget"))
        );
    }

    #[test]
    fn test_search_and_update_match_asymmetrically() {
        let (engine, sink) = make_engine(6);

        // Search normalizes "$5.00" to match the stored "5.00"
        assert_eq!(engine.search(PRICE, "$5.00").unwrap().inventory_id, "A5");

        // Update compares raw values and does not
        let err = engine
            .update(&UpdateRequest::new(PRICE, "$5.00", NAME, "x"))
            .unwrap_err();
        assert!(matches!(err, UpdateError::NotFound { .. }));
        assert_eq!(sink.snapshot_count(), 0);

        engine
            .update(&UpdateRequest::new(PRICE, "5.00", NAME, "x"))
            .unwrap();
        assert_eq!(sink.snapshot_count(), 1);
    }

    #[test]
    fn test_search_range_and_conversion_errors() {
        let (engine, _) = make_engine(10);

        let found = engine.search_range(QUANTITY_IN_STOCK, "3", "5").unwrap();
        let ids: Vec<_> = found.iter().map(|r| r.inventory_id.as_str()).collect();
        assert_eq!(ids, vec!["A3", "A4", "A5"]);

        assert!(matches!(
            engine.search_range(QUANTITY_IN_STOCK, "three", "5"),
            Err(QueryError::Conversion(_))
        ));
    }

    #[test]
    fn test_scan_range_stops_when_asked() {
        let (engine, _) = make_engine(10);
        let mut seen = 0;
        let emitted = engine.scan_range(QUANTITY_IN_STOCK, RangeBounds::new(0.0, 9.0), |_| {
            seen += 1;
            seen < 4
        });
        assert_eq!(emitted, 4);
    }

    #[test]
    fn test_percentile_through_engine() {
        let (engine, _) = make_engine(5);
        assert_eq!(engine.percentile(QUANTITY_IN_STOCK, 100.0).unwrap(), 4.0);
        assert_eq!(engine.percentile(PRICE, 50.0).unwrap(), 2.0);

        let (empty, _) = make_engine(0);
        assert!(matches!(
            empty.percentile(PRICE, 50.0),
            Err(QueryError::NotFound(_))
        ));
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let (engine, sink) = make_engine(50);

        std::thread::scope(|scope| {
            for i in 0..50 {
                let engine = &engine;
                scope.spawn(move || {
                    engine
                        .update(&UpdateRequest::new(
                            INVENTORY_ID,
                            format!("A{}", i),
                            QUANTITY_IN_STOCK,
                            Value::Int64(1000 + i),
                        ))
                        .unwrap();
                });
            }
        });

        assert_eq!(sink.snapshot_count(), 50);
        let last = sink.last_snapshot().unwrap();
        for (i, record) in last.iter().enumerate() {
            assert_eq!(
                record.get(QUANTITY_IN_STOCK),
                Some(&Value::Int64(1000 + i as i64))
            );
        }
        assert_eq!(engine.len(), 50);
    }
}
