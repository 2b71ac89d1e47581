use crate::data::{Record, Value};

/// Ordered, fixed-length sequence of inventory records.
///
/// Records keep their load order for the lifetime of the store. The only
/// mutations are [`RecordStore::set_field`] and
/// [`RecordStore::set_field_where`]; rows are never inserted, removed or
/// reordered after construction.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    /// Field names in first-seen order, used when writing snapshots
    columns: Vec<String>,
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        let mut store = Self {
            columns,
            records: Vec::new(),
        };
        for record in &records {
            store.register_columns(record.keys());
        }
        store.records = records;
        store
    }

    /// Build a store from records alone, deriving column order from them
    pub fn from_records(records: Vec<Record>) -> Self {
        Self::new(Vec::new(), records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// First record in store order matching the predicate, with its position
    pub fn find<P>(&self, mut predicate: P) -> Option<(usize, &Record)>
    where
        P: FnMut(&Record) -> bool,
    {
        self.records.iter().enumerate().find(|(_, r)| predicate(*r))
    }

    /// Lazy traversal in store order
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn for_each<F>(&self, f: F)
    where
        F: FnMut(&Record),
    {
        self.records.iter().for_each(f)
    }

    /// Overwrite one field of one record in place.
    ///
    /// A field the record does not have yet is created. Every other field
    /// and the record order are left untouched.
    pub fn set_field(
        &mut self,
        index: usize,
        field: &str,
        value: Value,
    ) -> Result<Option<Value>, StoreError> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;

        let previous = record.insert(field.to_string(), value);
        if previous.is_none() {
            self.register_columns(std::iter::once(&field.to_string()));
        }
        Ok(previous)
    }

    /// Overwrite one field of the first record matching the predicate.
    ///
    /// Lookup and write share one `&mut` borrow, so the position found is
    /// always in range. Returns that position, or `None` with the store
    /// untouched when nothing matches.
    pub fn set_field_where<P>(&mut self, predicate: P, field: &str, value: Value) -> Option<usize>
    where
        P: FnMut(&Record) -> bool,
    {
        let index = self.find(predicate).map(|(idx, _)| idx)?;
        if self.records[index].insert(field.to_string(), value).is_none() {
            self.register_columns(std::iter::once(&field.to_string()));
        }
        Some(index)
    }

    fn register_columns<'a, I>(&mut self, names: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut new: Vec<&String> = names
            .into_iter()
            .filter(|n| !self.columns.contains(n))
            .collect();
        // HashMap order is arbitrary; keep newly seen columns deterministic
        new.sort();
        new.dedup();
        self.columns.extend(new.into_iter().cloned());
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("record index {index} out of range for store of {len} records")]
    IndexOutOfRange { index: usize, len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::tests::make_record;
    use crate::data::record::{INVENTORY_ID, PRICE};

    fn sample_store() -> RecordStore {
        RecordStore::from_records(vec![
            make_record("A1", Value::Float64(5.0), 10, Value::Null),
            make_record("A2", Value::Float64(7.5), 3, Value::Null),
            make_record("A3", Value::Float64(1.0), 0, Value::Null),
        ])
    }

    #[test]
    fn test_get_and_find_in_store_order() {
        let store = sample_store();

        assert_eq!(store.len(), 3);
        assert_eq!(
            store.get(1).and_then(|r| r.get(INVENTORY_ID)),
            Some(&Value::String("A2".into()))
        );
        assert!(store.get(3).is_none());

        let (idx, _) = store
            .find(|r| r.get(PRICE).and_then(|v| v.as_number()).unwrap_or(0.0) > 2.0)
            .unwrap();
        assert_eq!(idx, 0);
    }

    #[test]
    fn test_set_field_preserves_order_and_length() {
        let mut store = sample_store();

        let previous = store.set_field(1, PRICE, Value::String("9.99".into())).unwrap();
        assert_eq!(previous, Some(Value::Float64(7.5)));
        assert_eq!(store.len(), 3);

        let ids: Vec<_> = store
            .iter()
            .map(|r| r.get(INVENTORY_ID).cloned().unwrap_or_default())
            .collect();
        assert_eq!(ids, vec![Value::from("A1"), Value::from("A2"), Value::from("A3")]);
        assert_eq!(store.get(1).unwrap().get(PRICE), Some(&Value::from("9.99")));
    }

    #[test]
    fn test_set_field_creates_missing_field() {
        let mut store = sample_store();
        let width = store.columns().len();

        assert_eq!(store.set_field(0, "Supplier", Value::from("Acme")).unwrap(), None);
        assert_eq!(store.columns().len(), width + 1);
        assert_eq!(store.columns().last().map(String::as_str), Some("Supplier"));
    }

    #[test]
    fn test_set_field_out_of_range() {
        let mut store = sample_store();
        assert_eq!(
            store.set_field(9, PRICE, Value::Int64(1)),
            Err(StoreError::IndexOutOfRange { index: 9, len: 3 })
        );
    }

    #[test]
    fn test_set_field_where_targets_first_match() {
        let mut store = sample_store();

        let index = store.set_field_where(
            |r| r.get(PRICE).and_then(|v| v.as_number()).unwrap_or(0.0) < 6.0,
            "Supplier",
            Value::from("Acme"),
        );
        assert_eq!(index, Some(0));
        assert_eq!(store.get(0).unwrap().get("Supplier"), Some(&Value::from("Acme")));
        assert!(store.get(2).unwrap().get("Supplier").is_none());
        assert_eq!(store.columns().last().map(String::as_str), Some("Supplier"));

        let missed = store.set_field_where(|_| false, PRICE, Value::Int64(0));
        assert_eq!(missed, None);
        assert_eq!(store.get(1).unwrap().get(PRICE), Some(&Value::Float64(7.5)));
    }

    #[test]
    fn test_explicit_columns_keep_their_order() {
        let columns = vec![PRICE.to_string(), INVENTORY_ID.to_string()];
        let store = RecordStore::new(
            columns,
            vec![make_record("A1", Value::Float64(5.0), 1, Value::Null)],
        );
        assert_eq!(store.columns()[0], PRICE);
        assert_eq!(store.columns()[1], INVENTORY_ID);
        assert_eq!(store.columns().len(), 7);
    }
}
