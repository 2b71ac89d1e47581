use crate::data::coerce::{parse_f64, ConversionError};
use crate::data::Record;
use crate::storage::RecordStore;

/// Inclusive numeric bounds for a range scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeBounds {
    pub start: f64,
    pub end: f64,
}

impl RangeBounds {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Parse both bounds from their wire form; either failing rejects the scan
    pub fn parse(start: &str, end: &str) -> Result<Self, ConversionError> {
        Ok(Self {
            start: parse_f64(start)?,
            end: parse_f64(end)?,
        })
    }

    pub fn contains(&self, value: f64) -> bool {
        self.start <= value && value <= self.end
    }
}

/// Lazy scan yielding, in store order, every record whose `field` holds a
/// number inside the bounds.
///
/// Only values stored as numbers qualify, with booleans counting as 1 and
/// 0. Absent fields, numeric-looking strings and NaN are skipped without
/// error.
pub struct RangeScan<'a> {
    records: std::slice::Iter<'a, Record>,
    field: &'a str,
    bounds: RangeBounds,
}

impl<'a> RangeScan<'a> {
    pub fn new(store: &'a RecordStore, field: &'a str, bounds: RangeBounds) -> Self {
        Self {
            records: store.iter(),
            field,
            bounds,
        }
    }
}

impl<'a> Iterator for RangeScan<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        let field = self.field;
        let bounds = self.bounds;
        self.records.find(|record| {
            record
                .get(field)
                .and_then(|v| v.as_number())
                .map_or(false, |n| bounds.contains(n))
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.records.size_hint().1)
    }
}
