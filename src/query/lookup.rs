use super::QueryError;
use crate::data::record::INVENTORY_ID;
use crate::data::{MatchKey, Record, Value};
use crate::storage::RecordStore;

/// First record whose identity field equals `id` exactly.
///
/// No normalization is applied: a string id never matches a numeric one.
pub fn find_by_id<'a>(store: &'a RecordStore, id: &Value) -> Result<&'a Record, QueryError> {
    store
        .find(|record| record.get(INVENTORY_ID) == Some(id))
        .map(|(_, record)| record)
        .ok_or_else(|| QueryError::NotFound(format!("Inventory ID '{}' not found.", id)))
}

/// First record whose `field` matches `value` after currency normalization.
///
/// Unlike [`find_by_id`], both sides drop one leading `$`. Stored strings
/// compare as text; stored numbers compare numerically when the query
/// parses. Records without the field never match.
pub fn find_by_attribute<'a>(
    store: &'a RecordStore,
    field: &str,
    value: &str,
) -> Result<&'a Record, QueryError> {
    let wanted = MatchKey::from_text(value);

    store
        .find(|record| {
            record
                .get(field)
                .map_or(false, |stored| wanted.matches(stored))
        })
        .map(|(_, record)| record)
        .ok_or_else(|| {
            QueryError::NotFound(format!(
                "Key '{}' with value '{}' not found.",
                field,
                crate::data::coerce::strip_currency(value)
            ))
        })
}
