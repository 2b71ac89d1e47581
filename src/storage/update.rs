use super::persistence::{PersistenceError, Snapshot, SnapshotSink};
use super::store::RecordStore;
use crate::data::Value;

/// Change one field of the first record whose `key_name` equals `key_value`
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    pub key_name: String,
    pub key_value: Value,
    pub val_name: String,
    pub new_value: Value,
}

impl UpdateRequest {
    pub fn new(
        key_name: impl Into<String>,
        key_value: impl Into<Value>,
        val_name: impl Into<String>,
        new_value: impl Into<Value>,
    ) -> Self {
        Self {
            key_name: key_name.into(),
            key_value: key_value.into(),
            val_name: val_name.into(),
            new_value: new_value.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("Record with '{key_name}'='{key_value}' not found.")]
    NotFound { key_name: String, key_value: String },

    /// The in-memory record changed but the snapshot write failed
    #[error("Record updated in memory but snapshot failed: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Locate, mutate and persist. Returns the index of the changed record.
///
/// The match is strict equality on the raw stored value: no currency
/// stripping and no string/number conversion. When nothing matches the
/// store is untouched and the sink is not called. A sink failure leaves
/// the in-memory change in place; the next successful update writes it.
pub fn apply_update(
    store: &mut RecordStore,
    sink: &dyn SnapshotSink,
    request: &UpdateRequest,
) -> Result<usize, UpdateError> {
    let index = store
        .set_field_where(
            |record| record.get(&request.key_name) == Some(&request.key_value),
            &request.val_name,
            request.new_value.clone(),
        )
        .ok_or_else(|| UpdateError::NotFound {
            key_name: request.key_name.clone(),
            key_value: request.key_value.to_string(),
        })?;

    sink.persist(&Snapshot {
        columns: store.columns(),
        records: store.records(),
    })
    .map_err(|e| {
        tracing::warn!(
            "Record {} changed in memory but snapshot failed: {}",
            index,
            e
        );
        e
    })?;

    Ok(index)
}
