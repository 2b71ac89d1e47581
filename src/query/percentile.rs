use super::QueryError;
use crate::data::coerce::{to_f64, ConversionError};
use crate::data::Value;
use crate::storage::RecordStore;

/// Percentile of `values` by linear interpolation between order statistics.
///
/// The fractional rank is `p / 100 * (n - 1)`; the result interpolates
/// between the sorted values on either side of it. Returns `None` for an
/// empty input and NaN if any input is NaN. Sorts `values` in place.
pub fn percentile_linear(values: &mut [f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    if values.iter().any(|v| v.is_nan()) {
        return Some(f64::NAN);
    }

    values.sort_by(|a, b| a.total_cmp(b));

    let rank = (p / 100.0) * (values.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(values.len() - 1);
    let fraction = rank - lower as f64;

    Some(values[lower] + (values[upper] - values[lower]) * fraction)
}

/// Percentile of `field` across the whole store.
///
/// Every record contributes one value; absent or empty cells count as `0`,
/// so sparse columns skew toward zero. Booleans count as 1 and 0. A cell
/// that is present but not numeric rejects the request.
pub fn field_percentile(store: &RecordStore, field: &str, p: f64) -> Result<f64, QueryError> {
    if !(0.0..=100.0).contains(&p) {
        return Err(ConversionError::PercentileOutOfRange(p).into());
    }

    let mut values = store
        .iter()
        .map(|record| match record.get(field) {
            None | Some(Value::Null) => Ok(0.0),
            Some(value) => to_f64(value).map_err(|e| e.in_field(field)),
        })
        .collect::<Result<Vec<f64>, ConversionError>>()?;

    percentile_linear(&mut values, p).ok_or_else(|| {
        QueryError::NotFound(format!("Key '{}' not found in the inventory data.", field))
    })
}
