//! Read-only queries over the record store. Every query is a linear scan
//! in store order.

pub mod lookup;
pub mod percentile;
pub mod range;

pub use lookup::{find_by_attribute, find_by_id};
pub use percentile::{field_percentile, percentile_linear};
pub use range::{RangeBounds, RangeScan};

use crate::data::ConversionError;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("{0}")]
    NotFound(String),

    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),
}
