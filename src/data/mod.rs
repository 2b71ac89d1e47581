pub mod coerce;
pub mod record;
pub mod value;

pub use coerce::{discontinued_flag, to_f64, to_i64, ConversionError, MatchKey};
pub use record::{InventoryRecord, Record};
pub use value::Value;
