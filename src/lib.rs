//! Stockroom: In-Memory Inventory Record Store
//!
//! Holds an ordered table of inventory records in memory and serves
//! lookups, range scans, percentile statistics and single-field updates
//! over HTTP. Every successful update writes a full snapshot of the table.
//!
//! # Features
//!
//! - **Identity Lookup**: exact match on `Inventory_ID`
//! - **Attribute Lookup**: equality on any field, ignoring a leading `$`
//! - **Range Scan**: streamed records whose numeric field lies in `[start, end]`
//! - **Percentiles**: linear interpolation over one field of every record
//! - **Updates**: strict-match single-field change with synchronous snapshot
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use stockroom::data::Value;
//! use stockroom::storage::{load_table, InventoryEngine, JsonFileSink, UpdateRequest};
//!
//! let table = load_table("inventory.json").unwrap();
//! let engine = InventoryEngine::from_table(table, Arc::new(JsonFileSink::new("inventory.json")));
//!
//! let item = engine.search_by_id(&Value::from("INV-001")).unwrap();
//! println!("{} costs {}", item.name, item.price);
//!
//! let median = engine.percentile("Price", 50.0).unwrap();
//! println!("Median price: {}", median);
//!
//! engine
//!     .update(&UpdateRequest::new("Inventory_ID", "INV-001", "Quantity_in_Stock", 40i64))
//!     .unwrap();
//! ```

pub mod api;
pub mod data;
pub mod query;
pub mod storage;

// Re-export commonly used types
pub use data::{InventoryRecord, Record, Value};
pub use query::QueryError;
pub use storage::{InventoryEngine, PersistenceError, RecordStore, UpdateError, UpdateRequest};
