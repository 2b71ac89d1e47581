pub mod engine;
pub mod persistence;
pub mod store;
pub mod update;

pub use engine::InventoryEngine;
pub use persistence::{
    load_table, JsonFileSink, LoadedTable, MemorySink, PersistenceError, Snapshot,
    SnapshotMetadata, SnapshotSink,
};
pub use store::{RecordStore, StoreError};
pub use update::{UpdateError, UpdateRequest};
