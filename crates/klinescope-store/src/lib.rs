//! Series accumulation and persistence for klinescope.
//!
//! `SeriesStore` owns the in-memory series per subscription key and keeps a
//! persisted copy current through a `KeyValueStore` backend. The in-memory
//! series is always authoritative: persistence failures are typed and
//! non-fatal, never a reason to drop an observed point.

pub mod error;
pub mod kv;
pub mod series;

pub use error::{StoreError, StoreResult};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use series::SeriesStore;
