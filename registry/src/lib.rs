//! Ratebook Registry
//!
//! Currency rate registry with validated CRUD over a pluggable rate store.

pub mod config;
pub mod store;
pub mod sqlite;
pub mod registry;

pub use config::StoreConfig;
pub use registry::{default_rates, RateRegistry};
pub use sqlite::SqliteRateStore;
pub use store::{MemoryRateStore, RateStore};
