// Record store implementations: DashMap for tests and local runs, SQLite for deployments.

pub mod in_memory;
pub mod sqlite_store;

pub use in_memory::InMemoryRecordStore;
pub use sqlite_store::SqliteRecordStore;
