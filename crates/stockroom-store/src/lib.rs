// ABOUTME: Storage backends for stockroom implementing the RecordStore contract.
// ABOUTME: Provides the locked in-memory map, the bulk import worker pool, and the JSON snapshot file store.

pub mod factory;
pub mod import;
pub mod json_file;
pub mod memory;

pub use factory::{StoreKind, UnknownStoreKind, open_store};
pub use import::MAX_IMPORT_WORKERS;
pub use json_file::JsonFileStore;
pub use memory::InMemoryStore;
