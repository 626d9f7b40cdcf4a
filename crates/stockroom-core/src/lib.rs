// ABOUTME: Core library for stockroom, containing the record model and the store contract.
// ABOUTME: Defines the shared types (Record, ListFilter, Context, StoreError) used by every backend.

pub mod context;
pub mod error;
pub mod record;
pub mod store;

pub use context::Context;
pub use error::{ImportError, ImportFailure, PersistenceError, StoreError};
pub use record::{InvalidRecord, ListFilter, Record};
pub use store::RecordStore;
