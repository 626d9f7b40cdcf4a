// ABOUTME: The RecordStore contract implemented by every storage backend.
// ABOUTME: Object-safe async trait so callers can hold an Arc<dyn RecordStore> picked at runtime.

use async_trait::async_trait;

use crate::context::Context;
use crate::error::StoreError;
use crate::record::{ListFilter, Record};

/// CRUD, filtered listing, and bulk import over product records.
///
/// Every method checks `ctx` before doing any work and returns
/// `Cancelled` or `DeadlineExceeded` if it has already fired.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record. Fails with `AlreadyExists` if the id is taken.
    async fn create(&self, ctx: &Context, record: Record) -> Result<(), StoreError>;

    /// Fetch a record by id. Fails with `NotFound` if absent.
    async fn get(&self, ctx: &Context, id: &str) -> Result<Record, StoreError>;

    /// Replace the record stored under `id`. Fails with `NotFound` if absent,
    /// then with `IdentityMismatch` if `record.id != id`.
    async fn update(&self, ctx: &Context, id: &str, record: Record) -> Result<(), StoreError>;

    /// Remove a record. Fails with `NotFound` if absent.
    async fn delete(&self, ctx: &Context, id: &str) -> Result<(), StoreError>;

    /// All records matching `filter`, in no particular order.
    async fn list(&self, ctx: &Context, filter: &ListFilter) -> Result<Vec<Record>, StoreError>;

    /// Insert many records concurrently. Records that fail are reported in
    /// an aggregate `Import` error; the rest stay inserted.
    async fn bulk_import(&self, ctx: &Context, records: Vec<Record>) -> Result<(), StoreError>;
}
