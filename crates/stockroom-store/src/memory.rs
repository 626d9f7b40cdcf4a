// ABOUTME: In-memory RecordStore backed by a HashMap behind a single async RwLock.
// ABOUTME: Reads take the shared lock, mutations take the exclusive lock for lookup plus write only.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use stockroom_core::{Context, ListFilter, Record, RecordStore, StoreError};
use tokio::sync::RwLock;

use crate::import;

/// Thread-safe record map. Cloning yields another handle to the same map,
/// which is how bulk import workers share it.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: Arc<RwLock<HashMap<String, Record>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Copy of the full record set, ordered by id, taken under the read lock.
    pub(crate) async fn snapshot(&self) -> BTreeMap<String, Record> {
        let records = self.records.read().await;
        records
            .iter()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect()
    }

    /// Swap in a whole new record set under the write lock.
    pub(crate) async fn replace_all(&self, records: HashMap<String, Record>) {
        let mut guard = self.records.write().await;
        *guard = records;
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn create(&self, ctx: &Context, record: Record) -> Result<(), StoreError> {
        ctx.check()?;

        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            tracing::warn!(id = %record.id, "attempted to create duplicate record");
            return Err(StoreError::AlreadyExists { id: record.id });
        }

        tracing::info!(id = %record.id, name = %record.name, "record created");
        records.insert(record.id.clone(), record);
        Ok(())
    }

    async fn get(&self, ctx: &Context, id: &str) -> Result<Record, StoreError> {
        ctx.check()?;

        let records = self.records.read().await;
        records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    async fn update(&self, ctx: &Context, id: &str, record: Record) -> Result<(), StoreError> {
        ctx.check()?;

        let mut records = self.records.write().await;
        let Some(slot) = records.get_mut(id) else {
            tracing::warn!(id = %id, "attempted to update missing record");
            return Err(StoreError::NotFound { id: id.to_string() });
        };

        if record.id != id {
            return Err(StoreError::IdentityMismatch {
                expected: id.to_string(),
                got: record.id,
            });
        }

        *slot = record;
        tracing::info!(id = %id, "record updated");
        Ok(())
    }

    async fn delete(&self, ctx: &Context, id: &str) -> Result<(), StoreError> {
        ctx.check()?;

        let mut records = self.records.write().await;
        if records.remove(id).is_none() {
            tracing::warn!(id = %id, "attempted to delete missing record");
            return Err(StoreError::NotFound { id: id.to_string() });
        }

        tracing::info!(id = %id, "record deleted");
        Ok(())
    }

    async fn list(&self, ctx: &Context, filter: &ListFilter) -> Result<Vec<Record>, StoreError> {
        ctx.check()?;

        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    async fn bulk_import(&self, ctx: &Context, records: Vec<Record>) -> Result<(), StoreError> {
        import::run(self, ctx, records).await
    }
}
