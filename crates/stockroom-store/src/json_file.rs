// ABOUTME: File-backed RecordStore that wraps an InMemoryStore and snapshots it to a JSON file.
// ABOUTME: Loads the whole file on open and atomically rewrites it after every successful mutation.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use stockroom_core::{Context, ListFilter, PersistenceError, Record, RecordStore, StoreError};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::memory::InMemoryStore;

/// Record store persisted as a pretty-printed JSON object keyed by id.
///
/// Reads are served from memory. Writes go to memory first and then the
/// full record set is saved under `file_lock`, which is separate from the
/// in-memory data lock so file I/O never blocks readers.
#[derive(Debug)]
pub struct JsonFileStore {
    memory: InMemoryStore,
    path: PathBuf,
    file_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing or empty file yields an empty
    /// store; a file that cannot be read or decoded is an error.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self {
            memory: InMemoryStore::new(),
            path: path.into(),
            file_lock: Mutex::new(()),
        };
        store.load().await?;
        Ok(store)
    }

    /// Returns the path of the backing JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<(), PersistenceError> {
        let _file = self.file_lock.lock().await;

        let data = match fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no store file yet, starting empty");
                return Ok(());
            }
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }

        let records: Option<HashMap<String, Record>> =
            serde_json::from_slice(&data).map_err(|source| PersistenceError::Decode {
                path: self.path.clone(),
                source,
            })?;
        let records = records.unwrap_or_default();

        tracing::info!(
            path = %self.path.display(),
            count = records.len(),
            "loaded records from store file"
        );
        self.memory.replace_all(records).await;
        Ok(())
    }

    /// Write the full record set to a sibling temp file, fsync it, then
    /// rename it over the target.
    async fn save(&self) -> Result<(), PersistenceError> {
        let _file = self.file_lock.lock().await;

        let snapshot = self.memory.snapshot().await;
        let json = serde_json::to_vec_pretty(&snapshot).map_err(PersistenceError::Encode)?;

        let tmp_path = self.tmp_path();
        let write_err = |source| PersistenceError::Write {
            path: self.path.clone(),
            source,
        };

        let mut file = fs::File::create(&tmp_path).await.map_err(write_err)?;
        file.write_all(&json).await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;
        drop(file);

        fs::rename(&tmp_path, &self.path).await.map_err(write_err)?;

        tracing::debug!(
            path = %self.path.display(),
            count = snapshot.len(),
            "saved store file"
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn create(&self, ctx: &Context, record: Record) -> Result<(), StoreError> {
        self.memory.create(ctx, record).await?;
        self.save().await?;
        Ok(())
    }

    async fn get(&self, ctx: &Context, id: &str) -> Result<Record, StoreError> {
        self.memory.get(ctx, id).await
    }

    async fn update(&self, ctx: &Context, id: &str, record: Record) -> Result<(), StoreError> {
        self.memory.update(ctx, id, record).await?;
        self.save().await?;
        Ok(())
    }

    async fn delete(&self, ctx: &Context, id: &str) -> Result<(), StoreError> {
        self.memory.delete(ctx, id).await?;
        self.save().await?;
        Ok(())
    }

    async fn list(&self, ctx: &Context, filter: &ListFilter) -> Result<Vec<Record>, StoreError> {
        self.memory.list(ctx, filter).await
    }

    /// Saves even when the import partially failed so the records that did
    /// land are not lost. A save failure wraps the import's error.
    async fn bulk_import(&self, ctx: &Context, records: Vec<Record>) -> Result<(), StoreError> {
        let imported = self.memory.bulk_import(ctx, records).await;

        if let Err(source) = self.save().await {
            tracing::error!(path = %self.path.display(), "failed to save after bulk import: {}", source);
            return Err(StoreError::Persistence {
                source,
                superseded: imported.err().map(Box::new),
            });
        }

        imported
    }
}
