// ABOUTME: Backend selection: parses a StoreKind and opens the matching RecordStore.
// ABOUTME: The CLI calls open_store once at startup and passes the handle to every command.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use stockroom_core::{RecordStore, StoreError};
use thiserror::Error;

use crate::json_file::JsonFileStore;
use crate::memory::InMemoryStore;

/// Which backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    #[default]
    Memory,
    Json,
}

#[derive(Debug, Error)]
#[error("unsupported store type: {0} (expected memory or json)")]
pub struct UnknownStoreKind(pub String);

impl FromStr for StoreKind {
    type Err = UnknownStoreKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "json" => Ok(StoreKind::Json),
            _ => Err(UnknownStoreKind(s.to_string())),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Memory => write!(f, "memory"),
            StoreKind::Json => write!(f, "json"),
        }
    }
}

/// Open a store of the given kind. `path` is only used by the JSON backend.
pub async fn open_store(kind: StoreKind, path: &Path) -> Result<Arc<dyn RecordStore>, StoreError> {
    let store: Arc<dyn RecordStore> = match kind {
        StoreKind::Memory => Arc::new(InMemoryStore::new()),
        StoreKind::Json => Arc::new(JsonFileStore::open(path).await?),
    };
    tracing::debug!(kind = %kind, path = %path.display(), "store opened");
    Ok(store)
}
