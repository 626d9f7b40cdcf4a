// ABOUTME: Error types returned by the store contract and the persistence layer.
// ABOUTME: Includes the aggregate ImportError that keeps every per-record bulk import failure.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that any `RecordStore` operation can return.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record with id {id} not found")]
    NotFound { id: String },

    #[error("record with id {id} already exists")]
    AlreadyExists { id: String },

    #[error("record id mismatch: expected {expected}, got {got}")]
    IdentityMismatch { expected: String, got: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("import worker failed: {0}")]
    WorkerFailed(String),

    /// A load or save of the backing file failed. When a bulk import save
    /// fails, the import's own error is kept in `superseded`.
    #[error("persistence error: {source}")]
    Persistence {
        source: PersistenceError,
        superseded: Option<Box<StoreError>>,
    },
}

impl From<PersistenceError> for StoreError {
    fn from(source: PersistenceError) -> Self {
        StoreError::Persistence {
            source,
            superseded: None,
        }
    }
}

impl StoreError {
    /// True for the two context-expiry kinds.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, StoreError::Cancelled | StoreError::DeadlineExceeded)
    }
}

/// Errors from reading or writing the snapshot file.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One record that bulk import could not insert. `record_id` is `None`
/// only when a worker task died without reporting which record it held.
#[derive(Debug)]
pub struct ImportFailure {
    pub record_id: Option<String>,
    pub error: StoreError,
}

/// Aggregate bulk import error. Never constructed empty.
#[derive(Debug)]
pub struct ImportError {
    failures: Vec<ImportFailure>,
}

impl ImportError {
    /// Returns `None` when there is nothing to report.
    pub fn from_failures(failures: Vec<ImportFailure>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self { failures })
        }
    }

    pub fn count(&self) -> usize {
        self.failures.len()
    }

    pub fn failures(&self) -> &[ImportFailure] {
        &self.failures
    }

    /// The representative cause used in the error message.
    pub fn first(&self) -> &StoreError {
        &self.failures[0].error
    }
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bulk import encountered {} errors: {}",
            self.count(),
            self.first()
        )
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_failure_list_is_not_an_error() {
        assert!(ImportError::from_failures(Vec::new()).is_none());
    }

    #[test]
    fn import_error_message_reports_count_and_first_cause() {
        let err = ImportError::from_failures(vec![
            ImportFailure {
                record_id: Some("7".to_string()),
                error: StoreError::AlreadyExists { id: "7".to_string() },
            },
            ImportFailure {
                record_id: Some("8".to_string()),
                error: StoreError::Cancelled,
            },
        ])
        .unwrap();

        assert_eq!(err.count(), 2);
        assert_eq!(
            err.to_string(),
            "bulk import encountered 2 errors: record with id 7 already exists"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn persistence_error_converts_without_superseded_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StoreError = PersistenceError::Write {
            path: PathBuf::from("/tmp/x.json"),
            source: io,
        }
        .into();

        match err {
            StoreError::Persistence { superseded, .. } => assert!(superseded.is_none()),
            other => panic!("expected Persistence, got {:?}", other),
        }
    }

    #[test]
    fn cancellation_kinds() {
        assert!(StoreError::Cancelled.is_cancellation());
        assert!(StoreError::DeadlineExceeded.is_cancellation());
        assert!(!StoreError::NotFound { id: "1".into() }.is_cancellation());
    }
}
