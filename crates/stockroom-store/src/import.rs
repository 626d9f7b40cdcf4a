// ABOUTME: Concurrent bulk import: a fixed worker pool draining a shared queue of records.
// ABOUTME: Workers reuse the single-record create path; failures are aggregated, never rolled back.

use std::collections::VecDeque;
use std::sync::Arc;

use stockroom_core::{Context, ImportError, ImportFailure, Record, RecordStore, StoreError};
use tokio::sync::{Mutex, mpsc};

/// Upper bound on concurrently running import workers.
pub const MAX_IMPORT_WORKERS: usize = 10;

/// Outcome a worker reports for one record.
type Outcome = (String, Result<(), StoreError>);

/// Insert `records` into `store` using min(MAX_IMPORT_WORKERS, N) workers.
///
/// Every input record ends up either inserted or listed in the returned
/// `Import` error. Records left in the queue after cancellation stopped the
/// workers are reported with the context's error.
pub(crate) async fn run<S>(
    store: &S,
    ctx: &Context,
    records: Vec<Record>,
) -> Result<(), StoreError>
where
    S: RecordStore + Clone + 'static,
{
    ctx.check()?;

    let total = records.len();
    tracing::info!(count = total, "starting bulk import");
    if total == 0 {
        return Ok(());
    }

    // Pre-filled with the whole batch, so producing never waits on workers.
    let queue = Arc::new(Mutex::new(VecDeque::from(records)));
    let (result_tx, mut result_rx) = mpsc::channel::<Outcome>(total);

    let worker_count = total.min(MAX_IMPORT_WORKERS);
    let mut workers = Vec::with_capacity(worker_count);
    for worker_id in 0..worker_count {
        workers.push(tokio::spawn(worker(
            worker_id,
            store.clone(),
            ctx.clone(),
            Arc::clone(&queue),
            result_tx.clone(),
        )));
    }
    drop(result_tx);

    let mut failures = Vec::new();

    for handle in workers {
        if let Err(e) = handle.await {
            tracing::error!("bulk import worker failed: {}", e);
            failures.push(ImportFailure {
                record_id: None,
                error: StoreError::WorkerFailed(e.to_string()),
            });
        }
    }

    let mut imported = 0usize;
    while let Some((id, outcome)) = result_rx.recv().await {
        match outcome {
            Ok(()) => imported += 1,
            Err(error) => failures.push(ImportFailure {
                record_id: Some(id),
                error,
            }),
        }
    }

    // Only cancellation can leave records behind.
    let leftover: Vec<Record> = queue.lock().await.drain(..).collect();
    for record in leftover {
        failures.push(ImportFailure {
            record_id: Some(record.id),
            error: ctx.check().err().unwrap_or(StoreError::Cancelled),
        });
    }

    match ImportError::from_failures(failures) {
        Some(err) => {
            tracing::warn!(
                imported,
                error_count = err.count(),
                "bulk import completed with errors"
            );
            Err(err.into())
        }
        None => {
            tracing::info!(imported, "bulk import completed successfully");
            Ok(())
        }
    }
}

/// Pull records until the queue is empty or the context fires.
async fn worker<S: RecordStore>(
    worker_id: usize,
    store: S,
    ctx: Context,
    queue: Arc<Mutex<VecDeque<Record>>>,
    results: mpsc::Sender<Outcome>,
) {
    loop {
        let Some(record) = queue.lock().await.pop_front() else {
            break;
        };

        if let Err(err) = ctx.check() {
            tracing::debug!(worker_id, id = %record.id, "import worker stopping: {}", err);
            let _ = results.send((record.id, Err(err))).await;
            break;
        }

        let id = record.id.clone();
        let outcome = store.create(&ctx, record).await;
        if results.send((id, outcome)).await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use stockroom_core::ListFilter;
    use tokio::sync::Semaphore;

    use super::*;
    use crate::memory::InMemoryStore;

    fn batch(ids: &[&str]) -> Vec<Record> {
        ids.iter()
            .map(|id| Record::new(*id, format!("Item {}", id), 2.5, 1, "bulk"))
            .collect()
    }

    #[tokio::test]
    async fn empty_import_succeeds_without_changes() {
        let store = InMemoryStore::new();
        store.bulk_import(&Context::background(), Vec::new()).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn import_inserts_every_record() {
        let store = InMemoryStore::new();
        let ctx = Context::background();
        let ids: Vec<String> = (0..250).map(|i| format!("sku-{}", i)).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();

        store.bulk_import(&ctx, batch(&id_refs)).await.unwrap();

        let stored: HashSet<String> = store
            .list(&ctx, &ListFilter::all())
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(stored.len(), 250);
        assert!(ids.iter().all(|id| stored.contains(id)));
    }

    #[tokio::test]
    async fn batch_smaller_than_pool_still_imports() {
        let store = InMemoryStore::new();
        store
            .bulk_import(&Context::background(), batch(&["only"]))
            .await
            .unwrap();
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn duplicate_in_batch_reports_single_failure() {
        let store = InMemoryStore::new();
        let ctx = Context::background();

        let err = store
            .bulk_import(&ctx, batch(&["a", "b", "c", "b", "d"]))
            .await
            .unwrap_err();

        match err {
            StoreError::Import(import) => {
                assert_eq!(import.count(), 1);
                let failure = &import.failures()[0];
                assert_eq!(failure.record_id.as_deref(), Some("b"));
                assert!(matches!(failure.error, StoreError::AlreadyExists { .. }));
            }
            other => panic!("expected Import error, got {:?}", other),
        }
        assert_eq!(store.len().await, 4);
    }

    #[tokio::test]
    async fn existing_records_count_as_failures_without_rollback() {
        let store = InMemoryStore::new();
        let ctx = Context::background();
        store
            .create(&ctx, Record::new("x", "Existing", 1.0, 1, ""))
            .await
            .unwrap();

        let err = store
            .bulk_import(&ctx, batch(&["x", "y", "z"]))
            .await
            .unwrap_err();

        let StoreError::Import(import) = err else {
            panic!("expected Import error");
        };
        assert_eq!(import.count(), 1);
        assert!(import.to_string().contains("already exists"));
        assert_eq!(store.len().await, 3);
        assert_eq!(store.get(&ctx, "x").await.unwrap().name, "Existing");
    }

    #[tokio::test]
    async fn cancelled_context_fails_before_spawning() {
        let store = InMemoryStore::new();
        let ctx = Context::background();
        ctx.cancel();

        let err = store
            .bulk_import(&ctx, batch(&["a", "b"]))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Cancelled));
        assert!(store.is_empty().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn pool_never_exceeds_worker_limit() {
        let store = GatedStore::new();
        let import = spawn_import(&store, &Context::background(), 50);

        store.wait_for_in_flight(MAX_IMPORT_WORKERS).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.in_flight.load(Ordering::SeqCst), MAX_IMPORT_WORKERS);

        store.gate.add_permits(50);
        import.await.unwrap().unwrap();

        assert_eq!(store.peak.load(Ordering::SeqCst), MAX_IMPORT_WORKERS);
        assert_eq!(store.inner.len().await, 50);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn cancellation_mid_import_accounts_for_every_record() {
        let store = GatedStore::new();
        let ctx = Context::background();
        let import = spawn_import(&store, &ctx, 500);

        // Every worker is parked inside create, past the up-front check.
        store.wait_for_in_flight(MAX_IMPORT_WORKERS).await;
        ctx.cancel();
        store.gate.add_permits(500);

        let result = import.await.unwrap();
        let inserted = store.inner.len().await;

        let err = match result {
            Err(StoreError::Import(err)) => err,
            other => panic!("expected Import error, got {:?}", other),
        };
        assert_eq!(inserted + err.count(), 500);
        assert!(err.count() > 0);
        assert!(err.failures().iter().all(|f| f.error.is_cancellation()));
        assert!(err.failures().iter().all(|f| f.record_id.is_some()));
    }

    fn spawn_import(
        store: &GatedStore,
        ctx: &Context,
        count: usize,
    ) -> tokio::task::JoinHandle<Result<(), StoreError>> {
        let ids: Vec<String> = (0..count).map(|i| i.to_string()).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let records = batch(&id_refs);
        let store = store.clone();
        let ctx = ctx.clone();
        tokio::spawn(async move { store.bulk_import(&ctx, records).await })
    }

    /// Holds every create at a semaphore and tracks how many are in flight.
    #[derive(Clone)]
    struct GatedStore {
        inner: InMemoryStore,
        gate: Arc<Semaphore>,
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl GatedStore {
        fn new() -> Self {
            Self {
                inner: InMemoryStore::new(),
                gate: Arc::new(Semaphore::new(0)),
                in_flight: Arc::new(AtomicUsize::new(0)),
                peak: Arc::new(AtomicUsize::new(0)),
            }
        }

        async fn wait_for_in_flight(&self, expected: usize) {
            for _ in 0..500 {
                if self.in_flight.load(Ordering::SeqCst) == expected {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            panic!("never reached {} creates in flight", expected);
        }
    }

    #[async_trait]
    impl RecordStore for GatedStore {
        async fn create(&self, ctx: &Context, record: Record) -> Result<(), StoreError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            let permit = self.gate.acquire().await.unwrap();
            let outcome = self.inner.create(ctx, record).await;
            drop(permit);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            outcome
        }

        async fn get(&self, ctx: &Context, id: &str) -> Result<Record, StoreError> {
            self.inner.get(ctx, id).await
        }

        async fn update(&self, ctx: &Context, id: &str, record: Record) -> Result<(), StoreError> {
            self.inner.update(ctx, id, record).await
        }

        async fn delete(&self, ctx: &Context, id: &str) -> Result<(), StoreError> {
            self.inner.delete(ctx, id).await
        }

        async fn list(&self, ctx: &Context, filter: &ListFilter) -> Result<Vec<Record>, StoreError> {
            self.inner.list(ctx, filter).await
        }

        async fn bulk_import(&self, ctx: &Context, records: Vec<Record>) -> Result<(), StoreError> {
            run(self, ctx, records).await
        }
    }
}
