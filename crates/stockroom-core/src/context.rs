// ABOUTME: Cooperative cancellation handle passed to every store operation.
// ABOUTME: Carries a shared cancel flag and an optional deadline; clones observe the same flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::error::StoreError;

/// Execution context for store calls. Cloning is cheap and every clone
/// shares the cancellation flag, so cancelling one cancels all of them.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that only fires when `cancel` is called.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context that fires once `deadline` has passed.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    /// A context that fires `timeout` from now. A timeout too large to
    /// represent as an instant means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Self::with_deadline(deadline),
            None => Self::background(),
        }
    }

    /// Mark this context and all of its clones as cancelled.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail fast if the context has fired. Explicit cancellation is
    /// reported ahead of deadline expiry.
    pub fn check(&self) -> Result<(), StoreError> {
        if self.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(StoreError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_context_never_fires() {
        let ctx = Context::background();
        assert!(ctx.check().is_ok());
        assert!(ctx.deadline().is_none());
    }

    #[test]
    fn cancel_is_visible_through_clones() {
        let ctx = Context::background();
        let clone = ctx.clone();

        ctx.cancel();

        assert!(clone.is_cancelled());
        assert!(matches!(clone.check(), Err(StoreError::Cancelled)));
    }

    #[test]
    fn expired_deadline_reports_deadline_exceeded() {
        let ctx = Context::with_timeout(Duration::ZERO);
        assert!(matches!(ctx.check(), Err(StoreError::DeadlineExceeded)));
    }

    #[test]
    fn future_deadline_passes_check() {
        let ctx = Context::with_timeout(Duration::from_secs(3600));
        assert!(ctx.check().is_ok());
    }

    #[test]
    fn unrepresentable_timeout_means_no_deadline() {
        let ctx = Context::with_timeout(Duration::from_secs(u64::MAX));
        assert!(ctx.deadline().is_none());
        assert!(ctx.check().is_ok());

        ctx.cancel();
        assert!(matches!(ctx.check(), Err(StoreError::Cancelled)));
    }

    #[test]
    fn cancellation_wins_over_expired_deadline() {
        let ctx = Context::with_timeout(Duration::ZERO);
        ctx.cancel();
        assert!(matches!(ctx.check(), Err(StoreError::Cancelled)));
    }
}
