use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

type CancelAction = Box<dyn FnOnce() + Send>;

struct TokenInner {
    cancelled: AtomicBool,
    action: Mutex<Option<CancelAction>>,
}

/// Handle returned by an executor when a request starts.
///
/// [`cancel`](CancellationToken::cancel) runs the executor's cancel action at
/// most once, no matter how many clones call it. Cancelling a request that
/// already finished is a no-op for the executor.
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<TokenInner>,
}

impl CancellationToken {
    pub fn new(on_cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            inner: Arc::new(TokenInner {
                cancelled: AtomicBool::new(false),
                action: Mutex::new(Some(Box::new(on_cancel))),
            }),
        }
    }

    /// A token for work that has nothing left to stop.
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    /// Request early termination. Idempotent.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        let action = self
            .inner
            .action
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(action) = action {
            action();
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
