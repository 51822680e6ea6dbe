use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::data::{Progress, Response};
use crate::effects::{CancellationToken, Completion, Executor, ProgressExecutor, ProgressHandler};

type Sample<T, E> = dyn Fn(&T) -> Result<Response, E> + Send + Sync;

/// Executor that answers every target from a closure instead of the network.
///
/// By default the completion runs synchronously inside `execute`. With
/// [`delayed`](StubExecutor::delayed) it runs later on the current tokio
/// runtime, and cancelling before then suppresses it entirely.
///
/// # Examples
///
/// ```
/// use rxfetch::{Response, StubExecutor};
///
/// let executor = StubExecutor::<&str, String>::new(|path| match *path {
///     "/health" => Ok(Response::new(200, "ok")),
///     other => Err(format!("no stub for {other}")),
/// })
/// .progress_steps(2);
/// ```
pub struct StubExecutor<T, E> {
    sample: Arc<Sample<T, E>>,
    delay: Option<Duration>,
    progress_steps: u64,
    calls: Arc<AtomicUsize>,
}

impl<T, E> Clone for StubExecutor<T, E> {
    fn clone(&self) -> Self {
        Self {
            sample: Arc::clone(&self.sample),
            delay: self.delay,
            progress_steps: self.progress_steps,
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<T, E> fmt::Debug for StubExecutor<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StubExecutor")
            .field("delay", &self.delay)
            .field("progress_steps", &self.progress_steps)
            .field("calls", &self.calls.load(Ordering::SeqCst))
            .finish()
    }
}

impl<T, E> StubExecutor<T, E>
where
    T: 'static,
    E: Send + 'static,
{
    pub fn new(sample: impl Fn(&T) -> Result<Response, E> + Send + Sync + 'static) -> Self {
        Self {
            sample: Arc::new(sample),
            delay: None,
            progress_steps: 0,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Deliver responses after `delay` instead of synchronously.
    #[must_use]
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Report `steps` evenly spaced progress updates before a successful
    /// completion. The last update is marked completed.
    #[must_use]
    pub fn progress_steps(mut self, steps: u64) -> Self {
        self.progress_steps = steps;
        self
    }

    /// Number of requests started so far, shared across clones.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn run(
        &self,
        target: &T,
        on_progress: Option<ProgressHandler>,
        on_complete: Completion<E>,
    ) -> CancellationToken {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let result = (self.sample)(target);
        let updates = progress_updates(&result, self.progress_steps);

        let Some(delay) = self.delay else {
            tracing::trace!(call, "delivering stubbed response");
            deliver(updates, on_progress, result, on_complete);
            return CancellationToken::noop();
        };

        let Ok(handle) = Handle::try_current() else {
            tracing::warn!(call, "no tokio runtime for delayed stub; delivering immediately");
            deliver(updates, on_progress, result, on_complete);
            return CancellationToken::noop();
        };

        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        handle.spawn(async move {
            let mut on_progress = on_progress;
            let pause = delay / (updates.len() as u32 + 1);
            let delivery = async move {
                for update in updates {
                    tokio::time::sleep(pause).await;
                    if let Some(handler) = on_progress.as_mut() {
                        handler(update);
                    }
                }
                tokio::time::sleep(pause).await;
                on_complete(result);
            };
            tokio::select! {
                Ok(()) = cancel_rx => tracing::debug!(call, "stubbed request cancelled"),
                () = delivery => tracing::trace!(call, "delivered delayed stubbed response"),
            }
        });

        CancellationToken::new(move || {
            let _ = cancel_tx.send(());
        })
    }
}

fn progress_updates<E>(result: &Result<Response, E>, steps: u64) -> Vec<Progress> {
    let Ok(response) = result else {
        return Vec::new();
    };
    let total = response.data.len() as u64;
    (1..=steps)
        .map(|step| {
            if step == steps {
                Progress::finished(total)
            } else {
                Progress::new(total * step / steps, Some(total))
            }
        })
        .collect()
}

fn deliver<E>(
    updates: Vec<Progress>,
    mut on_progress: Option<ProgressHandler>,
    result: Result<Response, E>,
    on_complete: Completion<E>,
) {
    if let Some(handler) = on_progress.as_mut() {
        for update in updates {
            handler(update);
        }
    }
    on_complete(result);
}

impl<T, E> Executor<T> for StubExecutor<T, E>
where
    T: Send + Sync + 'static,
    E: Send + 'static,
{
    type Error = E;

    fn execute(&self, target: &T, on_complete: Completion<E>) -> CancellationToken {
        self.run(target, None, on_complete)
    }
}

impl<T, E> ProgressExecutor<T> for StubExecutor<T, E>
where
    T: Send + Sync + 'static,
    E: Send + 'static,
{
    fn execute_with_progress(
        &self,
        target: &T,
        on_progress: ProgressHandler,
        on_complete: Completion<E>,
    ) -> CancellationToken {
        self.run(target, Some(on_progress), on_complete)
    }
}
