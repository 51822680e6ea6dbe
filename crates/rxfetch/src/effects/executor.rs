use crate::data::{Progress, Response};
use crate::effects::CancellationToken;

/// Completion handler. Being `FnOnce`, it can only ever be invoked once.
pub type Completion<E> = Box<dyn FnOnce(Result<Response, E>) + Send>;

/// Progress handler, invoked in delivery order before the completion.
pub type ProgressHandler = Box<dyn FnMut(Progress) + Send>;

/// Callback-based request engine for targets of type `T`.
///
/// Implementations may invoke the completion synchronously inside
/// [`execute`](Executor::execute) or later from any thread. Apart from
/// cancellation, every call must eventually invoke the completion exactly
/// once.
///
/// # Implementations
///
/// - [`StubExecutor`](crate::StubExecutor): canned responses
/// - `ReqwestExecutor`: real HTTP (feature `reqwest`)
pub trait Executor<T>: Send + Sync + 'static {
    /// Error type passed to the completion handler.
    type Error: Send + 'static;

    /// Start a request for `target` and return its cancellation handle.
    fn execute(&self, target: &T, on_complete: Completion<Self::Error>) -> CancellationToken;
}

/// An [`Executor`] that can also report incremental progress.
pub trait ProgressExecutor<T>: Executor<T> {
    /// Start a request for `target`, reporting progress to `on_progress`
    /// before invoking `on_complete`.
    fn execute_with_progress(
        &self,
        target: &T,
        on_progress: ProgressHandler,
        on_complete: Completion<Self::Error>,
    ) -> CancellationToken;
}
