//! Reactive provider: bridges callback executors into cold observables.
//!
//! # Design
//!
//! [`RxProvider::request`] wraps one executor call per subscription. The
//! observable only keeps a weak reference to the executor, so a provider
//! that has been dropped makes later subscriptions silent instead of
//! keeping the executor alive.
//!
//! [`RxProvider::request_with_progress`] splits one execution into a hot
//! progress subject, created per call, and a cold response observable that
//! drives the execution. Request errors only travel on the response side;
//! the progress side always ends with a plain completion.

use std::convert::Infallible;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use rxfetch_stream::{Observable, PublishSubject, Teardown};
use serde::de::DeserializeOwned;

use crate::data::{Progress, Response};
use crate::effects::{Executor, ProgressExecutor};
use crate::error::Error;

/// Provider returning observables instead of taking completion callbacks.
///
/// # Examples
///
/// ```
/// use rxfetch::{Event, Response, RxProvider, StubExecutor};
///
/// let provider = RxProvider::new(StubExecutor::<&str, String>::new(|_| {
///     Ok(Response::new(200, "pong"))
/// }));
///
/// let subscription = provider.request("/ping").subscribe(|event| {
///     if let Event::Next(response) = event {
///         assert_eq!(response.status_code, 200);
///     }
/// });
/// assert!(subscription.is_closed());
/// ```
pub struct RxProvider<X> {
    executor: Arc<X>,
}

impl<X> Clone for RxProvider<X> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
        }
    }
}

impl<X> fmt::Debug for RxProvider<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RxProvider")
            .field("executors", &Arc::strong_count(&self.executor))
            .finish_non_exhaustive()
    }
}

impl<X> RxProvider<X>
where
    X: Send + Sync + 'static,
{
    pub fn new(executor: X) -> Self {
        Self {
            executor: Arc::new(executor),
        }
    }

    /// The underlying executor, for callers that still want callbacks.
    pub fn executor(&self) -> &X {
        &self.executor
    }

    /// A cold observable of the response for `target`.
    ///
    /// Every subscription starts a fresh execution. Success yields the
    /// response then completion; failure yields the executor's error
    /// verbatim. Ending the subscription for any reason cancels that
    /// execution's token.
    pub fn request<T>(&self, target: T) -> Observable<Response, <X as Executor<T>>::Error>
    where
        X: Executor<T>,
        T: Send + Sync + 'static,
    {
        let owner = Arc::downgrade(&self.executor);
        Observable::create(move |emitter| {
            let Some(executor) = owner.upgrade() else {
                tracing::debug!("provider released before subscription; request skipped");
                return Teardown::noop();
            };

            tracing::trace!("subscribed; starting request");
            let token = executor.execute(&target, Box::new(move |result| emitter.emit_result(result)));
            Teardown::new(move || {
                tracing::trace!("request subscription ended; cancelling");
                token.cancel();
            })
        })
    }

    /// Split a progress-reporting request into a progress stream and a
    /// response stream sharing one execution.
    ///
    /// The progress subject is live as soon as this returns. The execution
    /// itself starts when `response` is subscribed, so subscribe to
    /// `progress` first to see every update.
    pub fn request_with_progress<T>(
        &self,
        target: T,
    ) -> ProgressResponse<<X as Executor<T>>::Error>
    where
        X: ProgressExecutor<T>,
        T: Send + Sync + 'static,
    {
        let subject = PublishSubject::<Progress, Infallible>::new();
        let progress = subject.observable();
        let response = split_response(Arc::downgrade(&self.executor), target, subject);
        ProgressResponse { progress, response }
    }
}

fn split_response<X, T>(
    owner: Weak<X>,
    target: T,
    subject: PublishSubject<Progress, Infallible>,
) -> Observable<Response, <X as Executor<T>>::Error>
where
    X: ProgressExecutor<T>,
    T: Send + Sync + 'static,
{
    Observable::create(move |emitter| {
        let Some(executor) = owner.upgrade() else {
            tracing::debug!("provider released before subscription; request skipped");
            return Teardown::noop();
        };

        let halted = Arc::new(AtomicBool::new(false));
        let on_progress = {
            let subject = subject.clone();
            let halted = Arc::clone(&halted);
            Box::new(move |progress: Progress| {
                if halted.load(Ordering::Acquire) {
                    return;
                }
                let completed = progress.is_completed();
                subject.next(progress);
                if completed {
                    subject.complete();
                }
            })
        };
        let on_complete = {
            let subject = subject.clone();
            Box::new(move |result| {
                emitter.emit_result(result);
                subject.complete();
            })
        };

        tracing::trace!("subscribed; starting request with progress");
        let token = executor.execute_with_progress(&target, on_progress, on_complete);
        Teardown::new(move || {
            tracing::trace!("progress request subscription ended; cancelling");
            halted.store(true, Ordering::Release);
            token.cancel();
        })
    })
}

/// The two halves of a progress-reporting request.
pub struct ProgressResponse<E> {
    /// Hot stream of progress updates. Completes when an update is marked
    /// completed or when the response terminates; never fails.
    pub progress: Observable<Progress, Infallible>,

    /// Cold stream driving the execution. Emits the response once, or fails.
    pub response: Observable<Response, E>,
}

impl<E> Clone for ProgressResponse<E> {
    fn clone(&self) -> Self {
        Self {
            progress: self.progress.clone(),
            response: self.response.clone(),
        }
    }
}

impl<E> fmt::Debug for ProgressResponse<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressResponse").finish_non_exhaustive()
    }
}

/// Response mapping operators for response observables.
///
/// Mapping failures surface as the observable's error through
/// `E: From<Error>`.
pub trait ResponseObservableExt<E> {
    fn filter_status_codes(self, range: RangeInclusive<u16>) -> Observable<Response, E>;

    /// Fails with [`Error::StatusCode`] unless the status is 2xx.
    fn filter_successful_status_codes(self) -> Observable<Response, E>;

    /// Fails with [`Error::StatusCode`] unless the status is 2xx or 3xx.
    fn filter_successful_status_and_redirect_codes(self) -> Observable<Response, E>;

    fn map_json<D>(self) -> Observable<D, E>
    where
        D: DeserializeOwned + Send + 'static;

    fn map_string(self) -> Observable<String, E>;
}

impl<E> ResponseObservableExt<E> for Observable<Response, E>
where
    E: From<Error> + Send + 'static,
{
    fn filter_status_codes(self, range: RangeInclusive<u16>) -> Observable<Response, E> {
        self.try_map(move |response| response.filter_status_codes(range.clone()).map_err(E::from))
    }

    fn filter_successful_status_codes(self) -> Observable<Response, E> {
        self.try_map(|response| response.filter_successful_status_codes().map_err(E::from))
    }

    fn filter_successful_status_and_redirect_codes(self) -> Observable<Response, E> {
        self.try_map(|response| {
            response
                .filter_successful_status_and_redirect_codes()
                .map_err(E::from)
        })
    }

    fn map_json<D>(self) -> Observable<D, E>
    where
        D: DeserializeOwned + Send + 'static,
    {
        self.try_map(|response| response.map_json().map_err(E::from))
    }

    fn map_string(self) -> Observable<String, E> {
        self.try_map(|response| response.map_string().map_err(E::from))
    }
}
