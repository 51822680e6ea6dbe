//! Cold observables and their composition operators.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::event::Event;
use crate::stream::ObservableStream;
use crate::subscription::{lock, Emitter, Sink, Subscription, Teardown};

type StartFn<T, E> = dyn Fn(Emitter<T, E>) -> Teardown + Send + Sync;

/// A cold, lazily started source of `T` values that may fail with `E`.
///
/// Nothing happens until [`subscribe`](Observable::subscribe) is called, and
/// every subscription runs the start function again. Cloning an observable
/// clones the recipe, not a running execution.
///
/// # Examples
///
/// ```
/// use rxfetch_stream::{Event, Observable, Teardown};
///
/// let source = Observable::<u32, ()>::create(|emitter| {
///     emitter.emit_result(Ok(21));
///     Teardown::noop()
/// });
///
/// let doubled = source.map(|n| n * 2);
/// let _subscription = doubled.subscribe(|event| {
///     if let Event::Next(n) = event {
///         assert_eq!(n, 42);
///     }
/// });
/// ```
pub struct Observable<T, E> {
    start: Arc<StartFn<T, E>>,
}

impl<T, E> Clone for Observable<T, E> {
    fn clone(&self) -> Self {
        Self {
            start: Arc::clone(&self.start),
        }
    }
}

impl<T, E> fmt::Debug for Observable<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable").finish_non_exhaustive()
    }
}

impl<T, E> Observable<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Builds an observable from a start function.
    ///
    /// The start function receives an [`Emitter`] and returns the
    /// [`Teardown`] to run when the subscription ends.
    pub fn create<F>(start: F) -> Self
    where
        F: Fn(Emitter<T, E>) -> Teardown + Send + Sync + 'static,
    {
        Self {
            start: Arc::new(start),
        }
    }

    /// Emits `value` and completes.
    pub fn just(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::create(move |emitter| {
            emitter.emit_result(Ok(value.clone()));
            Teardown::noop()
        })
    }

    /// Fails immediately with `error`.
    pub fn fail(error: E) -> Self
    where
        E: Clone + Sync,
    {
        Self::create(move |emitter| {
            emitter.error(error.clone());
            Teardown::noop()
        })
    }

    /// Completes immediately without a value.
    pub fn empty() -> Self {
        Self::create(|emitter| {
            emitter.complete();
            Teardown::noop()
        })
    }

    /// Never emits anything.
    pub fn never() -> Self {
        Self::create(|_| Teardown::noop())
    }

    /// Starts a new execution and delivers its events to `observer`.
    pub fn subscribe<O>(&self, observer: O) -> Subscription
    where
        O: FnMut(Event<T, E>) + Send + 'static,
    {
        let sink = Sink::new(Box::new(observer));
        let teardown = (self.start)(Emitter::new(Arc::clone(&sink)));
        sink.install(teardown);
        Subscription::new(sink)
    }

    /// Converts into a `futures_util::Stream` of `Result<T, E>`.
    pub fn into_stream(self) -> ObservableStream<T, E> {
        ObservableStream::new(self)
    }

    /// Transforms each value.
    pub fn map<U, F>(self, f: F) -> Observable<U, E>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.lift(move |event, downstream: &Emitter<U, E>| match event {
            Event::Next(value) => downstream.next(f(value)),
            Event::Error(error) => downstream.error(error),
            Event::Completed => downstream.complete(),
        })
    }

    /// Transforms the error.
    pub fn map_err<G, F>(self, f: F) -> Observable<T, G>
    where
        G: Send + 'static,
        F: Fn(E) -> G + Send + Sync + 'static,
    {
        self.lift(move |event, downstream: &Emitter<T, G>| match event {
            Event::Next(value) => downstream.next(value),
            Event::Error(error) => downstream.error(f(error)),
            Event::Completed => downstream.complete(),
        })
    }

    /// Transforms each value with a fallible mapping. The first mapping
    /// failure terminates the subscription with that error.
    pub fn try_map<U, F>(self, f: F) -> Observable<U, E>
    where
        U: Send + 'static,
        F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
    {
        self.lift(move |event, downstream: &Emitter<U, E>| match event {
            Event::Next(value) => match f(value) {
                Ok(mapped) => downstream.next(mapped),
                Err(error) => downstream.error(error),
            },
            Event::Error(error) => downstream.error(error),
            Event::Completed => downstream.complete(),
        })
    }

    /// Resubscribes to the source when it fails, at most `max_retries` times.
    ///
    /// Values emitted by failed attempts are forwarded as they arrive.
    pub fn retry(self, max_retries: usize) -> Self {
        Observable::create(move |downstream| {
            let state = Arc::new(Mutex::new(RetryState {
                attempt: 0,
                subscribing: false,
                retry_pending: false,
                current: None,
            }));
            run_attempts(&self, &downstream, &state, max_retries);
            Teardown::new(move || {
                let current = lock(&state).current.take();
                drop(current);
            })
        })
    }

    fn lift<U, G, F>(self, forward: F) -> Observable<U, G>
    where
        U: Send + 'static,
        G: Send + 'static,
        F: Fn(Event<T, E>, &Emitter<U, G>) + Send + Sync + 'static,
    {
        let forward = Arc::new(forward);
        Observable::create(move |downstream| {
            let forward = Arc::clone(&forward);
            let upstream = self.subscribe(move |event| forward(event, &downstream));
            Teardown::new(move || drop(upstream))
        })
    }
}

struct RetryState {
    attempt: usize,
    // Set while `source.subscribe` runs, so a synchronous failure is handed
    // back to the loop in `run_attempts` instead of recursing.
    subscribing: bool,
    retry_pending: bool,
    current: Option<Subscription>,
}

fn run_attempts<T, E>(
    source: &Observable<T, E>,
    downstream: &Emitter<T, E>,
    state: &Arc<Mutex<RetryState>>,
    max_retries: usize,
) where
    T: Send + 'static,
    E: Send + 'static,
{
    loop {
        if downstream.is_stopped() {
            return;
        }
        let attempt = {
            let mut state = lock(state);
            state.subscribing = true;
            state.retry_pending = false;
            state.attempt
        };

        let observer = {
            let source = source.clone();
            let downstream = downstream.clone();
            let state = Arc::clone(state);
            move |event| match event {
                Event::Error(error) => {
                    let mut guard = lock(&state);
                    if guard.attempt != attempt {
                        return;
                    }
                    if guard.attempt >= max_retries || downstream.is_stopped() {
                        drop(guard);
                        downstream.error(error);
                        return;
                    }
                    guard.attempt += 1;
                    if guard.subscribing {
                        guard.retry_pending = true;
                        return;
                    }
                    drop(guard);
                    tracing::debug!(attempt = attempt + 1, max_retries, "resubscribing after failure");
                    run_attempts(&source, &downstream, &state, max_retries);
                }
                other => downstream.emit(other),
            }
        };
        let subscription = source.subscribe(observer);

        let (retry_now, finished) = {
            let mut state = lock(state);
            state.subscribing = false;
            if state.retry_pending {
                state.retry_pending = false;
                (true, Some(subscription))
            } else {
                (false, state.current.replace(subscription))
            }
        };
        drop(finished);
        if !retry_now {
            return;
        }
        tracing::debug!(attempt = attempt + 1, max_retries, "resubscribing after failure");
    }
}
