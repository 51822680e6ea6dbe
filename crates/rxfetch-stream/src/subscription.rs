//! Subscription lifecycle: emitters, teardown actions and disposal.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::event::Event;

pub(crate) type BoxObserver<T, E> = Box<dyn FnMut(Event<T, E>) + Send>;

/// Locks a mutex, recovering the guard if a panicking observer poisoned it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cleanup action returned by an observable's start function.
///
/// Runs exactly once: after a terminal event, on disposal, or immediately on
/// installation if the subscription already stopped while starting.
#[must_use = "a Teardown only runs once handed back to the subscription"]
pub struct Teardown(Option<Box<dyn FnOnce() + Send>>);

impl Teardown {
    /// Wraps a cleanup closure.
    pub fn new(action: impl FnOnce() + Send + 'static) -> Self {
        Self(Some(Box::new(action)))
    }

    /// A teardown with nothing to clean up.
    pub fn noop() -> Self {
        Self(None)
    }

    pub(crate) fn run(self) {
        if let Some(action) = self.0 {
            action();
        }
    }
}

impl Default for Teardown {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Teardown")
            .field(&self.0.as_ref().map(|_| "{ ... }"))
            .finish()
    }
}

struct State {
    stopped: bool,
    teardown: Option<Teardown>,
}

/// Per-subscription delivery point shared by the emitter and the subscription.
///
/// The observer sits behind its own lock so an observer may dispose its own
/// subscription from inside a callback without deadlocking.
pub(crate) struct Sink<T, E> {
    observer: Mutex<Option<BoxObserver<T, E>>>,
    state: Mutex<State>,
}

impl<T, E> Sink<T, E> {
    pub(crate) fn new(observer: BoxObserver<T, E>) -> Arc<Self> {
        Arc::new(Self {
            observer: Mutex::new(Some(observer)),
            state: Mutex::new(State {
                stopped: false,
                teardown: None,
            }),
        })
    }

    fn deliver(&self, event: Event<T, E>) {
        let terminal = event.is_terminal();
        let teardown = {
            let mut state = lock(&self.state);
            if state.stopped {
                return;
            }
            if terminal {
                state.stopped = true;
                state.teardown.take()
            } else {
                None
            }
        };

        {
            let mut observer = lock(&self.observer);
            if let Some(on_event) = observer.as_mut() {
                on_event(event);
            }
            if terminal || lock(&self.state).stopped {
                observer.take();
            }
        }

        if let Some(teardown) = teardown {
            teardown.run();
        }
    }

    pub(crate) fn install(&self, teardown: Teardown) {
        let mut state = lock(&self.state);
        if state.stopped {
            drop(state);
            teardown.run();
        } else {
            state.teardown = Some(teardown);
        }
    }

    fn is_stopped(&self) -> bool {
        lock(&self.state).stopped
    }

    fn stop(&self) {
        let teardown = {
            let mut state = lock(&self.state);
            state.stopped = true;
            state.teardown.take()
        };
        // A busy observer lock means we are inside a callback; `deliver`
        // drops the observer once the callback returns.
        if let Ok(mut observer) = self.observer.try_lock() {
            observer.take();
        }
        if let Some(teardown) = teardown {
            teardown.run();
        }
    }
}

/// Producer handle passed to an observable's start function.
///
/// Emitting after a terminal event, or after the subscriber disposed, is a
/// silent no-op.
pub struct Emitter<T, E> {
    sink: Arc<Sink<T, E>>,
}

impl<T, E> Clone for Emitter<T, E> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<T, E> fmt::Debug for Emitter<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

impl<T, E> Emitter<T, E> {
    pub(crate) fn new(sink: Arc<Sink<T, E>>) -> Self {
        Self { sink }
    }

    /// Delivers a value.
    pub fn next(&self, value: T) {
        self.sink.deliver(Event::Next(value));
    }

    /// Fails the subscription and runs its teardown.
    pub fn error(&self, error: E) {
        self.sink.deliver(Event::Error(error));
    }

    /// Completes the subscription and runs its teardown.
    pub fn complete(&self) {
        self.sink.deliver(Event::Completed);
    }

    /// Delivers an arbitrary event.
    pub fn emit(&self, event: Event<T, E>) {
        self.sink.deliver(event);
    }

    /// Single-shot delivery: a success becomes one value followed by
    /// completion, a failure becomes an error with no value.
    pub fn emit_result(&self, result: Result<T, E>) {
        match result {
            Ok(value) => {
                self.next(value);
                self.complete();
            }
            Err(error) => self.error(error),
        }
    }

    /// Returns `true` once a terminal event was delivered or the subscriber
    /// disposed.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.sink.is_stopped()
    }
}

trait Dispose: Send + Sync {
    fn dispose(&self);
    fn is_closed(&self) -> bool;
}

impl<T, E> Dispose for Sink<T, E> {
    fn dispose(&self) {
        self.stop();
    }

    fn is_closed(&self) -> bool {
        self.is_stopped()
    }
}

/// Handle to an active subscription.
///
/// Dropping the handle disposes the subscription, which runs its teardown.
/// Use [`Subscription::detach`] to let it run to completion unattended.
#[must_use = "dropping a Subscription disposes it immediately"]
pub struct Subscription {
    handle: Option<Arc<dyn Dispose>>,
}

impl Subscription {
    pub(crate) fn new<T, E>(sink: Arc<Sink<T, E>>) -> Self
    where
        T: 'static,
        E: 'static,
    {
        Self {
            handle: Some(sink),
        }
    }

    /// Stops delivery and runs the teardown. Idempotent.
    pub fn dispose(&self) {
        if let Some(handle) = &self.handle {
            handle.dispose();
        }
    }

    /// Returns `true` once no further events will be delivered.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.handle.as_ref().is_none_or(|handle| handle.is_closed())
    }

    /// Releases the handle without disposing. The subscription keeps running
    /// until the source terminates.
    pub fn detach(mut self) {
        self.handle.take();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.dispose();
        }
    }
}
