//! Hot broadcast subject.

use std::fmt;
use std::mem;
use std::sync::{Arc, Mutex};

use crate::observable::Observable;
use crate::subscription::{lock, Emitter, Teardown};

#[derive(Clone)]
enum Terminal<E> {
    Completed,
    Error(E),
}

struct SubjectState<T, E> {
    next_id: u64,
    observers: Vec<(u64, Emitter<T, E>)>,
    terminal: Option<Terminal<E>>,
}

/// A hot channel that fans each event out to every current subscriber.
///
/// The subject is live from construction: values pushed while nobody is
/// subscribed are dropped. The first terminal event wins and later ones are
/// ignored, so closing twice is harmless. Subscribing after termination
/// yields only the terminal event.
pub struct PublishSubject<T, E> {
    inner: Arc<Mutex<SubjectState<T, E>>>,
}

impl<T, E> Clone for PublishSubject<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> fmt::Debug for PublishSubject<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.inner);
        f.debug_struct("PublishSubject")
            .field("observers", &state.observers.len())
            .field("terminated", &state.terminal.is_some())
            .finish()
    }
}

impl<T, E> Default for PublishSubject<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> PublishSubject<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SubjectState {
                next_id: 0,
                observers: Vec::new(),
                terminal: None,
            })),
        }
    }

    /// Broadcasts a value to the current subscribers.
    pub fn next(&self, value: T) {
        let observers: Vec<Emitter<T, E>> = {
            let state = lock(&self.inner);
            if state.terminal.is_some() {
                return;
            }
            state.observers.iter().map(|(_, emitter)| emitter.clone()).collect()
        };
        for emitter in observers {
            emitter.next(value.clone());
        }
    }

    /// Completes the subject. Returns `false` if it was already terminated.
    pub fn complete(&self) -> bool {
        self.terminate(Terminal::Completed)
    }

    /// Fails the subject. Returns `false` if it was already terminated.
    pub fn error(&self, error: E) -> bool {
        self.terminate(Terminal::Error(error))
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        lock(&self.inner).terminal.is_some()
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        lock(&self.inner).observers.len()
    }

    /// The subject as an observable. Each subscription registers one more
    /// receiver; disposing it removes only that receiver.
    pub fn observable(&self) -> Observable<T, E> {
        let inner = Arc::clone(&self.inner);
        Observable::create(move |emitter| {
            let mut state = lock(&inner);
            if let Some(terminal) = state.terminal.clone() {
                drop(state);
                match terminal {
                    Terminal::Completed => emitter.complete(),
                    Terminal::Error(error) => emitter.error(error),
                }
                return Teardown::noop();
            }

            let id = state.next_id;
            state.next_id += 1;
            state.observers.push((id, emitter));

            let weak = Arc::downgrade(&inner);
            Teardown::new(move || {
                if let Some(inner) = weak.upgrade() {
                    lock(&inner).observers.retain(|(observer_id, _)| *observer_id != id);
                }
            })
        })
    }

    fn terminate(&self, terminal: Terminal<E>) -> bool {
        let observers = {
            let mut state = lock(&self.inner);
            if state.terminal.is_some() {
                return false;
            }
            state.terminal = Some(terminal.clone());
            mem::take(&mut state.observers)
        };
        for (_, emitter) in observers {
            match &terminal {
                Terminal::Completed => emitter.complete(),
                Terminal::Error(error) => emitter.error(error.clone()),
            }
        }
        true
    }
}
