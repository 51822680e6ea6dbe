//! `futures_util::Stream` adapter for observables.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use futures_util::stream::FusedStream;
use tokio::sync::mpsc;

use crate::event::Event;
use crate::observable::Observable;
use crate::subscription::Subscription;

/// An observable viewed as a `Stream<Item = Result<T, E>>`.
///
/// The source is subscribed on the first poll. The stream ends after the
/// source completes, or right after yielding the source's error. Dropping the
/// stream disposes the subscription.
///
/// A source that never signals leaves the stream pending; the stream never
/// invents an end of its own.
pub struct ObservableStream<T, E> {
    source: Option<Observable<T, E>>,
    subscription: Option<Subscription>,
    receiver: mpsc::UnboundedReceiver<Event<T, E>>,
    // Held so the channel stays open after the source drops its emitter.
    sender: mpsc::UnboundedSender<Event<T, E>>,
    finished: bool,
}

impl<T, E> ObservableStream<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub(crate) fn new(source: Observable<T, E>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            source: Some(source),
            subscription: None,
            receiver,
            sender,
            finished: false,
        }
    }

    /// Returns `true` once the source has been subscribed.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.source.is_none()
    }

    fn finish(&mut self) {
        self.finished = true;
        self.subscription.take();
    }
}

impl<T, E> Stream for ObservableStream<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    type Item = Result<T, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }

        if let Some(source) = this.source.take() {
            let sender = this.sender.clone();
            this.subscription = Some(source.subscribe(move |event| {
                let _ = sender.send(event);
            }));
        }

        match this.receiver.poll_recv(cx) {
            Poll::Ready(Some(Event::Next(value))) => Poll::Ready(Some(Ok(value))),
            Poll::Ready(Some(Event::Error(error))) => {
                this.finish();
                Poll::Ready(Some(Err(error)))
            }
            Poll::Ready(Some(Event::Completed)) | Poll::Ready(None) => {
                this.finish();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T, E> FusedStream for ObservableStream<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn is_terminated(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use futures_util::StreamExt;

    use crate::{Emitter, Teardown};

    use super::*;

    #[tokio::test]
    async fn test_value_then_end() {
        let items: Vec<Result<u8, ()>> = Observable::just(9).into_stream().collect().await;
        assert_eq!(items, vec![Ok(9)]);
    }

    #[tokio::test]
    async fn test_error_ends_stream() {
        let mut stream = Observable::<u8, &'static str>::fail("boom").into_stream();
        assert_eq!(stream.next().await, Some(Err("boom")));
        assert_eq!(stream.next().await, None);
        assert!(stream.is_terminated());
    }

    #[tokio::test]
    async fn test_subscribes_lazily() {
        let starts = Arc::new(AtomicUsize::new(0));
        let source = {
            let starts = Arc::clone(&starts);
            Observable::<u8, ()>::create(move |emitter| {
                starts.fetch_add(1, Ordering::SeqCst);
                emitter.emit_result(Ok(1));
                Teardown::noop()
            })
        };

        let mut stream = source.into_stream();
        assert!(!stream.is_started());
        assert_eq!(starts.load(Ordering::SeqCst), 0);

        assert_eq!(stream.next().await, Some(Ok(1)));
        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_silent_source_stays_pending() {
        // The emitter is dropped without signalling anything.
        let source = Observable::<u8, ()>::create(|emitter: Emitter<u8, ()>| {
            drop(emitter);
            Teardown::noop()
        });
        let mut stream = source.into_stream();
        let outcome = tokio::time::timeout(Duration::from_millis(50), stream.next()).await;
        assert!(outcome.is_err(), "stream should still be pending");
    }

    #[tokio::test]
    async fn test_drop_disposes_subscription() {
        let torn_down = Arc::new(AtomicUsize::new(0));
        let source = {
            let torn_down = Arc::clone(&torn_down);
            Observable::<u8, ()>::create(move |_| {
                let torn_down = Arc::clone(&torn_down);
                Teardown::new(move || {
                    torn_down.fetch_add(1, Ordering::SeqCst);
                })
            })
        };

        let mut stream = source.into_stream();
        let _ = tokio::time::timeout(Duration::from_millis(10), stream.next()).await;
        assert_eq!(torn_down.load(Ordering::SeqCst), 0);
        drop(stream);
        assert_eq!(torn_down.load(Ordering::SeqCst), 1);
    }
}
