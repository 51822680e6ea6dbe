//! Cold observables, broadcast subjects and a futures `Stream` adapter.
//!
//! # Architecture
//!
//! - [`Observable`] - cold, lazily started source; every `subscribe` runs its
//!   start function again
//! - [`Emitter`] - producer handle given to the start function
//! - [`Subscription`] - disposal guard; dropping it runs the teardown
//! - [`PublishSubject`] - hot broadcast channel shared by its subscribers
//! - [`ObservableStream`] - bridges an observable into `futures_util::Stream`
//!   so the usual `StreamExt` combinators apply
//!
//! The runtime never spawns threads. Events are delivered synchronously on
//! whichever thread the producer calls the emitter from.

mod event;
mod observable;
mod stream;
mod subject;
mod subscription;

pub use event::Event;
pub use observable::Observable;
pub use stream::ObservableStream;
pub use subject::PublishSubject;
pub use subscription::{Emitter, Subscription, Teardown};
