//! Reactive request provider: callback-based executors exposed as cold
//! observables.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable responses, progress updates, targets and options
//! - [`core`] - Pure transformations (status filtering, body mapping, URLs)
//! - [`effects`] - Executors performing the actual requests, behind a trait
//!
//! [`RxProvider`] sits on top and turns each executor call into an
//! [`Observable`], or for progress-reporting requests into a
//! [`ProgressResponse`] pair of streams sharing one execution.
//!
//! # Key Features
//!
//! - **Cold**: nothing runs until subscription, and every subscription runs
//!   its own request
//! - **Cancellation**: ending a subscription cancels its request
//! - **Weak ownership**: observables do not keep a dropped provider alive
//! - **Composable**: observables convert into `futures_util::Stream`

pub mod core;
pub mod data;
pub mod effects;
mod error;
mod provider;

pub use crate::core::endpoint_url;
pub use data::{ExecutorOptions, Method, Progress, Response, TargetType};
pub use effects::{
    CancellationToken, Completion, Executor, ProgressExecutor, ProgressHandler, StubExecutor,
};
pub use error::{Error, Result};
pub use provider::{ProgressResponse, ResponseObservableExt, RxProvider};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestExecutor;

pub use rxfetch_stream::{
    Emitter, Event, Observable, ObservableStream, PublishSubject, Subscription, Teardown,
};
