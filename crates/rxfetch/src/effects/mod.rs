//! Executors: the effectful edge that actually performs requests.
//!
//! The provider only talks to the [`Executor`] and [`ProgressExecutor`]
//! traits. Two implementations ship with the crate: [`StubExecutor`] for
//! canned responses and, with the `reqwest` feature, [`ReqwestExecutor`].

mod cancel;
mod executor;
#[cfg(feature = "reqwest")]
mod http;
mod stub;

pub use cancel::CancellationToken;
pub use executor::{Completion, Executor, ProgressExecutor, ProgressHandler};
#[cfg(feature = "reqwest")]
pub use http::ReqwestExecutor;
pub use stub::StubExecutor;
