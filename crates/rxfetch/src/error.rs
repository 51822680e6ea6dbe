//! Error types for rxfetch.
//!
//! The provider passes executor errors through untouched; these variants are
//! produced by the bundled executors and by response mapping.

use thiserror::Error;

use crate::data::Response;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("status code {} is outside the accepted range", .0.status_code)]
    StatusCode(Response),

    #[error("failed to map response data to JSON: {source}")]
    JsonMapping {
        #[source]
        source: serde_json::Error,
        response: Response,
    },

    #[error("response data is not valid UTF-8")]
    StringMapping(Response),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("no tokio runtime available to drive requests")]
    NoRuntime,

    #[cfg(feature = "reqwest")]
    #[error("transport error: {0}")]
    Underlying(#[source] reqwest::Error),
}

impl Error {
    /// The response that caused a mapping failure, if any.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::StatusCode(response)
            | Error::StringMapping(response)
            | Error::JsonMapping { response, .. } => Some(response),
            _ => None,
        }
    }
}
