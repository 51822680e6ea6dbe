use std::fmt;

use bytes::Bytes;

/// HTTP method of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Patch => write!(f, "PATCH"),
            Method::Delete => write!(f, "DELETE"),
            Method::Head => write!(f, "HEAD"),
        }
    }
}

/// Description of one request, as understood by the HTTP executor.
///
/// The provider itself treats targets as opaque; only executors that build
/// real requests need this trait.
pub trait TargetType: Send + Sync + 'static {
    /// Scheme, host and optional path prefix, e.g. `https://api.example.com/v1`.
    fn base_url(&self) -> &str;

    /// Path appended to [`base_url`](TargetType::base_url).
    fn path(&self) -> String;

    fn method(&self) -> Method {
        Method::Get
    }

    /// Query parameters, appended in order.
    fn query(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Headers specific to this target. Sent after the executor defaults.
    fn headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn body(&self) -> Option<Bytes> {
        None
    }
}
