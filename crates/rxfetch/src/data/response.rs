use bytes::Bytes;

/// A completed HTTP exchange.
///
/// Produced by an executor and forwarded unmodified by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code.
    pub status_code: u16,

    /// Raw response body.
    pub data: Bytes,

    /// Response headers in the order the server sent them.
    pub headers: Vec<(String, String)>,

    /// Final URL of the exchange, after redirects, when known.
    pub url: Option<String>,
}

impl Response {
    pub fn new(status_code: u16, data: impl Into<Bytes>) -> Self {
        Self {
            status_code,
            data: data.into(),
            headers: Vec::new(),
            url: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` for 2xx status codes.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}
