use std::sync::Arc;
use std::time::Duration;

/// Configuration for the HTTP executor.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use rxfetch::ExecutorOptions;
///
/// let options = ExecutorOptions::default()
///     .timeout(Some(Duration::from_secs(10)))
///     .user_agent("my-app/1.0")
///     .header("Authorization", "Bearer token");
/// ```
#[derive(Debug, Clone)]
pub struct ExecutorOptions {
    /// Whole-request timeout, from connect until the body is read.
    ///
    /// Default: 30 seconds
    pub timeout: Option<Duration>,

    /// Headers sent with every request, before target-specific headers.
    ///
    /// Default: empty
    pub headers: Arc<[(String, String)]>,

    /// `User-Agent` header value.
    ///
    /// Default: `rxfetch/<version>`
    pub user_agent: Option<String>,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            headers: Arc::new([]),
            user_agent: Some(concat!("rxfetch/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

impl ExecutorOptions {
    /// Set the request timeout. `None` disables it.
    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add a default header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut headers = self.headers.to_vec();
        headers.push((name.into(), value.into()));
        self.headers = headers.into();
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}
