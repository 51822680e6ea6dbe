use std::fmt;
use std::marker::PhantomData;

use bytes::BytesMut;
use futures_util::StreamExt;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::core::endpoint_url;
use crate::data::{ExecutorOptions, Method, Progress, Response, TargetType};
use crate::effects::{CancellationToken, Completion, Executor, ProgressExecutor, ProgressHandler};
use crate::error::{Error, Result};

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Head => reqwest::Method::HEAD,
        }
    }
}

/// Production executor performing real HTTP requests with `reqwest`.
///
/// Each request runs as a task on the tokio runtime that was current when
/// the executor was built. Download progress is reported once per received
/// body chunk, followed by a final completed update. Cancelling drops the
/// in-flight work and completes the request with [`Error::Cancelled`].
pub struct ReqwestExecutor<T> {
    client: reqwest::Client,
    handle: Handle,
    options: ExecutorOptions,
    _target: PhantomData<fn(&T)>,
}

impl<T> fmt::Debug for ReqwestExecutor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestExecutor")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<T: TargetType> ReqwestExecutor<T> {
    /// Create an executor with default options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRuntime`] outside a tokio runtime.
    pub fn new() -> Result<Self> {
        Self::with_options(ExecutorOptions::default())
    }

    pub fn with_options(options: ExecutorOptions) -> Result<Self> {
        let handle = Handle::try_current().map_err(|_| Error::NoRuntime)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = &options.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let client = builder.build().map_err(Error::Underlying)?;

        Ok(Self {
            client,
            handle,
            options,
            _target: PhantomData,
        })
    }

    fn build_request(&self, target: &T) -> Result<reqwest::RequestBuilder> {
        let url = endpoint_url(target.base_url(), &target.path())?;
        let mut request = self.client.request(target.method().into(), url);

        let query = target.query();
        if !query.is_empty() {
            request = request.query(&query);
        }
        let target_headers = target.headers();
        for (name, value) in self.options.headers.iter().chain(target_headers.iter()) {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = target.body() {
            request = request.body(body);
        }
        Ok(request)
    }

    fn spawn(
        &self,
        target: &T,
        mut on_progress: ProgressHandler,
        on_complete: Completion<Error>,
    ) -> CancellationToken {
        let method = target.method();
        let path = target.path();
        let request = self.build_request(target);
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();

        self.handle.spawn(async move {
            tracing::debug!(%method, %path, "starting request");
            let result = match request {
                Err(err) => Err(err),
                Ok(request) => tokio::select! {
                    Ok(()) = cancel_rx => Err(Error::Cancelled),
                    result = perform(request, &mut on_progress) => result,
                },
            };
            match &result {
                Ok(response) => {
                    tracing::debug!(%method, %path, status = response.status_code, "request finished")
                }
                Err(err) => tracing::debug!(%method, %path, error = %err, "request failed"),
            }
            on_complete(result);
        });

        CancellationToken::new(move || {
            let _ = cancel_tx.send(());
        })
    }
}

async fn perform(
    request: reqwest::RequestBuilder,
    on_progress: &mut ProgressHandler,
) -> Result<Response> {
    let response = request.send().await.map_err(Error::Underlying)?;

    let status_code = response.status().as_u16();
    let url = response.url().to_string();
    let headers: Vec<(String, String)> = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let total_bytes = response.content_length();

    let mut body = BytesMut::new();
    let mut chunks = response.bytes_stream();
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.map_err(Error::Underlying)?;
        body.extend_from_slice(&chunk);
        on_progress(Progress::new(body.len() as u64, total_bytes));
    }
    on_progress(Progress::finished(body.len() as u64));

    Ok(Response {
        status_code,
        data: body.freeze(),
        headers,
        url: Some(url),
    })
}

impl<T: TargetType> Executor<T> for ReqwestExecutor<T> {
    type Error = Error;

    fn execute(&self, target: &T, on_complete: Completion<Error>) -> CancellationToken {
        self.spawn(target, Box::new(|_| {}), on_complete)
    }
}

impl<T: TargetType> ProgressExecutor<T> for ReqwestExecutor<T> {
    fn execute_with_progress(
        &self,
        target: &T,
        on_progress: ProgressHandler,
        on_complete: Completion<Error>,
    ) -> CancellationToken {
        self.spawn(target, on_progress, on_complete)
    }
}
