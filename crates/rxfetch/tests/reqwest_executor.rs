//! End-to-end tests for `ReqwestExecutor` against a local HTTP responder.
//!
//! The responder is a bare `TcpListener` that answers each connection with a
//! canned HTTP/1.1 response chosen by request path, so no external server or
//! network access is needed.

#![cfg(feature = "reqwest")]

use std::time::Duration;

use futures_util::StreamExt;
use rxfetch::{
    Error, Executor, ExecutorOptions, Method, ReqwestExecutor, Response, ResponseObservableExt,
    RxProvider, TargetType,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const BODY: &str = "hello from the responder";

struct Api {
    base: String,
    path: &'static str,
}

impl TargetType for Api {
    fn base_url(&self) -> &str {
        &self.base
    }

    fn path(&self) -> String {
        self.path.to_string()
    }

    fn method(&self) -> Method {
        Method::Get
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![("X-Test".to_string(), "1".to_string())]
    }
}

/// Start the responder and return its base URL.
async fn serve() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&request);
                let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();

                let reply = match path.as_str() {
                    "/hello" => format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{BODY}",
                        BODY.len()
                    ),
                    "/slow" => {
                        tokio::time::sleep(Duration::from_secs(5)).await;
                        return;
                    }
                    _ => "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                        .to_string(),
                };
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}

fn provider() -> RxProvider<ReqwestExecutor<Api>> {
    let options = ExecutorOptions::default().timeout(Some(Duration::from_secs(5)));
    RxProvider::new(ReqwestExecutor::with_options(options).unwrap())
}

#[tokio::test]
async fn test_get_returns_body_and_headers() {
    let base = serve().await;
    let provider = provider();

    let response = provider
        .request(Api { base, path: "/hello" })
        .into_stream()
        .next()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.data, BODY.as_bytes());
    assert_eq!(response.header("content-type"), Some("text/plain"));
    assert!(response.url.unwrap().ends_with("/hello"));
}

#[tokio::test]
async fn test_progress_reports_download() {
    let base = serve().await;
    let provider = provider();
    let split = provider.request_with_progress(Api { base, path: "/hello" });

    let progress = split.progress.into_stream();
    let response = split.response.into_stream();
    let (updates, responses) = tokio::time::timeout(Duration::from_secs(5), async {
        tokio::join!(progress.collect::<Vec<_>>(), response.collect::<Vec<_>>())
    })
    .await
    .expect("request should finish");

    let last = updates.last().unwrap().as_ref().unwrap();
    assert!(last.is_completed());
    assert_eq!(last.completed_bytes, BODY.len() as u64);
    assert_eq!(responses.len(), 1);
    assert!(responses[0].is_ok());
}

#[tokio::test]
async fn test_not_found_filtered_into_error() {
    let base = serve().await;
    let provider = provider();

    let err = provider
        .request(Api { base, path: "/nope" })
        .filter_successful_status_codes()
        .into_stream()
        .next()
        .await
        .unwrap()
        .unwrap_err();

    assert!(matches!(err, Error::StatusCode(ref response) if response.status_code == 404));
}

#[tokio::test]
async fn test_cancel_completes_with_cancelled() {
    let base = serve().await;
    let provider = provider();
    let (tx, rx) = tokio::sync::oneshot::channel();

    let token = provider.executor().execute(
        &Api { base, path: "/slow" },
        Box::new(move |result: Result<Response, Error>| {
            let _ = tx.send(result);
        }),
    );
    tokio::time::sleep(Duration::from_millis(50)).await;
    token.cancel();

    let result = tokio::time::timeout(Duration::from_secs(2), rx)
        .await
        .expect("completion after cancel")
        .unwrap();
    assert!(matches!(result, Err(Error::Cancelled)));
}

#[tokio::test]
async fn test_dropping_response_closes_progress() {
    let base = serve().await;
    let provider = provider();
    let split = provider.request_with_progress(Api { base, path: "/slow" });

    let mut progress = split.progress.into_stream();
    let mut response = split.response.into_stream();
    // Subscribe to progress, then start the request.
    assert!(tokio::time::timeout(Duration::from_millis(10), progress.next()).await.is_err());
    assert!(tokio::time::timeout(Duration::from_millis(50), response.next()).await.is_err());
    drop(response);

    let end = tokio::time::timeout(Duration::from_secs(2), progress.next())
        .await
        .expect("progress should close after cancellation");
    assert!(end.is_none());
}

#[tokio::test]
async fn test_invalid_base_url_fails_request() {
    let provider = provider();

    let err = provider
        .request(Api { base: "localhost:1".to_string(), path: "/hello" })
        .into_stream()
        .next()
        .await
        .unwrap()
        .unwrap_err();

    assert!(matches!(err, Error::InvalidUrl(_)));
}
