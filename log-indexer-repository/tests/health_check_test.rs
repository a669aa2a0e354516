//! Cluster health check against a throwaway local HTTP responder.

use log_indexer_repository::{OpenSearchSink, SearchSink, SinkConfig, SinkError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve a single request with `status` and `body`, returning the raw request text.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();

        String::from_utf8_lossy(&request).into_owned()
    });

    (url, handle)
}

fn sink(url: &str) -> OpenSearchSink {
    OpenSearchSink::new(&SinkConfig::new(url, "admin", "wrong-password")).unwrap()
}

#[tokio::test]
async fn test_health_check_green_cluster() {
    let (url, server) =
        serve_once("200 OK", r#"{"cluster_name":"logs","status":"green"}"#).await;

    let healthy = sink(&url).health_check().await.unwrap();

    assert!(healthy);
    let request = server.await.unwrap();
    assert!(request.starts_with("GET /_cluster/health"));
}

#[tokio::test]
async fn test_health_check_red_cluster() {
    let (url, _server) = serve_once("200 OK", r#"{"cluster_name":"logs","status":"red"}"#).await;

    assert!(!sink(&url).health_check().await.unwrap());
}

#[tokio::test]
async fn test_health_check_unauthorized_is_an_error() {
    let body = r#"{"error":{"type":"security_exception","reason":"Unauthorized"},"status":401}"#;
    let (url, _server) = serve_once("401 Unauthorized", body).await;

    match sink(&url).health_check().await {
        Err(SinkError::RequestError { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("security_exception"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_health_check_forbidden_is_an_error() {
    let body = r#"{"error":{"type":"security_exception","reason":"no permissions for [cluster:monitor/health]"},"status":403}"#;
    let (url, _server) = serve_once("403 Forbidden", body).await;

    let result = sink(&url).health_check().await;

    assert!(matches!(result, Err(SinkError::RequestError { status: 403, .. })));
}
