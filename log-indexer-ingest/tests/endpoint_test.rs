//! Endpoint source against a throwaway local HTTP responder.

use log_indexer_ingest::{EndpointConfig, EndpointSource, IngestError, Source};
use log_indexer_shared::RawItem;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve a single request with `status` and `body`, returning the raw request text.
async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/v2/transactions/pending", listener.local_addr().unwrap());

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

#[tokio::test]
async fn test_fetch_sends_token_and_extracts_collection() {
    let body = json!({
        "top-transactions": [
            { "sig": "s1", "txn": { "fee": 1000, "type": "pay" } },
            { "sig": "s2", "txn": { "fee": 2000, "type": "axfer" } }
        ],
        "total-transactions": 2
    });
    let (url, server) = serve_once("200 OK", body.to_string()).await;

    let source = Source::from(
        EndpointSource::new(EndpointConfig::new(url).with_header("X-Algo-API-Token", "test-token"))
            .unwrap(),
    );
    let items = source.fetch_all().await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(
        items[0],
        RawItem::Json(json!({ "sig": "s1", "txn": { "fee": 1000, "type": "pay" } }))
    );

    let request = server.await.unwrap().to_lowercase();
    assert!(request.starts_with("get /v2/transactions/pending"));
    assert!(request.contains("x-algo-api-token: test-token"));
}

#[tokio::test]
async fn test_query_params_are_sent() {
    let (url, server) = serve_once("200 OK", json!({"top-transactions": []}).to_string()).await;

    let source = EndpointSource::new(EndpointConfig::new(url).with_param("max", "50")).unwrap();
    let items = source.fetch_all().await.unwrap();

    assert!(items.is_empty());
    let request = server.await.unwrap();
    assert!(request.starts_with("GET /v2/transactions/pending?max=50 "));
}

#[tokio::test]
async fn test_null_collection_is_empty() {
    let (url, _server) = serve_once("200 OK", json!({"top-transactions": null}).to_string()).await;

    let source = EndpointSource::new(EndpointConfig::new(url)).unwrap();

    assert!(source.fetch_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_custom_collection_key() {
    let (url, _server) = serve_once("200 OK", json!({"logs": [{"level": "info"}]}).to_string()).await;

    let source =
        EndpointSource::new(EndpointConfig::new(url).with_collection_key("logs")).unwrap();

    assert_eq!(source.fetch_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_error_status_is_unavailable() {
    let (url, _server) = serve_once("401 Unauthorized", json!({"message": "invalid token"}).to_string()).await;

    let source = EndpointSource::new(EndpointConfig::new(url)).unwrap();
    let result = source.fetch_all().await;

    match result {
        Err(IngestError::SourceUnavailable(msg)) => assert!(msg.contains("401")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_collection_is_unexpected_shape() {
    let (url, _server) = serve_once("200 OK", json!({"message": "ok"}).to_string()).await;

    let source = EndpointSource::new(EndpointConfig::new(url)).unwrap();
    let result = source.fetch_all().await;

    assert!(matches!(result, Err(IngestError::UnexpectedShape(_))));
}

#[tokio::test]
async fn test_non_json_body_is_unexpected_shape() {
    let (url, _server) = serve_once("200 OK", "<html>maintenance</html>".to_string()).await;

    let source = EndpointSource::new(EndpointConfig::new(url)).unwrap();
    let result = source.fetch_all().await;

    assert!(matches!(result, Err(IngestError::UnexpectedShape(_))));
}
