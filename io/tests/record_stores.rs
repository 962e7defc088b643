//! Record store tests against a real directory and a local HTTP listener.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use session_view_core::{OrderState, RecordStore, RecordStoreError};
use session_view_io::{FileRecordStore, HttpRecordStore};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn write(dir: &std::path::Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

#[tokio::test]
async fn file_store_lists_json_files_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "order_20250102_090000.json", r#"{"drinkType":"mocha","name":"B"}"#);
    write(dir.path(), "order_20250101_090000.json", r#"{"drinkType":"latte","name":"A"}"#);
    write(dir.path(), "notes.txt", "not an order");

    let store = FileRecordStore::new(dir.path());
    let orders = store.list().await.unwrap();

    let names: Vec<&str> = orders.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(orders[1].drink_type, "mocha");
    assert!(orders[1].extras.is_empty());
}

#[tokio::test]
async fn file_store_missing_directory_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileRecordStore::new(dir.path().join("orders"));

    assert_eq!(store.list().await.unwrap(), Vec::<OrderState>::new());
}

#[tokio::test]
async fn file_store_reports_invalid_record() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "order_1.json", "{ truncated");

    let err = FileRecordStore::new(dir.path()).list().await.unwrap_err();

    match err {
        RecordStoreError::InvalidRecord { record, .. } => assert_eq!(record, "order_1.json"),
        other => panic!("unexpected error: {other}"),
    }
}

/// Serve one canned HTTP response and return the endpoint URL.
async fn serve_once(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0_u8; 1024];
        let _ = socket.read(&mut request).await.unwrap();
        let response = format!(
            "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    format!("http://{addr}/api/orders")
}

#[tokio::test]
async fn http_store_parses_order_list() {
    let url = serve_once(
        "HTTP/1.1 200 OK",
        r#"[{"drinkType":"latte","size":"M","milk":"oat","extras":["vanilla"],"name":"Ana"},{"name":"Ben","extras":null}]"#,
    )
    .await;

    let orders = HttpRecordStore::new(url).unwrap().list().await.unwrap();

    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].extras, vec!["vanilla"]);
    assert_eq!(orders[1].name, "Ben");
    assert!(orders[1].extras.is_empty());
}

#[tokio::test]
async fn http_store_rejects_error_status() {
    let url = serve_once("HTTP/1.1 500 Internal Server Error", "[]").await;

    let err = HttpRecordStore::new(url).unwrap().list().await.unwrap_err();

    assert!(matches!(err, RecordStoreError::Unavailable(_)));
}

#[tokio::test]
async fn http_store_unreachable_endpoint_is_unavailable() {
    // Bind then drop to get a port nobody is listening on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = HttpRecordStore::new(format!("http://{addr}/api/orders"))
        .unwrap()
        .list()
        .await
        .unwrap_err();

    assert!(matches!(err, RecordStoreError::Unavailable(_)));
}

#[tokio::test]
async fn http_store_gives_up_on_a_silent_endpoint() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        // Hold the connection open without answering.
        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
    });

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_millis(200))
        .build()
        .unwrap();
    let store = HttpRecordStore::with_client(client, format!("http://{addr}/api/orders"));

    let err = tokio::time::timeout(std::time::Duration::from_secs(10), store.list())
        .await
        .expect("request timeout did not fire")
        .unwrap_err();

    assert!(matches!(err, RecordStoreError::Unavailable(_)));
}
