//! Unit tests for the HTTP beacon client
//!
//! Exercises endpoint fallback and sentinel classification against
//! local sockets: a dead endpoint is a transport failure, a completed
//! exchange settles the verb either way.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use gantry_worker::beacon::{BeaconClient, BeaconConfig, HttpBeaconClient};
use gantry_worker::GantryError;

/// Bind, record the port, and drop the listener: a locally refused
/// endpoint without touching real coordinators
async fn dead_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Serve exactly one request with the given status line, reporting the
/// request line back to the test
async fn one_shot_server(status: &'static str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut head = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&chunk[..n]);
            if head.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }

        let request_line = String::from_utf8_lossy(&head)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string();

        let response = format!("HTTP/1.1 {}\r\nconnection: close\r\n\r\n", status);
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        let _ = tx.send(request_line);
    });

    (format!("http://{}", addr), rx)
}

fn config(endpoints: Vec<String>) -> BeaconConfig {
    BeaconConfig {
        endpoints,
        worker_name: "wk-1".into(),
        connect_timeout: Duration::from_secs(1),
        request_timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn test_all_endpoints_dead_is_unreachable() {
    let endpoints = vec![dead_endpoint().await, dead_endpoint().await];
    let client = HttpBeaconClient::new(config(endpoints)).unwrap();

    let err = client.retire_worker().await.unwrap_err();
    assert!(err.is_unreachable());
}

#[tokio::test]
async fn test_falls_through_to_next_endpoint() {
    let (live, request) = one_shot_server("204 No Content").await;
    let endpoints = vec![dead_endpoint().await, live];
    let client = HttpBeaconClient::new(config(endpoints)).unwrap();

    client.retire_worker().await.unwrap();

    let request_line = request.await.unwrap();
    assert_eq!(request_line, "PUT /api/v1/workers/wk-1/retire HTTP/1.1");
}

#[tokio::test]
async fn test_land_route() {
    let (live, request) = one_shot_server("204 No Content").await;
    let client = HttpBeaconClient::new(config(vec![live])).unwrap();

    client.land_worker().await.unwrap();

    assert_eq!(request.await.unwrap(), "PUT /api/v1/workers/wk-1/land HTTP/1.1");
}

#[tokio::test]
async fn test_delete_route() {
    let (live, request) = one_shot_server("204 No Content").await;
    let client = HttpBeaconClient::new(config(vec![live])).unwrap();

    client.delete_worker().await.unwrap();

    assert_eq!(request.await.unwrap(), "DELETE /api/v1/workers/wk-1 HTTP/1.1");
}

#[tokio::test]
async fn test_rejection_is_not_unreachable() {
    // A completed exchange settles the verb: the second endpoint must
    // never be consulted
    let (first, _request) = one_shot_server("503 Service Unavailable").await;
    let (second, mut untouched) = one_shot_server("204 No Content").await;
    let client = HttpBeaconClient::new(config(vec![first, second])).unwrap();

    let err = client.retire_worker().await.unwrap_err();

    assert!(matches!(
        err,
        GantryError::Rejected { ref verb, status: 503, .. } if verb == "retire"
    ));
    assert!(untouched.try_recv().is_err());
}

#[tokio::test]
async fn test_empty_endpoints_rejected_at_construction() {
    let err = HttpBeaconClient::new(config(Vec::new())).unwrap_err();
    assert!(matches!(err, GantryError::InvalidConfig { .. }));
}
