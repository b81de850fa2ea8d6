//! End-to-end deadline behaviour over real TCP connections.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use request_deadline::work::{DurationSource, FixedDuration};

mod common;

use common::TEST_TIMEOUT;

const SHORT: Duration = Duration::from_millis(20);
const LONG: Duration = Duration::from_secs(3);

/// Alternates short and long durations, starting with short.
struct Alternating(AtomicUsize);

impl DurationSource for Alternating {
    fn next_duration(&self) -> Duration {
        if self.0.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
            SHORT
        } else {
            LONG
        }
    }
}

#[tokio::test]
async fn test_short_work_returns_ok() {
    let server = common::start_server(Arc::new(FixedDuration(SHORT))).await;

    let res = common::client().get(server.url("/")).send().await.expect("server unreachable");
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    assert!(res.bytes().await.unwrap().is_empty(), "body must be empty");

    server.stop().await;
}

#[tokio::test]
async fn test_long_work_returns_gateway_timeout_at_deadline() {
    let server = common::start_server(Arc::new(FixedDuration(LONG))).await;

    let start = Instant::now();
    let res = common::client().get(server.url("/")).send().await.expect("server unreachable");
    let elapsed = start.elapsed();

    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
    assert!(elapsed >= TEST_TIMEOUT, "answered before the deadline: {:?}", elapsed);
    assert!(elapsed < LONG, "waited for the work instead of the deadline: {:?}", elapsed);
    assert!(res.bytes().await.unwrap().is_empty(), "body must be empty");

    server.stop().await;
}

#[tokio::test]
async fn test_concurrent_requests_do_not_interfere() {
    let server = common::start_server(Arc::new(Alternating(AtomicUsize::new(0)))).await;
    let client = common::client();

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let client = client.clone();
        let url = server.url("/");
        tasks.push(tokio::spawn(async move { client.get(&url).send().await.map(|r| r.status()) }));
    }

    let mut ok = 0;
    let mut timed_out = 0;
    for task in tasks {
        match task.await.unwrap().expect("request failed") {
            StatusCode::OK => ok += 1,
            StatusCode::GATEWAY_TIMEOUT => timed_out += 1,
            other => panic!("unexpected status {}", other),
        }
    }
    assert_eq!(ok, 5);
    assert_eq!(timed_out, 5);

    server.stop().await;
}

#[tokio::test]
async fn test_post_to_any_path_is_handled() {
    let server = common::start_server(Arc::new(FixedDuration(SHORT))).await;

    let res = common::client()
        .post(server.url("/some/other/path"))
        .body("ignored")
        .send()
        .await
        .expect("server unreachable");
    assert_eq!(res.status(), StatusCode::OK);

    server.stop().await;
}

#[tokio::test]
async fn test_server_stops_on_shutdown() {
    let server = common::start_server(Arc::new(FixedDuration(SHORT))).await;
    let addr = server.addr;
    server.stop().await;

    let err = common::client().get(format!("http://{}/", addr)).send().await;
    assert!(err.is_err(), "server still accepting after shutdown");
}
