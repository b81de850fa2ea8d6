//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use request_deadline::config::ServiceConfig;
use request_deadline::http::HttpServer;
use request_deadline::lifecycle::Shutdown;
use request_deadline::work::DurationSource;
use tokio::net::TcpListener;

/// Deadline used by integration tests, short enough to keep them fast.
pub const TEST_TIMEOUT: Duration = Duration::from_millis(300);

/// A running server and the handle that stops it.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub task: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server to drain.
    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = tokio::time::timeout(Duration::from_secs(5), self.task).await;
    }
}

pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.timeouts.request_ms = TEST_TIMEOUT.as_millis() as u64;
    config
}

/// Start a server on an ephemeral port with the given duration source.
pub async fn start_server(durations: Arc<dyn DurationSource>) -> TestServer {
    let config = test_config();
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::with_duration_source(config, durations);
    let task = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    TestServer { addr, shutdown, task }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
