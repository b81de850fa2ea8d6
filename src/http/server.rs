//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the work handler
//! - Wire up middleware (request ID, tracing, deadline)
//! - Bind server to listener and shut down gracefully
//! - Classify task outcomes into status codes

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware,
    routing::any,
    Extension, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::context::Scope;
use crate::http::request::{request_id_of, MakeRequestUuidV4, X_REQUEST_ID};
use crate::observability::metrics;
use crate::resilience::{deadline_middleware, DeadlinePolicy};
use crate::work::{self, DurationSource, RandomDuration, TaskOutcome};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub durations: Arc<dyn DurationSource>,
}

/// HTTP server for the deadline service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server drawing work durations at random.
    pub fn new(config: ServiceConfig) -> Self {
        let durations = Arc::new(RandomDuration::from_config(&config.work));
        Self::with_duration_source(config, durations)
    }

    /// Create a server with an injected duration source.
    pub fn with_duration_source(config: ServiceConfig, durations: Arc<dyn DurationSource>) -> Self {
        let state = AppState { durations };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let policy = DeadlinePolicy::new(config.timeouts.request());

        Router::new()
            .route("/{*path}", any(work_handler))
            .route("/", any(work_handler))
            .with_state(state)
            .layer(middleware::from_fn_with_state(policy, deadline_middleware))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_ms = self.config.timeouts.request_ms,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a clone of the assembled router, for serving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

/// Runs simulated work under the request's scope and reports the outcome as a status.
async fn work_handler(
    State(state): State<AppState>,
    Extension(scope): Extension<Scope>,
    headers: HeaderMap,
) -> TaskOutcome {
    let start_time = Instant::now();
    let request_id = request_id_of(&headers);

    let result = work::simulate(&scope, state.durations.as_ref()).await;
    let outcome = TaskOutcome::from(&result);

    match &result {
        Ok(took) => tracing::debug!(
            request_id = %request_id,
            took_ms = took.as_millis() as u64,
            "Work completed"
        ),
        Err(e) => tracing::debug!(
            request_id = %request_id,
            error = %e,
            outcome = outcome.as_str(),
            "Work did not complete"
        ),
    }

    metrics::record_request(outcome, start_time);
    outcome
}
