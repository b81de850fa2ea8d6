//! Deadline propagation middleware.
//!
//! # Responsibilities
//! - Derive a child scope bounded by `now + timeout` from the request's scope
//! - Hand the child to the wrapped handler through request extensions
//! - Release the child once the wrapped call returns, on every exit path

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::context::Scope;

/// Fixed per-process deadline settings shared by every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlinePolicy {
    pub timeout: Duration,
}

impl DeadlinePolicy {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

/// Middleware function that bounds the rest of the stack by the policy's timeout.
///
/// The parent is whatever [`Scope`] an outer layer attached; requests without
/// one start from a fresh root.
pub async fn deadline_middleware(
    State(policy): State<DeadlinePolicy>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let parent = request
        .extensions()
        .get::<Scope>()
        .cloned()
        .unwrap_or_default();

    let (scope, _guard) = parent.with_timeout(policy.timeout);
    tracing::trace!(timeout_ms = policy.timeout.as_millis() as u64, "Request scope derived");

    request.extensions_mut().insert(scope);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::{http::StatusCode, middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    use crate::context::StopReason;

    type Captured = Arc<Mutex<Option<Scope>>>;

    fn capturing_app(policy: DeadlinePolicy, captured: Captured) -> Router {
        Router::new()
            .route(
                "/",
                get(move |Extension(scope): Extension<Scope>| {
                    let captured = captured.clone();
                    async move {
                        assert!(!scope.is_stopped(), "scope must be live inside the handler");
                        *captured.lock().unwrap() = Some(scope);
                        StatusCode::OK
                    }
                }),
            )
            .layer(middleware::from_fn_with_state(policy, deadline_middleware))
    }

    fn get_root() -> Request<Body> {
        Request::builder().uri("/").body(Body::empty()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn attaches_bounded_scope_and_releases_it() {
        let captured = Captured::default();
        let app = capturing_app(DeadlinePolicy::new(Duration::from_secs(5)), captured.clone());

        let response = app.oneshot(get_root()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let scope = captured.lock().unwrap().take().expect("handler saw a scope");
        assert!(scope.deadline().is_some());
        assert_eq!(scope.reason(), Some(StopReason::Cancelled), "released after return");
    }

    #[tokio::test(start_paused = true)]
    async fn derives_from_scope_attached_by_outer_layer() {
        let captured = Captured::default();
        let outer = Scope::root();
        let app = capturing_app(DeadlinePolicy::new(Duration::from_secs(5)), captured.clone());

        let mut request = get_root();
        request.extensions_mut().insert(outer.clone());
        app.oneshot(request).await.unwrap();

        let scope = captured.lock().unwrap().take().unwrap();
        assert!(scope.is_stopped());
        assert!(!outer.is_stopped(), "releasing the child leaves the parent alone");
    }

    #[tokio::test(start_paused = true)]
    async fn releases_scope_when_request_future_is_dropped() {
        let (seen_tx, seen_rx) = tokio::sync::oneshot::channel::<Scope>();
        let seen_tx = Arc::new(Mutex::new(Some(seen_tx)));

        let app = Router::new()
            .route(
                "/",
                get(move |Extension(scope): Extension<Scope>| {
                    let seen_tx = seen_tx.clone();
                    async move {
                        let tx = seen_tx.lock().unwrap().take();
                        if let Some(tx) = tx {
                            let _ = tx.send(scope);
                        }
                        std::future::pending::<StatusCode>().await
                    }
                }),
            )
            .layer(middleware::from_fn_with_state(
                DeadlinePolicy::new(Duration::from_secs(60)),
                deadline_middleware,
            ));

        let in_flight = tokio::spawn(app.oneshot(get_root()));
        let scope = seen_rx.await.unwrap();
        assert!(!scope.is_stopped());

        in_flight.abort();
        let _ = in_flight.await;
        assert_eq!(scope.reason(), Some(StopReason::Cancelled));
    }
}
