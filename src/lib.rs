//! Request deadline propagation service library.

pub mod config;
pub mod context;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod work;

pub use config::schema::ServiceConfig;
pub use context::{Scope, ScopeGuard, StopReason};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
