//! # logwarden-server
//!
//! HTTP front for the audit-log read path.
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /healthz` | Liveness check |
//! | `GET /v1/logs` | Filtered, chronologically ordered audit entries |
//!
//! `/v1/logs` takes the admin token in `Authorization: Bearer <token>` or
//! `x-admin-token`, and optional `from`, `to` (RFC 3339) and `user_ids`
//! (comma-separated) query parameters. A request with malformed parameters
//! is answered 400 only once its credential has passed the access checks.

pub mod error;
pub mod handlers;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use state::AppState;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/v1/logs", get(handlers::query_logs))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
