use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Unauthenticated endpoints: the liveness probe, the login gateway, and the
/// public tracking lookup. The tracking handler returns only the restricted
/// `DocumentStatus` projection, so nothing internal is reachable without a
/// token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness endpoint for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // POST /auth/login
        // Credential check; issues the bearer token used by the admin panel.
        .route("/auth/login", post(handlers::admin_login))
        // GET /track/{registration_number}
        // Public status lookup by registration number.
        .route(
            "/track/{registration_number}",
            get(handlers::track_document),
        )
}
