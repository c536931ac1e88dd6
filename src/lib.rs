use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod repository;

// Routing segregation (public tracking/login vs. admin panel).
pub mod routes;
use auth::AuthAdmin;
use routes::{admin, public};

// --- Public Re-exports ---

// Core state types for the application entry point (main.rs) and tests.
pub use config::AppConfig;
pub use error::{ApiError, ApiResult};
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Aggregates the OpenAPI documentation for every operation and schema.
/// Served as JSON at `/api-docs/openapi.json` with the UI at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::track_document, handlers::admin_login, handlers::change_password,
        handlers::register_admin, handlers::get_dashboard_stats, handlers::get_all_mails,
        handlers::get_recent_mails, handlers::search_mails, handlers::get_mail_by_id,
        handlers::create_incoming_mail, handlers::update_incoming_mail, handlers::delete_mail,
    ),
    components(
        schemas(
            models::IncomingMail, models::CreateIncomingMailRequest,
            models::UpdateIncomingMailRequest, models::LetterStatus, models::Department,
            models::DocumentStatus, models::DashboardStats, models::Administrator,
            models::LoginRequest, models::LoginResponse, models::ChangePasswordRequest,
            models::RegisterAdminRequest,
        )
    ),
    tags(
        (name = "emot", description = "E-MOT incoming mail tracking API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe container holding the shared services and
/// configuration, cloned into every request.
#[derive(Clone)]
pub struct AppState {
    /// Repository layer: all persistence behind one trait object.
    pub repo: RepositoryState,
    /// Loaded, immutable environment configuration.
    pub config: AppConfig,
}

// FromRef implementations let extractors pull individual components out of
// the shared state.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Gate for the admin route group. The `AuthAdmin` extractor rejects the
/// request with a uniform 401 before the handler runs if no administrator
/// identity can be resolved.
async fn auth_middleware(_admin: AuthAdmin, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies the scoped auth layer and the
/// observability stack, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public surface: health, login, tracking.
        .merge(public::public_routes())
        // Admin panel, gated by the auth layer.
        .nest(
            "/admin",
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                // Unique id per request, propagated back to the client.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// Customizes the tracing span so every log line for a request carries the
/// correlation id alongside method and URI.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
