use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Admin Router Module
///
/// The CRUD panel, dashboard, and account management. Nested under `/admin`
/// and gated by the auth middleware layer applied in `create_router`; every
/// route here requires a resolved administrator identity.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/stats — live dashboard counts.
        .route("/stats", get(handlers::get_dashboard_stats))
        // Mail repository operations. Literal segments (recent, search) take
        // precedence over the {id} capture.
        .route(
            "/mails",
            get(handlers::get_all_mails).post(handlers::create_incoming_mail),
        )
        .route("/mails/recent", get(handlers::get_recent_mails))
        .route("/mails/search", get(handlers::search_mails))
        .route(
            "/mails/{id}",
            get(handlers::get_mail_by_id)
                .put(handlers::update_incoming_mail)
                .delete(handlers::delete_mail),
        )
        // Account management for the logged-in operator.
        .route("/password", post(handlers::change_password))
        .route("/register", post(handlers::register_admin))
}
