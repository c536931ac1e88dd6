use emot::{
    AppState, auth,
    config::{AppConfig, Env},
    create_router,
    repository::{PostgresRepository, RepositoryState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Asynchronous entry point: configuration, logging, database, seeding,
/// and the HTTP server.
#[tokio::main]
async fn main() {
    // Configuration loading, fail-fast on missing secrets.
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "emot=debug,tower_http=info,axum=trace".into());

    // Pretty output locally, JSON in production for log aggregation.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("E-MOT starting in {:?} mode", config.env);

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("FATAL: database migrations failed");

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // Idempotent bootstrap: ensure at least one administrator exists.
    match auth::seed_default_admin(&repo).await {
        Ok(true) => tracing::info!(
            "Seeded default administrator '{}'; change its password after first login",
            auth::DEFAULT_ADMIN_USERNAME
        ),
        Ok(false) => tracing::debug!("Administrator already present, seeding skipped"),
        Err(e) => {
            tracing::error!(error = %e, "FATAL: default administrator seeding failed");
            std::process::exit(1);
        }
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let app_state = AppState { repo, config };
    let app = create_router(app_state);

    let listener = TcpListener::bind(&addr)
        .await
        .expect("FATAL: failed to bind listener");

    tracing::info!("Listening on {}", addr);
    tracing::info!("API documentation available at /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: server terminated unexpectedly");
}
