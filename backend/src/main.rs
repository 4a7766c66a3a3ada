//! Loan Servicing Backend Server
//!
//! Serves the loan, payment and remaining-balance API over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use tokio::signal;
use tower_http::cors::CorsLayer;

use loan_servicing_server::auth::AuthService;
use loan_servicing_server::clock::SystemClock;
use loan_servicing_server::config::{Config, StorageBackend};
use loan_servicing_server::db;
use loan_servicing_server::loan::LoanService;
use loan_servicing_server::middleware;
use loan_servicing_server::repository::{
    InMemoryRepository, LoanRepository, PgRepository, UserRepository,
};
use loan_servicing_server::routes;
use loan_servicing_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!(
        environment = config.environment.as_str(),
        storage = config.storage_backend.as_str(),
        "Starting loan servicing server"
    );

    let (loans, users) = build_repositories(&config).await?;

    let loan_service = Arc::new(LoanService::new(loans, Arc::new(SystemClock)));
    let auth_service = Arc::new(AuthService::new(
        users,
        config.jwt_secret.clone(),
        config.jwt_access_token_ttl_seconds,
        config.bcrypt_cost,
    ));

    let app_state = AppState::new(loan_service, auth_service, config.storage_backend);

    let mut app = routes::app(app_state);
    if config.environment.is_production() {
        app = app.layer(axum::middleware::from_fn(middleware::hsts_header));
    }
    let app = app.layer(configure_cors(config.cors_allowed_origins.as_deref()));

    let addr = SocketAddr::new(config.host, config.port);

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check at http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn build_repositories(
    config: &Config,
) -> anyhow::Result<(Arc<dyn LoanRepository>, Arc<dyn UserRepository>)> {
    match config.storage_backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on shutdown");
            let repository = Arc::new(InMemoryRepository::new());
            let loans: Arc<dyn LoanRepository> = repository.clone();
            let users: Arc<dyn UserRepository> = repository;
            Ok((loans, users))
        }
        StorageBackend::Postgres => {
            let pool = db::create_pool(config).await?;
            db::run_migrations(&pool).await?;

            let repository = Arc::new(PgRepository::new(pool));
            let loans: Arc<dyn LoanRepository> = repository.clone();
            let users: Arc<dyn UserRepository> = repository;
            Ok((loans, users))
        }
    }
}

fn configure_cors(allowed_origins: Option<&str>) -> CorsLayer {
    let allowed_origins = allowed_origins.unwrap_or_default();

    if allowed_origins.is_empty() {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
