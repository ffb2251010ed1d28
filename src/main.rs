//! Servika backend server
//!
//! Marketplace booking API: booking lifecycle, tiered cancellation refunds
//! with a 48-hour servicer processing deadline, complaints, and admin
//! moderation.

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

use servika_server::auth::AuthService;
use servika_server::booking::BookingService;
use servika_server::complaint::ComplaintService;
use servika_server::config::Config;
use servika_server::db;
use servika_server::middleware::{self, RateLimiter};
use servika_server::moderation::ModerationService;
use servika_server::refund::{overdue_sweeper, RefundService};
use servika_server::routes;
use servika_server::state::AppState;
use servika_server::wallet::WalletService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .init();

    tracing::info!(
        environment = config.environment.as_str(),
        "Starting Servika backend"
    );

    let db_pool = db::create_pool(&config)
        .await
        .context("Failed to create database pool")?;
    db::run_migrations(&db_pool)
        .await
        .context("Failed to run migrations")?;

    let auth_service = Arc::new(AuthService::new(
        db_pool.clone(),
        config.jwt_secret.clone(),
        config.jwt_access_token_ttl_seconds,
        config.jwt_refresh_token_ttl_days,
    ));
    let booking_service = Arc::new(BookingService::new(
        db_pool.clone(),
        config.refund_deadline_hours,
    ));
    let refund_service = Arc::new(RefundService::new(db_pool.clone()));
    let complaint_service = Arc::new(ComplaintService::new(db_pool.clone()));
    let moderation_service = Arc::new(ModerationService::new(db_pool.clone()));
    let wallet_service = Arc::new(WalletService::new(db_pool.clone()));

    let app_state = AppState::new(
        booking_service,
        refund_service.clone(),
        complaint_service,
        moderation_service,
        wallet_service,
        auth_service,
    );

    // Materialize pending -> overdue refund flips in the background
    let sweep_interval = config.refund_sweep_interval_seconds;
    tokio::spawn(async move {
        tracing::info!("Overdue refund sweeper task started");
        overdue_sweeper(refund_service, sweep_interval).await;
        tracing::error!("Overdue refund sweeper task exited unexpectedly");
    });

    let health_db_pool = db_pool.clone();
    let rate_limiter = RateLimiter::new(config.rate_limit_rps);

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(move || health_check(health_db_pool.clone())))
        .nest("/api/auth", routes::auth_routes())
        .nest("/api/user", routes::user_routes())
        .nest("/api/servicer", routes::servicer_routes())
        .nest("/api/admin", routes::admin_routes())
        .with_state(app_state)
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(axum::middleware::from_fn(middleware::request_tracing))
        .layer(axum::middleware::from_fn(move |req, next| {
            let limiter = rate_limiter.clone();
            middleware::rate_limit_layer(limiter)(req, next)
        }))
        .layer(configure_cors(config.cors_allowed_origins.as_deref()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
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

async fn root() -> &'static str {
    "Servika API Server"
}

/// Health check response
#[derive(serde::Serialize)]
struct HealthResponse {
    status: String,
    database: String,
    version: String,
}

/// Health check endpoint
async fn health_check(pool: sqlx::PgPool) -> axum::Json<HealthResponse> {
    let db_status = match db::check_health(&pool).await {
        Ok(()) => "connected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    let status = if db_status == "connected" {
        "healthy"
    } else {
        "unhealthy"
    };

    axum::Json(HealthResponse {
        status: status.to_string(),
        database: db_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn configure_cors(allowed_origins: Option<&str>) -> CorsLayer {
    let Some(allowed_origins) = allowed_origins.filter(|s| !s.is_empty()) else {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    };

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
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
