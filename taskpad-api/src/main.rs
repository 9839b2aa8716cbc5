//! # Taskpad API Server
//!
//! REST backend for personal task management: registration and token login,
//! owner-scoped task CRUD with filtering and pagination, and AI task
//! generation from a topic.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/taskpad cargo run -p taskpad-api
//! ```

use anyhow::Context;
use std::sync::Arc;
use taskpad_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat},
    telemetry::init_tracing,
};
use taskpad_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    generation::{client::GeminiClient, TaskGenerator},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration comes first so LOG_FORMAT can pick the subscriber
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Pretty);
            return Err(e.context("Failed to load configuration"));
        }
    };
    init_tracing(config.log_format);

    tracing::info!("Taskpad API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("Failed to connect to database")?;

    run_migrations(&pool).await.context("Failed to run migrations")?;

    let gemini = GeminiClient::new(config.gemini.clone()).context("Failed to build HTTP client")?;
    if !gemini.is_configured() {
        tracing::warn!("GEMINI_API_KEY is not set; AI task generation will fail");
    }
    let generator = TaskGenerator::new(Arc::new(gemini));

    let address = config.bind_address();
    let state = AppState::new(pool.clone(), config, generator);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    close_pool(pool).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
