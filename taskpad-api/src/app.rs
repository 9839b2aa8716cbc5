/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskpad_api::{app::AppState, config::Config};
/// use taskpad_shared::generation::{client::GeminiClient, TaskGenerator};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let generator = TaskGenerator::new(Arc::new(GeminiClient::new(config.gemini.clone())?));
/// let state = AppState::new(pool, config, generator);
/// let app = taskpad_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::ApiError,
    middleware::{auth::require_auth, security::SecurityHeadersLayer},
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::{path::Path, sync::Arc, time::Duration};
use taskpad_shared::generation::TaskGenerator;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// AI task generator
    pub generator: TaskGenerator,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, generator: TaskGenerator) -> Self {
        Self {
            db,
            config: Arc::new(config),
            generator,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /health                   # Health check (public)
/// ├── /api/
/// │   ├── POST /register            # public
/// │   ├── POST /login               # public
/// │   ├── POST /logout              # bearer token
/// │   └── /tasks                    # bearer token
/// │       ├── GET    /
/// │       ├── POST   /
/// │       ├── POST   /generate-ai
/// │       ├── GET    /:id
/// │       ├── PUT    /:id
/// │       └── DELETE /:id
/// │   └── *                         # JSON 404
/// └── *                             # built client (when SPA_DIR is set)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Compression
/// 4. Logging (tower-http TraceLayer)
/// 5. Authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let public_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // Everything else requires a bearer token
    let protected_routes = Router::new()
        .route("/logout", post(routes::auth::logout))
        .route("/tasks", get(routes::tasks::index).post(routes::tasks::store))
        .route("/tasks/generate-ai", post(routes::tasks::generate_ai))
        .route(
            "/tasks/:id",
            get(routes::tasks::show)
                .put(routes::tasks::update)
                .delete(routes::tasks::destroy),
        )
        .layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));

    // Unknown API paths stay JSON 404s even when the client bundle is the fallback
    let api_routes = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(api_not_found);

    let mut router = Router::new()
        .merge(health_routes)
        .nest("/api", api_routes);

    if let Some(dir) = state.config.api.spa_dir.as_deref() {
        let index = Path::new(dir).join("index.html");
        tracing::info!(dir = %dir, "Serving client bundle");
        router = router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

async fn api_not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

/// Permissive CORS for `*`, otherwise only the configured origins
fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}
