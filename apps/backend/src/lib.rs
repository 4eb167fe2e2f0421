pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod seed;
pub mod services;

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    routing::{get, post},
    Router,
};
use chrono::{Duration, Utc};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::SqliteRepository;
use crate::error::{ApiError, Result};
use crate::services::sessions::SessionStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<Mutex<SqliteRepository>>,
    pub sessions: Arc<SessionStore>,
    /// Default size of a session built from the due queue.
    pub session_limit: usize,
    /// How long a finished session stays in the live store.
    pub session_retention: Duration,
}

impl AppState {
    pub fn new(repository: SqliteRepository, session_limit: usize) -> Self {
        Self {
            repository: Arc::new(Mutex::new(repository)),
            sessions: Arc::new(SessionStore::new()),
            session_limit,
            session_retention: Duration::minutes(15),
        }
    }

    pub fn with_session_retention(mut self, retention: Duration) -> Self {
        self.session_retention = retention;
        self
    }

    /// Lock the repository. Never hold the guard across an `.await`.
    pub fn repository(&self) -> Result<MutexGuard<'_, SqliteRepository>> {
        self.repository
            .lock()
            .map_err(|_| ApiError::Internal("repository lock poisoned".to_string()))
    }
}

/// Build the API router without transport layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Item routes
        .route("/api/items", post(routes::items::create))
        .route("/api/items/due", get(routes::items::due))
        .route("/api/items/:id", get(routes::items::get))
        // Session routes
        .route("/api/sessions", post(routes::sessions::start))
        .route("/api/sessions/:id", get(routes::sessions::get))
        .route("/api/sessions/:id/grade", post(routes::sessions::grade))
        .route("/api/sessions/:id/end", post(routes::sessions::end))
        .route("/api/history", get(routes::sessions::history))
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!(path = %config.database_path, "Opening database...");
    let repository = if config.database_path == ":memory:" {
        SqliteRepository::open_in_memory()?
    } else {
        SqliteRepository::open(&config.database_path)?
    };

    if config.seed_sample_items {
        let inserted = seed::seed_sample_items(&repository, Utc::now())?;
        tracing::info!(inserted, "Seeded sample items");
    }

    let state = AppState::new(repository, config.session_limit).with_session_retention(
        Duration::seconds(i64::from(config.session_retention_secs)),
    );

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr = config.addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
