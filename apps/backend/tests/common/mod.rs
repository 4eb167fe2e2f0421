//! Common test utilities and fixtures for integration tests.
//!
//! Every context gets its own in-memory SQLite database, so tests can run in
//! parallel without cleanup.

pub mod fixtures;

use axum_test::TestServer;
use chrono::{Duration, Utc};

use srs_backend::db::{ItemRepository, SqliteRepository};
use srs_backend::models::ReviewItem;
use srs_backend::{build_router, AppState};

/// Test context holding the shared state and a server over the full router.
pub struct TestContext {
    pub state: AppState,
    pub server: TestServer,
}

impl TestContext {
    /// Create a context with an empty database.
    pub fn new() -> Self {
        Self::with_session_limit(50)
    }

    pub fn with_session_limit(session_limit: usize) -> Self {
        let repository =
            SqliteRepository::open_in_memory().expect("Failed to open in-memory database");
        Self::from_state(AppState::new(repository, session_limit))
    }

    /// Create a context that keeps finished sessions for `retention` only.
    pub fn with_session_retention(retention: Duration) -> Self {
        let repository =
            SqliteRepository::open_in_memory().expect("Failed to open in-memory database");
        Self::from_state(AppState::new(repository, 50).with_session_retention(retention))
    }

    fn from_state(state: AppState) -> Self {
        let server = TestServer::new(build_router(state.clone())).expect("Failed to start test server");
        Self { state, server }
    }

    /// Create a context seeded with the three starter items.
    pub fn seeded() -> Self {
        let ctx = Self::new();
        {
            let repo = ctx.state.repository().expect("repository lock");
            srs_backend::seed::seed_sample_items(&*repo, Utc::now()).expect("Failed to seed items");
        }
        ctx
    }

    /// Store items directly, bypassing the API.
    pub fn insert_items(&self, items: &[ReviewItem]) {
        let repo = self.state.repository().expect("repository lock");
        for item in items {
            repo.upsert_item(item).expect("Failed to insert item");
        }
    }

    pub fn stored_item(&self, id: &str) -> Option<ReviewItem> {
        let repo = self.state.repository().expect("repository lock");
        repo.get_item(id).expect("Failed to load item")
    }

    pub fn is_archived(&self, id: &str) -> bool {
        let repo = self.state.repository().expect("repository lock");
        repo.is_archived(id).expect("Failed to read archival")
    }
}
