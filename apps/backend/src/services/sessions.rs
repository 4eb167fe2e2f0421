//! In-process registry of live review sessions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use srs_core::ReviewSession;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Live sessions keyed by id.
///
/// Every access goes through one lock, so grades against the same session
/// are applied one at a time.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, ReviewSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: ReviewSession) -> Uuid {
        let id = session.id;
        self.sessions.lock().await.insert(id, session);
        id
    }

    /// Snapshot of a session.
    pub async fn get(&self, id: Uuid) -> Option<ReviewSession> {
        self.sessions.lock().await.get(&id).cloned()
    }

    /// Run `f` against a session while holding the store lock.
    ///
    /// Returns `None` when the session does not exist.
    pub async fn update<F, T>(&self, id: Uuid, f: F) -> Option<T>
    where
        F: FnOnce(&mut ReviewSession) -> T,
    {
        let mut sessions = self.sessions.lock().await;
        sessions.get_mut(&id).map(f)
    }

    /// Drop sessions that finished at or before `cutoff`. Returns how many were dropped.
    ///
    /// Finished sessions are already in the session log, so nothing is lost.
    pub async fn prune_finished(&self, cutoff: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| match session.ended_at {
            Some(ended_at) if session.is_completed() => ended_at > cutoff,
            _ => true,
        });
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}
