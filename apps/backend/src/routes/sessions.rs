//! Session endpoints

use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::db::{ItemRepository, SessionLogRepository};
use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;
use srs_core::GradeOutcome;

/// POST /api/sessions
pub async fn start(
    State(state): State<AppState>,
    Json(request): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    let now = Utc::now();
    let items = load_queue(&state, &request, now)?;
    let session = ReviewSession::start(items, now);

    tracing::info!(session_id = %session.id, items = session.len(), "Session started");
    if session.is_completed() {
        // Nothing was due; the session is already over.
        state.repository()?.record_session(&session)?;
    }

    let response = SessionResponse::from_session(&session);
    let pruned = state
        .sessions
        .prune_finished(now - state.session_retention)
        .await;
    if pruned > 0 {
        tracing::debug!(pruned, "Dropped finished sessions");
    }
    state.sessions.insert(session).await;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/sessions/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>> {
    let session = state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| session_not_found(id))?;
    Ok(Json(SessionResponse::from_session(&session)))
}

/// POST /api/sessions/:id/grade
pub async fn grade(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<GradeRequest>,
) -> Result<Json<GradeResponse>> {
    let grade = request.grade.to_grade().map_err(|e| {
        tracing::warn!(session_id = %id, grade = ?request.grade, "Rejected grade");
        ApiError::from(e)
    })?;
    let now = Utc::now();

    let (outcome, session) = state
        .sessions
        .update(id, |session| -> Result<(GradeOutcome, ReviewSession)> {
            // Grade a copy so a failed write leaves the live session untouched.
            let mut next = session.clone();
            let outcome = next.submit_grade(grade, now)?;
            persist_grade(&state, &next, &outcome, now)?;
            *session = next.clone();
            Ok((outcome, next))
        })
        .await
        .ok_or_else(|| session_not_found(id))??;

    tracing::debug!(
        session_id = %id,
        item_id = %outcome.item.id,
        grade = %grade,
        interval = outcome.item.interval,
        ease = outcome.item.ease,
        mastery = outcome.item.mastery_score,
        "Item graded"
    );
    if session.is_completed() {
        log_session_end(&session);
    }

    Ok(Json(GradeResponse {
        archived: outcome.archive,
        band: outcome.band,
        item: outcome.item,
        session: SessionResponse::from_session(&session),
    }))
}

/// POST /api/sessions/:id/end
pub async fn end(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>> {
    let now = Utc::now();

    let (session, newly_ended) = state
        .sessions
        .update(id, |session| -> Result<(ReviewSession, bool)> {
            if session.is_completed() {
                return Ok((session.clone(), false));
            }
            let mut next = session.clone();
            next.end_early(now);
            state.repository()?.record_session(&next)?;
            *session = next.clone();
            Ok((next, true))
        })
        .await
        .ok_or_else(|| session_not_found(id))??;

    if newly_ended {
        log_session_end(&session);
    }
    Ok(Json(SessionResponse::from_session(&session)))
}

/// GET /api/history
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>> {
    let sessions = state
        .repository()?
        .recent_sessions(query.limit.unwrap_or(20))?;
    Ok(Json(HistoryResponse { sessions }))
}

/// Resolve the queue for a new session: explicit ids in order, or the due queue.
///
/// Each id may appear once; a second copy would be graded from a stale snapshot.
fn load_queue(
    state: &AppState,
    request: &StartSessionRequest,
    now: chrono::DateTime<Utc>,
) -> Result<Vec<ReviewItem>> {
    let repo = state.repository()?;
    match &request.item_ids {
        Some(ids) => {
            let mut seen = HashSet::with_capacity(ids.len());
            let mut items = Vec::with_capacity(ids.len());
            for id in ids {
                if !seen.insert(id.as_str()) {
                    return Err(ApiError::BadRequest(format!(
                        "Item {} is listed more than once",
                        id
                    )));
                }
                let item = repo
                    .get_item(id)?
                    .ok_or_else(|| ApiError::NotFound(format!("Item {}", id)))?;
                items.push(item);
            }
            Ok(items)
        }
        None => {
            let limit = request.limit.unwrap_or(state.session_limit);
            Ok(repo.get_due_items(now, limit)?)
        }
    }
}

/// Store the graded item, act on its archival flag and log a finished session,
/// all in one transaction.
fn persist_grade(
    state: &AppState,
    session: &ReviewSession,
    outcome: &GradeOutcome,
    now: chrono::DateTime<Utc>,
) -> Result<()> {
    let archived = state.repository()?.transaction(|repo| {
        repo.upsert_item(&outcome.item)?;
        let archived = outcome.archive && repo.archive_item(&outcome.item.id, now)?;
        if session.is_completed() {
            repo.record_session(session)?;
        }
        Ok(archived)
    })?;
    if archived {
        tracing::info!(item_id = %outcome.item.id, "Item mastered and archived");
    }
    Ok(())
}

fn log_session_end(session: &ReviewSession) {
    let stats = session.stats();
    tracing::info!(
        session_id = %session.id,
        reason = ?session.end_reason(),
        correct = stats.correct,
        incorrect = stats.incorrect,
        total = stats.total,
        "Session finished"
    );
}

fn session_not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Session {}", id))
}
