//! API request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export shared types from srs-core
pub use srs_core::{
    CefrLevel, Grade, ItemBand, ItemKind, ItemPayload, ReviewItem, ReviewSession, SessionEnd,
    SessionError, SessionProgress, SessionStats,
};

pub use crate::db::SessionRecord;

// === Item Types ===

/// Request to add an item to the curriculum
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItemRequest {
    /// Generated when omitted.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub kind: ItemKind,
    pub payload: ItemPayload,
    #[serde(default)]
    pub level: CefrLevel,
    #[serde(default)]
    pub difficulty: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Query for GET /api/items/due
#[derive(Debug, Clone, Deserialize)]
pub struct DueItemsQuery {
    pub limit: Option<usize>,
}

/// Response for GET /api/items/due
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DueItemsResponse {
    pub items: Vec<ReviewItem>,
    pub count: usize,
}

// === Session Types ===

/// Request to start a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartSessionRequest {
    /// Explicit queue, in presentation order. Falls back to the due queue when absent.
    #[serde(default)]
    pub item_ids: Option<Vec<String>>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Grade as sent by clients: a name (`"good"`) or its 1-4 value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GradeValue {
    Numeric(i64),
    Named(String),
}

impl GradeValue {
    pub fn to_grade(&self) -> Result<Grade, SessionError> {
        match self {
            GradeValue::Numeric(n) => u8::try_from(*n)
                .ok()
                .and_then(Grade::from_value)
                .ok_or_else(|| SessionError::InvalidGrade(n.to_string())),
            GradeValue::Named(name) => name.parse(),
        }
    }
}

/// Request for POST /api/sessions/:id/grade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRequest {
    pub grade: GradeValue,
}

/// Session state returned by the session endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_reason: Option<SessionEnd>,
    pub progress: SessionProgress,
    pub remaining: usize,
    pub stats: SessionStats,
    pub accuracy: f64,
    pub current_item: Option<ReviewItem>,
    pub archived: Vec<String>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl SessionResponse {
    pub fn from_session(session: &ReviewSession) -> Self {
        let stats = session.stats();
        Self {
            id: session.id,
            completed: session.is_completed(),
            end_reason: session.end_reason(),
            progress: session.progress(),
            remaining: session.remaining(),
            stats,
            accuracy: stats.accuracy(),
            current_item: session.current_item().cloned(),
            archived: session.archived().to_vec(),
            started_at: session.started_at,
            ended_at: session.ended_at,
        }
    }
}

/// Response for POST /api/sessions/:id/grade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeResponse {
    pub item: ReviewItem,
    pub archived: bool,
    pub band: ItemBand,
    pub session: SessionResponse,
}

/// Query for GET /api/history
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// Response for GET /api/history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub sessions: Vec<SessionRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn grade_value_accepts_names_and_numbers() {
        let named: GradeRequest = serde_json::from_value(json!({ "grade": "easy" })).unwrap();
        assert_eq!(named.grade.to_grade(), Ok(Grade::Easy));

        let numeric: GradeRequest = serde_json::from_value(json!({ "grade": 2 })).unwrap();
        assert_eq!(numeric.grade.to_grade(), Ok(Grade::Hard));
    }

    #[test]
    fn grade_value_rejects_out_of_range() {
        let request: GradeRequest = serde_json::from_value(json!({ "grade": 300 })).unwrap();
        assert_eq!(
            request.grade.to_grade(),
            Err(SessionError::InvalidGrade("300".to_string()))
        );

        let request: GradeRequest = serde_json::from_value(json!({ "grade": -1 })).unwrap();
        assert!(request.grade.to_grade().is_err());
    }

    #[test]
    fn create_item_defaults() {
        let request: CreateItemRequest = serde_json::from_value(json!({
            "payload": { "target": "merci", "translation": "thank you" }
        }))
        .unwrap();
        assert_eq!(request.kind, ItemKind::Word);
        assert_eq!(request.level, CefrLevel::A1);
        assert!(request.id.is_none());
        assert!(request.tags.is_empty());
    }

    #[test]
    fn session_response_reflects_state() {
        let now = Utc::now();
        let item = ReviewItem::new(
            "1",
            ItemKind::Word,
            ItemPayload::new("merci", "thank you"),
            CefrLevel::A1,
            1,
            now,
        );
        let mut session = ReviewSession::start(vec![item], now);
        let before = SessionResponse::from_session(&session);
        assert!(!before.completed);
        assert_eq!(before.current_item.as_ref().map(|i| i.id.as_str()), Some("1"));

        session.submit_grade(Grade::Good, now).unwrap();
        let after = SessionResponse::from_session(&session);
        assert!(after.completed);
        assert!(after.current_item.is_none());
        assert_eq!(after.stats.total, 1);
        assert_eq!(after.accuracy, 1.0);
    }
}
