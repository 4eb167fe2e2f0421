//! Test fixtures and factory functions for creating test data.

use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use srs_backend::models::{CefrLevel, ItemKind, ItemPayload, ReviewItem};

/// A word item with the given scheduling state, due one hour ago.
pub fn due_item(id: &str, mastery_score: f64, consecutive_correct: u32) -> ReviewItem {
    item_due_at(id, mastery_score, consecutive_correct, Utc::now() - Duration::hours(1))
}

pub fn item_due_at(
    id: &str,
    mastery_score: f64,
    consecutive_correct: u32,
    due_at: DateTime<Utc>,
) -> ReviewItem {
    ReviewItem {
        mastery_score,
        consecutive_correct,
        ..ReviewItem::new(
            id,
            ItemKind::Word,
            ItemPayload::new(format!("mot {}", id), format!("word {}", id)),
            CefrLevel::A1,
            1,
            due_at,
        )
    }
}

/// Create an item request body.
pub fn create_item_request(id: Option<&str>, target: &str, translation: &str) -> serde_json::Value {
    let mut body = json!({
        "kind": "phrase",
        "payload": { "target": target, "translation": translation },
        "level": "A2",
        "difficulty": 2,
        "tags": ["greetings"]
    });
    if let Some(id) = id {
        body["id"] = json!(id);
    }
    body
}

/// Start session request body with an explicit queue.
pub fn start_session_with(ids: &[&str]) -> serde_json::Value {
    json!({ "item_ids": ids })
}

/// Start session request body from the due queue.
pub fn start_session_from_due(limit: Option<usize>) -> serde_json::Value {
    match limit {
        Some(limit) => json!({ "limit": limit }),
        None => json!({}),
    }
}

/// Grade request body.
pub fn grade_request(grade: serde_json::Value) -> serde_json::Value {
    json!({ "grade": grade })
}
