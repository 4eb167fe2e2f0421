//! SQLite schema for review items and session history.

/// Schema creation, safe to run on every start.
pub const SCHEMA: &str = r#"
-- Review items with their scheduling state
CREATE TABLE IF NOT EXISTS review_items (
    id TEXT PRIMARY KEY,
    kind TEXT NOT NULL,
    payload TEXT NOT NULL,
    level TEXT NOT NULL,
    difficulty INTEGER NOT NULL DEFAULT 1,
    tags TEXT NOT NULL DEFAULT '[]',
    ease REAL NOT NULL DEFAULT 2.0,
    interval_days INTEGER NOT NULL DEFAULT 1,
    -- microseconds since the Unix epoch
    due_at INTEGER NOT NULL,
    consecutive_correct INTEGER NOT NULL DEFAULT 0,
    mastery_score REAL NOT NULL DEFAULT 0.0,
    archived_at TEXT,
    updated_at TEXT NOT NULL
);

-- Finished study sessions
CREATE TABLE IF NOT EXISTS session_log (
    id TEXT PRIMARY KEY,
    started_at TEXT NOT NULL,
    ended_at TEXT,
    end_reason TEXT,
    correct INTEGER NOT NULL,
    incorrect INTEGER NOT NULL,
    total INTEGER NOT NULL,
    archived_count INTEGER NOT NULL DEFAULT 0
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_review_items_due ON review_items(due_at);
CREATE INDEX IF NOT EXISTS idx_review_items_archived ON review_items(archived_at);
CREATE INDEX IF NOT EXISTS idx_session_log_started ON session_log(started_at);
"#;
