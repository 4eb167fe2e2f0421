//! Repository traits and their SQLite implementation.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use srs_core::{CefrLevel, ItemKind, ItemPayload, ReviewItem, ReviewSession, SessionEnd, SessionStats};

use super::error::{DbError, Result};

const ITEM_COLUMNS: &str = "id, kind, payload, level, difficulty, tags, ease, interval_days, due_at, consecutive_correct, mastery_score";

/// Repository for review items.
pub trait ItemRepository {
    fn get_item(&self, id: &str) -> Result<Option<ReviewItem>>;
    /// Insert or update an item's content and scheduling state. Archival is kept.
    fn upsert_item(&self, item: &ReviewItem) -> Result<()>;
    /// Active items due at `now`, oldest due date first.
    fn get_due_items(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<ReviewItem>>;
    /// Remove an item from future due queues. Returns false if it was already archived or unknown.
    fn archive_item(&self, id: &str, now: DateTime<Utc>) -> Result<bool>;
    fn is_archived(&self, id: &str) -> Result<bool>;
}

/// Repository for finished sessions.
pub trait SessionLogRepository {
    fn record_session(&self, session: &ReviewSession) -> Result<()>;
    fn recent_sessions(&self, limit: usize) -> Result<Vec<SessionRecord>>;
}

/// Stored figures of a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub end_reason: Option<SessionEnd>,
    pub stats: SessionStats,
    pub archived_count: u32,
}

/// SQLite implementation of repositories.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(super::schema::SCHEMA)?;
        Ok(())
    }

    /// Run `f` in a transaction. Writes are committed only if `f` succeeds.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }
}

impl ItemRepository for SqliteRepository {
    fn get_item(&self, id: &str) -> Result<Option<ReviewItem>> {
        let sql = format!("SELECT {} FROM review_items WHERE id = ?1", ITEM_COLUMNS);
        let row = self
            .conn
            .query_row(&sql, params![id], ItemRow::from_row)
            .optional()?;
        row.map(ItemRow::into_item).transpose()
    }

    fn upsert_item(&self, item: &ReviewItem) -> Result<()> {
        let payload = serde_json::to_string(&item.payload)?;
        let tags = serde_json::to_string(&item.tags)?;

        self.conn.execute(
            "INSERT INTO review_items (id, kind, payload, level, difficulty, tags, ease, interval_days, due_at, consecutive_correct, mastery_score, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(id) DO UPDATE SET
                kind = excluded.kind,
                payload = excluded.payload,
                level = excluded.level,
                difficulty = excluded.difficulty,
                tags = excluded.tags,
                ease = excluded.ease,
                interval_days = excluded.interval_days,
                due_at = excluded.due_at,
                consecutive_correct = excluded.consecutive_correct,
                mastery_score = excluded.mastery_score,
                updated_at = excluded.updated_at",
            params![
                item.id,
                item.kind.as_str(),
                payload,
                item.level.as_str(),
                item.difficulty,
                tags,
                item.ease,
                item.interval,
                item.due_at.timestamp_micros(),
                item.consecutive_correct,
                item.mastery_score,
                format_timestamp(Utc::now()),
            ],
        )?;
        Ok(())
    }

    fn get_due_items(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<ReviewItem>> {
        let sql = format!(
            "SELECT {} FROM review_items
             WHERE archived_at IS NULL AND due_at <= ?1
             ORDER BY due_at, id
             LIMIT ?2",
            ITEM_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(
                params![now.timestamp_micros(), limit as i64],
                ItemRow::from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(ItemRow::into_item).collect()
    }

    fn archive_item(&self, id: &str, now: DateTime<Utc>) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE review_items SET archived_at = ?1 WHERE id = ?2 AND archived_at IS NULL",
            params![format_timestamp(now), id],
        )?;
        Ok(changed > 0)
    }

    fn is_archived(&self, id: &str) -> Result<bool> {
        let archived_at: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT archived_at FROM review_items WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(matches!(archived_at, Some(Some(_))))
    }
}

impl SessionLogRepository for SqliteRepository {
    fn record_session(&self, session: &ReviewSession) -> Result<()> {
        let stats = session.stats();
        self.conn.execute(
            "INSERT OR REPLACE INTO session_log (id, started_at, ended_at, end_reason, correct, incorrect, total, archived_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                session.id.to_string(),
                format_timestamp(session.started_at),
                session.ended_at.map(format_timestamp),
                session.end_reason().map(end_reason_str),
                stats.correct,
                stats.incorrect,
                stats.total,
                session.archived().len() as u32,
            ],
        )?;
        Ok(())
    }

    fn recent_sessions(&self, limit: usize) -> Result<Vec<SessionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, ended_at, end_reason, correct, incorrect, total, archived_count
             FROM session_log
             ORDER BY started_at DESC
             LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(SessionRow {
                    id: row.get(0)?,
                    started_at: row.get(1)?,
                    ended_at: row.get(2)?,
                    end_reason: row.get(3)?,
                    correct: row.get(4)?,
                    incorrect: row.get(5)?,
                    total: row.get(6)?,
                    archived_count: row.get(7)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(SessionRow::into_record).collect()
    }
}

/// Raw review_items row before decoding JSON and enum columns.
struct ItemRow {
    id: String,
    kind: String,
    payload: String,
    level: String,
    difficulty: u32,
    tags: String,
    ease: f64,
    interval: u32,
    /// Microseconds since the Unix epoch.
    due_at: i64,
    consecutive_correct: u32,
    mastery_score: f64,
}

impl ItemRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            kind: row.get(1)?,
            payload: row.get(2)?,
            level: row.get(3)?,
            difficulty: row.get(4)?,
            tags: row.get(5)?,
            ease: row.get(6)?,
            interval: row.get(7)?,
            due_at: row.get(8)?,
            consecutive_correct: row.get(9)?,
            mastery_score: row.get(10)?,
        })
    }

    fn into_item(self) -> Result<ReviewItem> {
        let kind = ItemKind::parse(&self.kind)
            .ok_or_else(|| DbError::InvalidData(format!("unknown item kind: {}", self.kind)))?;
        let level = CefrLevel::parse(&self.level)
            .ok_or_else(|| DbError::InvalidData(format!("unknown level: {}", self.level)))?;
        let payload: ItemPayload = serde_json::from_str(&self.payload)?;

        Ok(ReviewItem {
            id: self.id,
            kind,
            payload,
            level,
            difficulty: self.difficulty,
            tags: serde_json::from_str(&self.tags)?,
            ease: self.ease,
            interval: self.interval,
            due_at: DateTime::<Utc>::from_timestamp_micros(self.due_at).ok_or_else(|| {
                DbError::InvalidData(format!("due_at out of range: {}", self.due_at))
            })?,
            consecutive_correct: self.consecutive_correct,
            mastery_score: self.mastery_score,
        })
    }
}

struct SessionRow {
    id: String,
    started_at: String,
    ended_at: Option<String>,
    end_reason: Option<String>,
    correct: u32,
    incorrect: u32,
    total: u32,
    archived_count: u32,
}

impl SessionRow {
    fn into_record(self) -> Result<SessionRecord> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| DbError::InvalidData(format!("session id {}: {}", self.id, e)))?;
        let end_reason = match self.end_reason.as_deref() {
            None => None,
            Some(s) => Some(parse_end_reason(s)?),
        };

        Ok(SessionRecord {
            id,
            started_at: parse_timestamp(&self.started_at)?,
            ended_at: self.ended_at.as_deref().map(parse_timestamp).transpose()?,
            end_reason,
            stats: SessionStats {
                correct: self.correct,
                incorrect: self.incorrect,
                total: self.total,
            },
            archived_count: self.archived_count,
        })
    }
}

/// Fixed-width UTC timestamps for wall-clock columns, so text order matches time order.
fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::InvalidData(format!("timestamp {}: {}", s, e)))
}

fn end_reason_str(reason: SessionEnd) -> &'static str {
    match reason {
        SessionEnd::Exhausted => "exhausted",
        SessionEnd::EndedEarly => "ended_early",
    }
}

fn parse_end_reason(s: &str) -> Result<SessionEnd> {
    match s {
        "exhausted" => Ok(SessionEnd::Exhausted),
        "ended_early" => Ok(SessionEnd::EndedEarly),
        other => Err(DbError::InvalidData(format!("unknown end reason: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use srs_core::Grade;

    fn sample(id: &str, due_at: DateTime<Utc>) -> ReviewItem {
        ReviewItem {
            due_at,
            ..ReviewItem::new(
                id,
                ItemKind::Phrase,
                ItemPayload::new("Comment allez-vous?", "How are you?")
                    .with_examples(["Je vais bien, merci."]),
                CefrLevel::A2,
                2,
                due_at,
            )
            .with_tags(["greetings", "questions"])
        }
    }

    #[test]
    fn upsert_and_get_round_trip() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let item = sample("p1", Utc::now());
        repo.upsert_item(&item).unwrap();

        let loaded = repo.get_item("p1").unwrap().unwrap();
        assert_eq!(loaded.payload, item.payload);
        assert_eq!(loaded.tags, item.tags);
        assert_eq!(loaded.kind, ItemKind::Phrase);
        assert_eq!(loaded.level, CefrLevel::A2);
        assert_eq!(loaded.due_at.timestamp_micros(), item.due_at.timestamp_micros());
    }

    #[test]
    fn far_future_due_dates_round_trip() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let now = Utc::now();
        // Past year 9999, where RFC 3339 text no longer round-trips.
        let distant = sample("distant", now + Duration::days(3_000_000));
        let last = sample("last", DateTime::<Utc>::MAX_UTC);
        repo.upsert_item(&distant).unwrap();
        repo.upsert_item(&last).unwrap();
        repo.upsert_item(&sample("due", now - Duration::minutes(5))).unwrap();

        let loaded = repo.get_item("distant").unwrap().unwrap();
        assert_eq!(loaded.due_at.timestamp_micros(), distant.due_at.timestamp_micros());
        let loaded = repo.get_item("last").unwrap().unwrap();
        assert_eq!(loaded.due_at.timestamp_micros(), last.due_at.timestamp_micros());

        let due = repo.get_due_items(now, 10).unwrap();
        let ids: Vec<_> = due.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["due"]);
    }

    #[test]
    fn failed_transaction_rolls_back() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let now = Utc::now();
        let mut item = sample("t", now);
        repo.upsert_item(&item).unwrap();

        item.interval = 9;
        let result: Result<()> = repo.transaction(|tx| {
            tx.upsert_item(&item)?;
            tx.archive_item("t", now)?;
            Err(DbError::InvalidData("session log unavailable".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(repo.get_item("t").unwrap().unwrap().interval, 1);
        assert!(!repo.is_archived("t").unwrap());
    }

    #[test]
    fn committed_transaction_keeps_writes() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let now = Utc::now();
        repo.upsert_item(&sample("t", now)).unwrap();

        let archived = repo.transaction(|tx| tx.archive_item("t", now)).unwrap();

        assert!(archived);
        assert!(repo.is_archived("t").unwrap());
    }

    #[test]
    fn missing_item_is_none() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        assert!(repo.get_item("nope").unwrap().is_none());
    }

    #[test]
    fn upsert_overwrites_scheduling_state() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let mut item = sample("p1", Utc::now());
        repo.upsert_item(&item).unwrap();

        item.ease = 2.15;
        item.interval = 3;
        item.mastery_score = 0.25;
        repo.upsert_item(&item).unwrap();

        let loaded = repo.get_item("p1").unwrap().unwrap();
        assert_eq!(loaded.ease, 2.15);
        assert_eq!(loaded.interval, 3);
        assert_eq!(loaded.mastery_score, 0.25);
    }

    #[test]
    fn due_items_are_ordered_and_filtered() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let now = Utc::now();
        repo.upsert_item(&sample("late", now - Duration::hours(1))).unwrap();
        repo.upsert_item(&sample("early", now - Duration::days(2))).unwrap();
        repo.upsert_item(&sample("future", now + Duration::days(1))).unwrap();

        let due = repo.get_due_items(now, 10).unwrap();
        let ids: Vec<_> = due.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);

        let limited = repo.get_due_items(now, 1).unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn archived_items_leave_the_due_queue() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let now = Utc::now();
        repo.upsert_item(&sample("a", now - Duration::days(1))).unwrap();

        assert!(repo.archive_item("a", now).unwrap());
        assert!(!repo.archive_item("a", now).unwrap());
        assert!(repo.is_archived("a").unwrap());
        assert!(repo.get_due_items(now, 10).unwrap().is_empty());

        // Later updates keep the archival.
        repo.upsert_item(&sample("a", now - Duration::days(1))).unwrap();
        assert!(repo.is_archived("a").unwrap());
    }

    #[test]
    fn unknown_item_is_not_archived() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        assert!(!repo.is_archived("ghost").unwrap());
        assert!(!repo.archive_item("ghost", Utc::now()).unwrap());
    }

    #[test]
    fn session_log_round_trip() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let now = Utc::now();
        let mut session = ReviewSession::start(vec![sample("a", now), sample("b", now)], now);
        session.submit_grade(Grade::Good, now).unwrap();
        session.end_early(now);
        repo.record_session(&session).unwrap();

        let records = repo.recent_sessions(5).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, session.id);
        assert_eq!(record.end_reason, Some(SessionEnd::EndedEarly));
        assert_eq!(
            record.stats,
            SessionStats {
                correct: 1,
                incorrect: 0,
                total: 1
            }
        );
        assert_eq!(record.archived_count, 0);
    }
}
