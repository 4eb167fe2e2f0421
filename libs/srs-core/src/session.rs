//! Review session coordinator.
//!
//! A session is a fixed queue of due items presented in the order given.
//! Each grade runs the current item through a scheduling algorithm, stores the
//! updated item back in its queue slot and moves the cursor forward. The
//! session never persists anything; callers hand [`ReviewSession::items`] and
//! [`ReviewSession::stats`] to their storage once it completes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::algorithm::{MasteryScheduler, SchedulingAlgorithm};
use crate::error::{Result, SessionError};
use crate::types::{Grade, ItemBand, ReviewItem, SessionStats};

/// Why a session reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEnd {
    /// Every queued item was graded.
    Exhausted,
    /// The caller stopped before the queue ran out.
    EndedEarly,
}

/// Outcome of grading the current item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeOutcome {
    pub item: ReviewItem,
    pub archive: bool,
    pub band: ItemBand,
    /// Zero-based queue index of the graded item.
    pub position: usize,
}

/// Where the learner is in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProgress {
    /// One-based index of the item on screen, or `total` once completed.
    pub position: usize,
    pub total: usize,
}

/// Final figures of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub stats: SessionStats,
    pub accuracy: f64,
    pub reviewed: usize,
    pub archived: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_reason: Option<SessionEnd>,
}

/// One study session over a snapshot of due items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSession {
    pub id: Uuid,
    queue: Vec<ReviewItem>,
    cursor: usize,
    stats: SessionStats,
    completed: bool,
    end_reason: Option<SessionEnd>,
    archived: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl ReviewSession {
    /// Start a session over `items` in the supplied order.
    ///
    /// An empty queue yields a session that is already complete.
    pub fn start(items: Vec<ReviewItem>, now: DateTime<Utc>) -> Self {
        let empty = items.is_empty();
        Self {
            id: Uuid::new_v4(),
            queue: items,
            cursor: 0,
            stats: SessionStats::default(),
            completed: empty,
            end_reason: empty.then_some(SessionEnd::Exhausted),
            archived: Vec::new(),
            started_at: now,
            ended_at: empty.then_some(now),
        }
    }

    /// Grade the current item with the default scheduler.
    pub fn submit_grade(&mut self, grade: Grade, now: DateTime<Utc>) -> Result<GradeOutcome> {
        self.submit_grade_with(&MasteryScheduler::default(), grade, now)
    }

    /// Grade the current item with `algorithm`.
    ///
    /// Fails with [`SessionError::OutOfSequence`] once the session is
    /// completed; in that case nothing is modified.
    pub fn submit_grade_with(
        &mut self,
        algorithm: &dyn SchedulingAlgorithm,
        grade: Grade,
        now: DateTime<Utc>,
    ) -> Result<GradeOutcome> {
        if self.completed {
            return Err(SessionError::OutOfSequence);
        }
        let position = self.cursor;
        let current = self
            .queue
            .get(position)
            .ok_or(SessionError::OutOfSequence)?;

        let result = algorithm.advance(current, grade, now);

        self.queue[position] = result.item.clone();
        self.stats.record(grade);
        if result.archive {
            self.archived.push(result.item.id.clone());
        }
        self.cursor += 1;
        if self.cursor >= self.queue.len() {
            self.finish(SessionEnd::Exhausted, now);
        }

        Ok(GradeOutcome {
            item: result.item,
            archive: result.archive,
            band: result.band,
            position,
        })
    }

    /// Stop the session before the queue is exhausted.
    ///
    /// Calling this on a completed session changes nothing.
    pub fn end_early(&mut self, now: DateTime<Utc>) {
        if !self.completed {
            self.finish(SessionEnd::EndedEarly, now);
        }
    }

    /// The item to present next, or `None` once the session is completed.
    pub fn current_item(&self) -> Option<&ReviewItem> {
        if self.completed {
            None
        } else {
            self.queue.get(self.cursor)
        }
    }

    /// Whether the session has ended, by exhaustion or early stop.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Why the session ended, `None` while it is running.
    pub fn end_reason(&self) -> Option<SessionEnd> {
        self.end_reason
    }

    /// Grades recorded so far.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Zero-based index of the next item to grade.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Queue in presentation order; graded slots hold the updated items.
    pub fn items(&self) -> &[ReviewItem] {
        &self.queue
    }

    /// Items graded so far, already updated by the scheduler.
    pub fn reviewed_items(&self) -> &[ReviewItem] {
        &self.queue[..self.cursor]
    }

    /// Ids flagged for archival during this session, in grading order.
    pub fn archived(&self) -> &[String] {
        &self.archived
    }

    /// Number of items in the queue, graded or not.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Items not yet graded. Zero once the session has ended.
    pub fn remaining(&self) -> usize {
        if self.completed {
            0
        } else {
            self.queue.len() - self.cursor
        }
    }

    /// One-based position of the item on screen, out of the queue length.
    pub fn progress(&self) -> SessionProgress {
        let total = self.queue.len();
        let position = if self.completed {
            total
        } else {
            self.cursor + 1
        };
        SessionProgress { position, total }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            stats: self.stats,
            accuracy: self.stats.accuracy(),
            reviewed: self.cursor,
            archived: self.archived.clone(),
            end_reason: self.end_reason,
        }
    }

    fn finish(&mut self, reason: SessionEnd, now: DateTime<Utc>) {
        self.completed = true;
        self.end_reason = Some(reason);
        self.ended_at = Some(now);
    }
}
