//! Mastery-tracking scheduler.
//!
//! An SM-2 style ease/interval schedule extended with a mastery score and a
//! streak counter. Items that are both well known and consistently recalled
//! are flagged for archival.

use super::{SchedulingAlgorithm, SchedulingResult};
use crate::types::{Grade, ItemBand, ReviewItem, INITIAL_EASE};
use chrono::{DateTime, Duration, Utc};

/// Interval (days) from which an item counts as young.
const YOUNG_INTERVAL: u32 = 7;
/// Interval (days) from which an item counts as mature.
const MATURE_INTERVAL: u32 = 21;
/// Slack for the mastery threshold; scores are unrounded float sums.
const MASTERY_EPSILON: f64 = 1e-9;

/// Mastery scheduler with configurable parameters.
#[derive(Debug, Clone)]
pub struct MasteryScheduler {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    pub again_penalty: f64,
    pub hard_penalty: f64,
    pub easy_ease_bonus: f64,
    pub hard_multiplier: f64,
    pub easy_multiplier: f64,
    pub mastery_again: f64,
    pub mastery_hard: f64,
    pub mastery_good: f64,
    pub mastery_easy: f64,
    pub mastery_threshold: f64,
    pub streak_threshold: u32,
}

impl Default for MasteryScheduler {
    fn default() -> Self {
        Self {
            initial_ease: INITIAL_EASE,
            minimum_ease: 1.3,
            again_penalty: 0.20,
            hard_penalty: 0.15,
            easy_ease_bonus: 0.15,
            hard_multiplier: 1.2,
            easy_multiplier: 1.3,
            mastery_again: -0.10,
            mastery_hard: 0.05,
            mastery_good: 0.15,
            mastery_easy: 0.25,
            mastery_threshold: 0.9,
            streak_threshold: 10,
        }
    }
}

impl SchedulingAlgorithm for MasteryScheduler {
    fn name(&self) -> &'static str {
        "mastery"
    }

    fn initial_ease(&self) -> f64 {
        self.initial_ease
    }

    fn advance(&self, item: &ReviewItem, grade: Grade, now: DateTime<Utc>) -> SchedulingResult {
        let ease = self.next_ease(item.ease, grade);
        let interval = self.next_interval(item.interval, grade, ease);
        let mastery_score = self.next_mastery(item.mastery_score, grade);
        let consecutive_correct = if grade.is_correct() {
            item.consecutive_correct.saturating_add(1)
        } else {
            0
        };
        let next_due = add_days(now, interval);

        let updated = ReviewItem {
            ease,
            interval,
            due_at: next_due,
            consecutive_correct,
            mastery_score,
            ..item.clone()
        };

        SchedulingResult {
            archive: self.is_archivable(&updated),
            band: self.band(&updated),
            item: updated,
            next_due,
        }
    }

    fn band(&self, item: &ReviewItem) -> ItemBand {
        if self.is_archivable(item) {
            ItemBand::Mastered
        } else if item.consecutive_correct == 0 && item.mastery_score <= 0.0 {
            ItemBand::New
        } else if item.interval >= MATURE_INTERVAL {
            ItemBand::Mature
        } else if item.interval >= YOUNG_INTERVAL {
            ItemBand::Young
        } else {
            ItemBand::Learning
        }
    }
}

impl MasteryScheduler {
    /// Whether the item has crossed both the mastery and the streak threshold.
    pub fn is_archivable(&self, item: &ReviewItem) -> bool {
        item.mastery_score >= self.mastery_threshold - MASTERY_EPSILON
            && item.consecutive_correct >= self.streak_threshold
    }

    fn next_ease(&self, ease: f64, grade: Grade) -> f64 {
        let ease = match grade {
            Grade::Again => (ease - self.again_penalty).max(self.minimum_ease),
            Grade::Hard => (ease - self.hard_penalty).max(self.minimum_ease),
            Grade::Good => ease,
            Grade::Easy => ease + self.easy_ease_bonus,
        };
        // Rounding never takes a clamped value below the floor.
        round_cents(ease).max(self.minimum_ease)
    }

    fn next_interval(&self, interval: u32, grade: Grade, ease: f64) -> u32 {
        let current = f64::from(interval);
        let days = match grade {
            Grade::Again => 1.0,
            Grade::Hard => current * self.hard_multiplier,
            Grade::Good => current * ease,
            Grade::Easy => current * ease * self.easy_multiplier,
        };
        // `as` saturates at u32::MAX for very long schedules.
        days.round().max(1.0) as u32
    }

    fn next_mastery(&self, score: f64, grade: Grade) -> f64 {
        let delta = match grade {
            Grade::Again => self.mastery_again,
            Grade::Hard => self.mastery_hard,
            Grade::Good => self.mastery_good,
            Grade::Easy => self.mastery_easy,
        };
        (score + delta).clamp(0.0, 1.0)
    }
}

/// Round to two decimal places, halves away from zero.
fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn add_days(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now.checked_add_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
