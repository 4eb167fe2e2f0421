//! Scheduling algorithms.

pub mod mastery;

use crate::types::{Grade, ItemBand, ReviewItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use mastery::MasteryScheduler;

/// Result of scheduling an item after a review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingResult {
    pub item: ReviewItem,
    /// The item crossed the mastery threshold and should leave the due queue.
    pub archive: bool,
    pub band: ItemBand,
    pub next_due: DateTime<Utc>,
}

/// Trait for spaced repetition algorithms.
pub trait SchedulingAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// Ease factor for an item entering the curriculum.
    fn initial_ease(&self) -> f64;

    /// Compute the item's next state after it was graded at `now`.
    fn advance(&self, item: &ReviewItem, grade: Grade, now: DateTime<Utc>) -> SchedulingResult;

    /// Band the item currently sits in.
    fn band(&self, item: &ReviewItem) -> ItemBand;
}

/// Get algorithm by name.
pub fn get_algorithm(name: &str) -> Option<Box<dyn SchedulingAlgorithm>> {
    match name {
        "mastery" => Some(Box::new(MasteryScheduler::default())),
        _ => None,
    }
}
