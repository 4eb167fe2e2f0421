//! Core spaced repetition library.
//!
//! Provides:
//! - The mastery scheduler: pure state transitions for a graded review item
//! - The review session coordinator: queue, cursor and per-session stats
//! - Shared types (ReviewItem, Grade, SessionStats, etc.)

pub mod algorithm;
pub mod error;
pub mod session;
pub mod types;

pub use algorithm::{get_algorithm, MasteryScheduler, SchedulingAlgorithm, SchedulingResult};
pub use error::{Result, SessionError};
pub use session::{GradeOutcome, ReviewSession, SessionEnd, SessionProgress, SessionSummary};
pub use types::{
    CefrLevel, Grade, ItemBand, ItemKind, ItemPayload, ReviewItem, SessionStats, INITIAL_EASE,
};
