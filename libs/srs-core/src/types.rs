//! Core types for the review scheduler.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Ease factor given to an item when it enters the curriculum.
pub const INITIAL_EASE: f64 = 2.0;

/// Kind of learnable item. Presentation only; the scheduler never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Word,
    Phrase,
    Grammar,
    Pronunciation,
}

impl Default for ItemKind {
    fn default() -> Self {
        Self::Word
    }
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Phrase => "phrase",
            Self::Grammar => "grammar",
            Self::Pronunciation => "pronunciation",
        }
    }

    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "word" => Some(Self::Word),
            "phrase" => Some(Self::Phrase),
            "grammar" => Some(Self::Grammar),
            "pronunciation" => Some(Self::Pronunciation),
            _ => None,
        }
    }
}

/// CEFR proficiency level, ordered from A1 (beginner) to C2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl Default for CefrLevel {
    fn default() -> Self {
        Self::A1
    }
}

impl CefrLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::C1 => "C1",
            Self::C2 => "C2",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "A1" => Some(Self::A1),
            "A2" => Some(Self::A2),
            "B1" => Some(Self::B1),
            "B2" => Some(Self::B2),
            "C1" => Some(Self::C1),
            "C2" => Some(Self::C2),
            _ => None,
        }
    }
}

impl fmt::Display for CefrLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Learning content carried by an item. Inert as far as scheduling goes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPayload {
    /// Text in the language being learned.
    pub target: String,
    pub translation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

impl ItemPayload {
    pub fn new(target: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            translation: translation.into(),
            ..Default::default()
        }
    }

    pub fn with_phonetic(mut self, phonetic: impl Into<String>) -> Self {
        self.phonetic = Some(phonetic.into());
        self
    }

    pub fn with_examples<I, S>(mut self, examples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.examples = examples.into_iter().map(Into::into).collect();
        self
    }
}

/// A learnable item together with its scheduling state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub id: String,
    pub kind: ItemKind,
    pub payload: ItemPayload,
    pub level: CefrLevel,
    pub difficulty: u32,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub ease: f64,
    pub interval: u32,
    pub due_at: DateTime<Utc>,
    pub consecutive_correct: u32,
    pub mastery_score: f64,
}

impl ReviewItem {
    /// Create an item that has just entered the curriculum and is due at `now`.
    pub fn new(
        id: impl Into<String>,
        kind: ItemKind,
        payload: ItemPayload,
        level: CefrLevel,
        difficulty: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            payload,
            level,
            difficulty: difficulty.max(1),
            tags: BTreeSet::new(),
            ease: INITIAL_EASE,
            interval: 1,
            due_at: now,
            consecutive_correct: 0,
            mastery_score: 0.0,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due_at <= now
    }
}

/// Grade for a review, on a 4-point quality scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    /// Total failure: the learner forgot the item.
    Again,
    Hard,
    Good,
    /// Recalled with no effort.
    Easy,
}

impl Grade {
    /// Convert to 4-point numeric value (1-4).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Again => 1,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 4,
        }
    }

    /// Create from 4-point numeric value.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Again),
            2 => Some(Self::Hard),
            3 => Some(Self::Good),
            4 => Some(Self::Easy),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        }
    }

    /// Any grade other than `Again` counts as a correct answer.
    pub fn is_correct(self) -> bool {
        self != Self::Again
    }
}

impl TryFrom<u8> for Grade {
    type Error = SessionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or_else(|| SessionError::InvalidGrade(value.to_string()))
    }
}

impl FromStr for Grade {
    type Err = SessionError;

    /// Accepts the grade names (any case) or their numeric values `1`-`4`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "again" | "1" => Ok(Self::Again),
            "hard" | "2" => Ok(Self::Hard),
            "good" | "3" => Ok(Self::Good),
            "easy" | "4" => Ok(Self::Easy),
            _ => Err(SessionError::InvalidGrade(trimmed.to_string())),
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Informal maturity band of an item, derived from its scheduling fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemBand {
    New,
    Learning,
    Young,
    Mature,
    Mastered,
}

/// Counters accumulated over one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub correct: u32,
    pub incorrect: u32,
    pub total: u32,
}

impl SessionStats {
    pub fn record(&mut self, grade: Grade) {
        self.total += 1;
        if grade.is_correct() {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
    }

    /// Share of correct answers, 0.0 for an empty session.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.total)
        }
    }
}
