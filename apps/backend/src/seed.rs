//! Starter items for demos and local development.

use chrono::{DateTime, Utc};
use srs_core::{CefrLevel, ItemKind, ItemPayload, ReviewItem};

use crate::db::{DbError, ItemRepository};

/// The three French starter items, all due at `now`.
pub fn sample_items(now: DateTime<Utc>) -> Vec<ReviewItem> {
    vec![
        ReviewItem {
            ease: 2.0,
            interval: 1,
            consecutive_correct: 3,
            mastery_score: 0.6,
            ..ReviewItem::new(
                "1",
                ItemKind::Word,
                ItemPayload::new("bonjour", "hello")
                    .with_phonetic("bɔ̃ʒuʁ")
                    .with_examples(["Bonjour, comment allez-vous?"]),
                CefrLevel::A1,
                1,
                now,
            )
            .with_tags(["greetings", "basic"])
        },
        ReviewItem {
            ease: 3.0,
            interval: 3,
            consecutive_correct: 5,
            mastery_score: 0.8,
            ..ReviewItem::new(
                "2",
                ItemKind::Phrase,
                ItemPayload::new("Comment allez-vous?", "How are you?")
                    .with_examples(["Bonjour, comment allez-vous?", "Je vais bien, merci."]),
                CefrLevel::A1,
                2,
                now,
            )
            .with_tags(["greetings", "questions"])
        },
        ReviewItem {
            ease: 2.0,
            interval: 1,
            consecutive_correct: 2,
            mastery_score: 0.4,
            ..ReviewItem::new(
                "3",
                ItemKind::Grammar,
                ItemPayload::new("Je suis", "I am")
                    .with_examples(["Je suis étudiant.", "Je suis fatigué."]),
                CefrLevel::A1,
                2,
                now,
            )
            .with_tags(["grammar", "pronouns"])
        },
    ]
}

/// Insert the starter items that are not stored yet. Returns how many were added.
pub fn seed_sample_items<R: ItemRepository>(repo: &R, now: DateTime<Utc>) -> Result<usize, DbError> {
    let mut inserted = 0;
    for item in sample_items(now) {
        if repo.get_item(&item.id)?.is_none() {
            repo.upsert_item(&item)?;
            inserted += 1;
        }
    }
    Ok(inserted)
}
