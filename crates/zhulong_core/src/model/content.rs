//! Content and feedback models.
//!
//! # Invariants
//! - Feedback always references an existing content row.
//! - Feedback score stays within `MIN_FEEDBACK_SCORE..=MAX_FEEDBACK_SCORE`.
//! - Feedback never mutates the content it refers to.

use super::{require_text, EntityId, ValidationError};
use serde::{Deserialize, Serialize};

pub type ContentId = EntityId;
pub type FeedbackId = EntityId;

pub const MIN_FEEDBACK_SCORE: i64 = 0;
pub const MAX_FEEDBACK_SCORE: i64 = 5;

/// An ingested piece of information eligible for feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: ContentId,
    pub title: String,
    pub body: String,
    /// Link back to the original item. Empty when not known.
    pub url: String,
    /// Publisher or feed name.
    pub source: String,
    /// Interest relevance computed at ingestion time.
    pub relevance_score: f64,
    /// Unix epoch milliseconds, assigned by storage.
    pub created_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewContent {
    pub title: String,
    pub body: String,
    pub url: String,
    pub source: String,
}

impl NewContent {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)
    }
}

/// User rating attached to one content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: FeedbackId,
    pub content_id: ContentId,
    pub score: i64,
    pub comment: Option<String>,
    /// Unix epoch milliseconds, assigned by storage.
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeedback {
    pub content_id: ContentId,
    pub score: i64,
    pub comment: Option<String>,
}

impl NewFeedback {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_FEEDBACK_SCORE..=MAX_FEEDBACK_SCORE).contains(&self.score) {
            return Err(ValidationError::ScoreOutOfRange(self.score));
        }
        Ok(())
    }

    /// Whether this rating should strengthen the content's keywords.
    pub fn is_positive(&self) -> bool {
        self.score >= 4
    }
}
