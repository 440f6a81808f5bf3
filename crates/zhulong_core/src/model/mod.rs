//! Domain records owned by the stores.
//!
//! # Responsibility
//! - Define the persisted shapes for memos, messages, contents and feedback.
//! - Own write-side validation shared by every store.
//!
//! # Invariants
//! - Ids are assigned by storage and never reused.
//! - Timestamps are Unix epoch milliseconds.
//! - Deletion is a hard delete; there are no tombstones.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod content;
pub mod memo;
pub mod message;

/// Storage-assigned row identifier shared by every entity.
pub type EntityId = i64;

/// Entity families, used to qualify not-found errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Memo,
    Message,
    Content,
    Feedback,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Memo => "memo",
            Self::Message => "message",
            Self::Content => "content",
            Self::Feedback => "feedback",
        };
        f.write_str(name)
    }
}

/// Write-side validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty after trimming.
    EmptyField(&'static str),
    /// Feedback score outside the accepted range.
    ScoreOutOfRange(i64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "`{field}` must not be blank"),
            Self::ScoreOutOfRange(score) => write!(
                f,
                "score {score} is outside {}..={}",
                content::MIN_FEEDBACK_SCORE,
                content::MAX_FEEDBACK_SCORE
            ),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}
