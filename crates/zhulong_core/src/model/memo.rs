//! Memo domain model.
//!
//! # Invariants
//! - `text` is never blank.
//! - A completed memo never appears in reminder results.
//! - `due_at` is optional; memos without it are never reminded.

use super::{require_text, EntityId, ValidationError};
use serde::{Deserialize, Serialize};

/// Stable memo identifier.
pub type MemoId = EntityId;

/// A user-created reminder item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memo {
    pub id: MemoId,
    /// One-line memo text as entered by the user.
    pub text: String,
    /// Optional longer body. Empty when not provided.
    pub details: String,
    /// Unix epoch milliseconds.
    pub due_at: Option<i64>,
    pub completed: bool,
    /// Unix epoch milliseconds, assigned by storage.
    pub created_at: i64,
}

/// Client-supplied fields for memo creation.
///
/// `id`, `completed` and `created_at` are always assigned server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewMemo {
    pub text: String,
    pub details: String,
    pub due_at: Option<i64>,
}

impl NewMemo {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_due_at(mut self, due_at: Option<i64>) -> Self {
        self.due_at = due_at;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("text", &self.text)
    }
}
