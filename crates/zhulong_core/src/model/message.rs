//! WeChat message log model.
//!
//! # Invariants
//! - `content` is never blank.
//! - `read` only ever moves from `false` to `true`.

use super::{require_text, EntityId, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Stable message identifier.
pub type MessageId = EntityId;

/// Handling urgency for a logged message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Can wait until the end of the day.
    Low,
    /// Should be handled within the hour.
    Normal,
    /// Needs attention right away.
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    /// Accepts the canonical names plus the legacy `urgent`/`routine` labels.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" | "routine" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" | "urgent" => Ok(Self::High),
            other => Err(format!(
                "unsupported priority `{other}`; expected low|normal|high"
            )),
        }
    }
}

/// A logged chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeChatMessage {
    pub id: MessageId,
    /// Display name of the sender. Empty when unknown.
    pub sender: String,
    pub content: String,
    pub priority: Priority,
    pub read: bool,
    /// Unix epoch milliseconds, assigned by storage.
    pub created_at: i64,
}

/// Client-supplied fields for message creation.
///
/// When `priority` is `None` the message service derives it from keywords.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewMessage {
    pub sender: String,
    pub content: String,
    pub priority: Option<Priority>,
}

impl NewMessage {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("content", &self.content)
    }
}
