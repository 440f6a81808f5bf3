//! Core domain logic for the Zhulong personal assistant backend.
//! This crate owns classification, storage and every business invariant;
//! the HTTP server is a thin adapter on top.

pub mod classifier;
pub mod context;
pub mod db;
pub mod logging;
pub mod model;
pub mod ranking;
pub mod reminder;
pub mod repo;
pub mod router;
pub mod service;

pub use classifier::{classify, ClassificationResult, ClassifyError, InputType, IntentKind};
pub use context::RequestContext;
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, init_logging_with, logging_status, LogEcho};
pub use model::content::{Content, ContentId, Feedback, FeedbackId, NewContent, NewFeedback};
pub use model::memo::{Memo, MemoId, NewMemo};
pub use model::message::{MessageId, NewMessage, Priority, WeChatMessage};
pub use model::{EntityId, EntityKind, ValidationError};
pub use ranking::RankingSettings;
pub use reminder::{Reminder, ReminderGroup, ReminderSettings, DEFAULT_REMINDER_WINDOW};
pub use repo::content_repo::{ContentListQuery, FeedbackListQuery};
pub use repo::memo_repo::MemoListQuery;
pub use repo::message_repo::MessageListQuery;
pub use repo::{RepoError, RepoResult};
pub use router::{InputRouter, RoutedResult};
pub use service::{ErrorKind, ServiceError, ServiceResult, Stores};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
