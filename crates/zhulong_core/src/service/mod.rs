//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Translate repository failures into the four caller-facing error kinds.
//! - Keep the HTTP layer decoupled from storage details.
//!
//! # Invariants
//! - Services never swallow repository errors; not-found and validation
//!   failures keep their meaning, everything else becomes `Internal`.

use crate::classifier::ClassifyError;
use crate::db::DbError;
use crate::model::{EntityId, EntityKind, ValidationError};
use crate::ranking::RankingSettings;
use crate::repo::content_repo::{SqliteContentRepository, SqliteFeedbackRepository};
use crate::repo::memo_repo::SqliteMemoRepository;
use crate::repo::message_repo::SqliteMessageRepository;
use crate::repo::RepoError;
use crate::router::InputRouter;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod content_service;
pub mod memo_service;
pub mod message_service;

pub use content_service::ContentService;
pub use memo_service::MemoService;
pub use message_service::MessageService;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Caller-facing error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        }
    }
}

/// Error returned by every service and by the input router.
#[derive(Debug)]
pub enum ServiceError {
    /// Malformed, blank or out-of-range input.
    InvalidInput(String),
    /// Unknown id or dangling reference.
    NotFound { entity: EntityKind, id: EntityId },
    /// Lost a race for the database write lock.
    Conflict(String),
    /// Unexpected storage failure.
    Internal(RepoError),
}

impl ServiceError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::Internal(err) => write!(f, "internal error: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Internal(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Validation(err) => Self::InvalidInput(err.to_string()),
            RepoError::Db(err) if err.is_busy() => Self::Conflict(err.to_string()),
            other => Self::Internal(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidInput(value.to_string())
    }
}

impl From<DbError> for ServiceError {
    fn from(value: DbError) -> Self {
        RepoError::from(value).into()
    }
}

impl From<ClassifyError> for ServiceError {
    fn from(value: ClassifyError) -> Self {
        Self::InvalidInput(value.to_string())
    }
}

/// SQLite-backed services sharing one connection.
pub struct Stores<'conn> {
    pub memos: MemoService<SqliteMemoRepository<'conn>>,
    pub messages: MessageService<SqliteMessageRepository<'conn>>,
    pub contents: ContentService<SqliteContentRepository<'conn>, SqliteFeedbackRepository<'conn>>,
}

impl<'conn> Stores<'conn> {
    /// Builds every store over a migrated connection.
    pub fn try_new(conn: &'conn Connection, ranking: RankingSettings) -> ServiceResult<Self> {
        Ok(Self {
            memos: MemoService::new(SqliteMemoRepository::try_new(conn)?),
            messages: MessageService::new(SqliteMessageRepository::try_new(conn)?),
            contents: ContentService::new(
                SqliteContentRepository::try_new(conn)?,
                SqliteFeedbackRepository::try_new(conn)?,
                ranking,
            ),
        })
    }

    pub fn router(
        &self,
    ) -> InputRouter<
        '_,
        SqliteMemoRepository<'conn>,
        SqliteMessageRepository<'conn>,
        SqliteContentRepository<'conn>,
        SqliteFeedbackRepository<'conn>,
    > {
        InputRouter::new(&self.memos, &self.messages, &self.contents)
    }
}
