//! Message log repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `mark_read` is idempotent: re-marking a read message succeeds.
//! - Lists are ordered newest first.
//! - Writes require an explicit priority; defaulting happens above this layer.

use super::{
    bool_to_int, ensure_connection_ready, int_to_bool, normalize_list_limit, RepoError,
    RepoResult,
};
use crate::model::message::{MessageId, NewMessage, Priority, WeChatMessage};
use crate::model::EntityKind;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const MESSAGE_COLUMNS: &str = "id, sender, content, priority, is_read, created_at";
const MESSAGE_REQUIRED_COLUMNS: &[&str] =
    &["id", "sender", "content", "priority", "is_read", "created_at"];

/// Query options for listing messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageListQuery {
    /// Exact priority filter.
    pub priority: Option<Priority>,
    /// Hide messages already marked read.
    pub unread_only: bool,
    /// Defaults to 50 and clamps to 200.
    pub limit: Option<u32>,
}

/// Repository interface for message persistence.
pub trait MessageRepository {
    fn create_message(&self, message: &NewMessage, priority: Priority) -> RepoResult<WeChatMessage>;
    fn get_message(&self, id: MessageId) -> RepoResult<Option<WeChatMessage>>;
    fn list_messages(&self, query: &MessageListQuery) -> RepoResult<Vec<WeChatMessage>>;
    fn mark_read(&self, id: MessageId) -> RepoResult<()>;
    fn delete_message(&self, id: MessageId) -> RepoResult<()>;
}

/// SQLite-backed message repository.
pub struct SqliteMessageRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMessageRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "wechat_messages", MESSAGE_REQUIRED_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl MessageRepository for SqliteMessageRepository<'_> {
    fn create_message(&self, message: &NewMessage, priority: Priority) -> RepoResult<WeChatMessage> {
        message.validate()?;

        let created = self.conn.query_row(
            &format!(
                "INSERT INTO wechat_messages (sender, content, priority)
                 VALUES (?1, ?2, ?3)
                 RETURNING {MESSAGE_COLUMNS};"
            ),
            params![
                message.sender.trim(),
                message.content.trim(),
                priority.as_str()
            ],
            |row| Ok(parse_message_row(row)),
        )??;

        Ok(created)
    }

    fn get_message(&self, id: MessageId) -> RepoResult<Option<WeChatMessage>> {
        self.conn
            .query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM wechat_messages WHERE id = ?1;"),
                [id],
                |row| Ok(parse_message_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_messages(&self, query: &MessageListQuery) -> RepoResult<Vec<WeChatMessage>> {
        let mut sql = format!("SELECT {MESSAGE_COLUMNS} FROM wechat_messages WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(priority) = query.priority {
            sql.push_str(" AND priority = ?");
            bind_values.push(Value::Text(priority.as_str().to_string()));
        }

        if query.unread_only {
            sql.push_str(" AND is_read = 0");
        }

        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ?");
        bind_values.push(Value::Integer(i64::from(normalize_list_limit(query.limit))));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut messages = Vec::new();
        while let Some(row) = rows.next()? {
            messages.push(parse_message_row(row)?);
        }

        Ok(messages)
    }

    fn mark_read(&self, id: MessageId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE wechat_messages SET is_read = ?2 WHERE id = ?1;",
            params![id, bool_to_int(true)],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Message, id));
        }

        Ok(())
    }

    fn delete_message(&self, id: MessageId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM wechat_messages WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Message, id));
        }

        Ok(())
    }
}

fn parse_message_row(row: &Row<'_>) -> RepoResult<WeChatMessage> {
    let priority_text: String = row.get("priority")?;
    let priority = priority_text.parse::<Priority>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in wechat_messages.priority"
        ))
    })?;

    Ok(WeChatMessage {
        id: row.get("id")?,
        sender: row.get("sender")?,
        content: row.get("content")?,
        priority,
        read: int_to_bool(row.get("is_read")?, "wechat_messages.is_read")?,
        created_at: row.get("created_at")?,
    })
}
