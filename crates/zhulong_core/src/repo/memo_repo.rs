//! Memo repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/get/list/complete/delete over the `memos` table.
//! - Serve reminder candidates without touching memo state.
//!
//! # Invariants
//! - `complete` on an already completed memo succeeds and changes nothing.
//! - Deleted memos are gone; their ids are never handed out again.
//! - Completed memos are excluded from lists unless explicitly requested.

use super::{
    bool_to_int, ensure_connection_ready, int_to_bool, normalize_list_limit, RepoError,
    RepoResult,
};
use crate::model::memo::{Memo, MemoId, NewMemo};
use crate::model::EntityKind;
use rusqlite::{params, Connection, OptionalExtension, Row};

const MEMO_COLUMNS: &str = "id, text, details, due_at, completed, created_at";
const MEMO_REQUIRED_COLUMNS: &[&str] = &["id", "text", "details", "due_at", "completed", "created_at"];

/// Query options for listing memos.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoListQuery {
    /// Completed memos are hidden unless this is set.
    pub include_completed: bool,
    /// Defaults to 50 and clamps to 200.
    pub limit: Option<u32>,
}

/// Repository interface for memo persistence.
pub trait MemoRepository {
    fn create_memo(&self, memo: &NewMemo) -> RepoResult<Memo>;
    fn get_memo(&self, id: MemoId) -> RepoResult<Option<Memo>>;
    fn list_memos(&self, query: &MemoListQuery) -> RepoResult<Vec<Memo>>;
    fn complete_memo(&self, id: MemoId) -> RepoResult<()>;
    fn delete_memo(&self, id: MemoId) -> RepoResult<()>;
    /// Open memos with `due_at <= horizon`, earliest first.
    fn list_due_memos(&self, horizon: i64) -> RepoResult<Vec<Memo>>;
}

/// SQLite-backed memo repository.
pub struct SqliteMemoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemoRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "memos", MEMO_REQUIRED_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl MemoRepository for SqliteMemoRepository<'_> {
    fn create_memo(&self, memo: &NewMemo) -> RepoResult<Memo> {
        memo.validate()?;

        let created = self.conn.query_row(
            &format!(
                "INSERT INTO memos (text, details, due_at)
                 VALUES (?1, ?2, ?3)
                 RETURNING {MEMO_COLUMNS};"
            ),
            params![memo.text.trim(), memo.details.as_str(), memo.due_at],
            |row| Ok(parse_memo_row(row)),
        )??;

        Ok(created)
    }

    fn get_memo(&self, id: MemoId) -> RepoResult<Option<Memo>> {
        self.conn
            .query_row(
                &format!("SELECT {MEMO_COLUMNS} FROM memos WHERE id = ?1;"),
                [id],
                |row| Ok(parse_memo_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_memos(&self, query: &MemoListQuery) -> RepoResult<Vec<Memo>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEMO_COLUMNS}
             FROM memos
             WHERE (?1 = 1 OR completed = 0)
             ORDER BY created_at DESC, id DESC
             LIMIT ?2;"
        ))?;

        let limit = normalize_list_limit(query.limit);
        let mut rows = stmt.query(params![
            bool_to_int(query.include_completed),
            i64::from(limit)
        ])?;
        let mut memos = Vec::new();
        while let Some(row) = rows.next()? {
            memos.push(parse_memo_row(row)?);
        }

        Ok(memos)
    }

    fn complete_memo(&self, id: MemoId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("UPDATE memos SET completed = 1 WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Memo, id));
        }

        Ok(())
    }

    fn delete_memo(&self, id: MemoId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM memos WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Memo, id));
        }

        Ok(())
    }

    fn list_due_memos(&self, horizon: i64) -> RepoResult<Vec<Memo>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEMO_COLUMNS}
             FROM memos
             WHERE completed = 0
               AND due_at IS NOT NULL
               AND due_at <= ?1
             ORDER BY due_at ASC, id ASC;"
        ))?;

        let mut rows = stmt.query([horizon])?;
        let mut memos = Vec::new();
        while let Some(row) = rows.next()? {
            memos.push(parse_memo_row(row)?);
        }

        Ok(memos)
    }
}

fn parse_memo_row(row: &Row<'_>) -> RepoResult<Memo> {
    Ok(Memo {
        id: row.get("id")?,
        text: row.get("text")?,
        details: row.get("details")?,
        due_at: row.get("due_at")?,
        completed: int_to_bool(row.get("completed")?, "memos.completed")?,
        created_at: row.get("created_at")?,
    })
}
