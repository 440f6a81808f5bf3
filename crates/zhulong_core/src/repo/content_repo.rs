//! Content, feedback and keyword-weight persistence.
//!
//! # Responsibility
//! - Store ingested contents with their relevance score.
//! - Store feedback with an atomic referential check against `contents`.
//! - Maintain learned keyword weights used by content ranking.
//!
//! # Invariants
//! - A feedback row is inserted only inside the transaction that saw its
//!   content row; the `contents` foreign key backs this up.
//! - Deleting a content row removes its feedback (`ON DELETE CASCADE`).
//! - Keyword learning happens in the same transaction as the feedback insert.

use super::{ensure_connection_ready, normalize_list_limit, RepoError, RepoResult};
use crate::model::content::{Content, ContentId, Feedback, FeedbackId, NewContent, NewFeedback};
use crate::model::EntityKind;
use crate::ranking::{
    matched_keywords, LEARNED_WEIGHT_INITIAL, LEARNED_WEIGHT_MAX, LEARNED_WEIGHT_STEP,
};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction,
    TransactionBehavior,
};
use std::collections::HashMap;

const CONTENT_COLUMNS: &str = "id, title, body, url, source, relevance_score, created_at";
const CONTENT_REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "title",
    "body",
    "url",
    "source",
    "relevance_score",
    "created_at",
];
const FEEDBACK_COLUMNS: &str = "id, content_id, score, comment, created_at";
const FEEDBACK_REQUIRED_COLUMNS: &[&str] = &["id", "content_id", "score", "comment", "created_at"];

/// Query options for listing contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentListQuery {
    /// Defaults to 50 and clamps to 200.
    pub limit: Option<u32>,
}

/// Query options for listing feedback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackListQuery {
    /// Restrict to feedback on one content item.
    pub content_id: Option<ContentId>,
    pub limit: Option<u32>,
}

/// Repository interface for contents and learned keyword weights.
pub trait ContentRepository {
    fn create_content(&self, content: &NewContent, relevance_score: f64) -> RepoResult<Content>;
    fn get_content(&self, id: ContentId) -> RepoResult<Option<Content>>;
    /// Ordered by relevance, then newest first.
    fn list_contents(&self, query: &ContentListQuery) -> RepoResult<Vec<Content>>;
    fn delete_content(&self, id: ContentId) -> RepoResult<()>;
    /// Learned weights keyed by lowercase keyword.
    fn keyword_weights(&self) -> RepoResult<HashMap<String, f64>>;
}

/// Repository interface for feedback.
pub trait FeedbackRepository {
    /// Inserts feedback if its content exists, and for positive feedback
    /// strengthens every interest keyword found in that content.
    fn create_feedback(
        &self,
        feedback: &NewFeedback,
        interest_keywords: &[String],
    ) -> RepoResult<Feedback>;
    fn get_feedback(&self, id: FeedbackId) -> RepoResult<Option<Feedback>>;
    fn list_feedback(&self, query: &FeedbackListQuery) -> RepoResult<Vec<Feedback>>;
}

/// SQLite-backed content repository.
pub struct SqliteContentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContentRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "contents", CONTENT_REQUIRED_COLUMNS)?;
        ensure_connection_ready(conn, "keyword_weights", &["keyword", "weight"])?;
        Ok(Self { conn })
    }
}

impl ContentRepository for SqliteContentRepository<'_> {
    fn create_content(&self, content: &NewContent, relevance_score: f64) -> RepoResult<Content> {
        content.validate()?;

        let created = self.conn.query_row(
            &format!(
                "INSERT INTO contents (title, body, url, source, relevance_score)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 RETURNING {CONTENT_COLUMNS};"
            ),
            params![
                content.title.trim(),
                content.body.as_str(),
                content.url.trim(),
                content.source.trim(),
                relevance_score
            ],
            |row| Ok(parse_content_row(row)),
        )??;

        Ok(created)
    }

    fn get_content(&self, id: ContentId) -> RepoResult<Option<Content>> {
        load_content(self.conn, id)
    }

    fn list_contents(&self, query: &ContentListQuery) -> RepoResult<Vec<Content>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CONTENT_COLUMNS}
             FROM contents
             ORDER BY relevance_score DESC, created_at DESC, id DESC
             LIMIT ?1;"
        ))?;

        let mut rows = stmt.query([i64::from(normalize_list_limit(query.limit))])?;
        let mut contents = Vec::new();
        while let Some(row) = rows.next()? {
            contents.push(parse_content_row(row)?);
        }

        Ok(contents)
    }

    fn delete_content(&self, id: ContentId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM contents WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Content, id));
        }

        Ok(())
    }

    fn keyword_weights(&self) -> RepoResult<HashMap<String, f64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT keyword, weight FROM keyword_weights;")?;
        let weights = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)))?
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(weights)
    }
}

/// SQLite-backed feedback repository.
pub struct SqliteFeedbackRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFeedbackRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "feedback", FEEDBACK_REQUIRED_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl FeedbackRepository for SqliteFeedbackRepository<'_> {
    fn create_feedback(
        &self,
        feedback: &NewFeedback,
        interest_keywords: &[String],
    ) -> RepoResult<Feedback> {
        feedback.validate()?;

        // IMMEDIATE takes the write lock up front, so no content delete can
        // slip between the existence check and the insert.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let content = load_content(&tx, feedback.content_id)?
            .ok_or_else(|| RepoError::not_found(EntityKind::Content, feedback.content_id))?;

        let created = tx.query_row(
            &format!(
                "INSERT INTO feedback (content_id, score, comment)
                 VALUES (?1, ?2, ?3)
                 RETURNING {FEEDBACK_COLUMNS};"
            ),
            params![
                feedback.content_id,
                feedback.score,
                feedback.comment.as_deref()
            ],
            |row| Ok(parse_feedback_row(row)),
        )??;

        if feedback.is_positive() {
            let text = format!("{} {}", content.title, content.body);
            for keyword in matched_keywords(&text, interest_keywords) {
                tx.execute(
                    "INSERT INTO keyword_weights (keyword, weight)
                     VALUES (?1, ?2)
                     ON CONFLICT (keyword) DO UPDATE SET
                        weight = MIN(weight + ?3, ?4),
                        updated_at = CAST(ROUND((julianday('now') - 2440587.5) * 86400000) AS INTEGER);",
                    params![
                        keyword,
                        LEARNED_WEIGHT_INITIAL,
                        LEARNED_WEIGHT_STEP,
                        LEARNED_WEIGHT_MAX
                    ],
                )?;
            }
        }

        tx.commit()?;
        Ok(created)
    }

    fn get_feedback(&self, id: FeedbackId) -> RepoResult<Option<Feedback>> {
        self.conn
            .query_row(
                &format!("SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE id = ?1;"),
                [id],
                |row| Ok(parse_feedback_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_feedback(&self, query: &FeedbackListQuery) -> RepoResult<Vec<Feedback>> {
        let mut sql = format!("SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(content_id) = query.content_id {
            sql.push_str(" AND content_id = ?");
            bind_values.push(Value::Integer(content_id));
        }

        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ?");
        bind_values.push(Value::Integer(i64::from(normalize_list_limit(query.limit))));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_feedback_row(row)?);
        }

        Ok(items)
    }
}

fn load_content(conn: &Connection, id: ContentId) -> RepoResult<Option<Content>> {
    conn.query_row(
        &format!("SELECT {CONTENT_COLUMNS} FROM contents WHERE id = ?1;"),
        [id],
        |row| Ok(parse_content_row(row)),
    )
    .optional()?
    .transpose()
}

fn parse_content_row(row: &Row<'_>) -> RepoResult<Content> {
    Ok(Content {
        id: row.get("id")?,
        title: row.get("title")?,
        body: row.get("body")?,
        url: row.get("url")?,
        source: row.get("source")?,
        relevance_score: row.get("relevance_score")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_feedback_row(row: &Row<'_>) -> RepoResult<Feedback> {
    Ok(Feedback {
        id: row.get("id")?,
        content_id: row.get("content_id")?,
        score: row.get("score")?,
        comment: row.get("comment")?,
        created_at: row.get("created_at")?,
    })
}
