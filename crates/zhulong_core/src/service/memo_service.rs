//! Memo use-case service.
//!
//! # Responsibility
//! - Create memos, resolving a due date from the text when none is given.
//! - Expose get/list/complete/delete with not-found semantics.
//! - Compute reminders from stored memos.
//!
//! # Invariants
//! - `get`, `complete` and `delete` on a missing id return `NotFound`.
//! - Reminder computation is read-only.

use crate::classifier::find_due_date;
use crate::model::memo::{Memo, MemoId, NewMemo};
use crate::model::EntityKind;
use crate::reminder::{compute_reminders, Reminder, ReminderSettings};
use crate::repo::memo_repo::{MemoListQuery, MemoRepository};
use crate::service::{ServiceError, ServiceResult};
use chrono::{DateTime, FixedOffset};
use log::info;

/// Memo service facade over repository implementations.
pub struct MemoService<R: MemoRepository> {
    repo: R,
}

impl<R: MemoRepository> MemoService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a memo exactly as given.
    pub fn create(&self, memo: &NewMemo) -> ServiceResult<Memo> {
        let created = self.repo.create_memo(memo)?;
        info!(
            "event=memo_create module=service status=ok memo_id={} has_due_at={}",
            created.id,
            created.due_at.is_some()
        );
        Ok(created)
    }

    /// Creates a memo, parsing `due_at` out of the text when it is absent.
    ///
    /// An unparseable date expression leaves `due_at` unset.
    pub fn create_from_text(
        &self,
        memo: NewMemo,
        now: DateTime<FixedOffset>,
    ) -> ServiceResult<Memo> {
        let memo = match memo.due_at {
            Some(_) => memo,
            None => {
                let due_at = find_due_date(&memo.text, now)
                    .resolved()
                    .map(|value| value.timestamp_millis());
                memo.with_due_at(due_at)
            }
        };
        self.create(&memo)
    }

    pub fn get(&self, id: MemoId) -> ServiceResult<Memo> {
        self.repo.get_memo(id)?.ok_or(ServiceError::NotFound {
            entity: EntityKind::Memo,
            id,
        })
    }

    pub fn list(&self, query: &MemoListQuery) -> ServiceResult<Vec<Memo>> {
        Ok(self.repo.list_memos(query)?)
    }

    /// Marks a memo completed. Completing twice is a successful no-op.
    pub fn complete(&self, id: MemoId) -> ServiceResult<()> {
        self.repo.complete_memo(id)?;
        info!("event=memo_complete module=service status=ok memo_id={id}");
        Ok(())
    }

    /// Hard-deletes a memo.
    pub fn delete(&self, id: MemoId) -> ServiceResult<()> {
        self.repo.delete_memo(id)?;
        info!("event=memo_delete module=service status=ok memo_id={id}");
        Ok(())
    }

    /// Overdue then upcoming reminders at `now_ms`.
    pub fn reminders(
        &self,
        now_ms: i64,
        settings: &ReminderSettings,
    ) -> ServiceResult<Vec<Reminder>> {
        let candidates = self.repo.list_due_memos(settings.horizon(now_ms))?;
        Ok(compute_reminders(candidates, now_ms, settings))
    }
}
