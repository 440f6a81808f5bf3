//! On-demand memo reminders.
//!
//! # Responsibility
//! - Split open, dated memos into overdue and upcoming groups.
//!
//! # Invariants
//! - Completed memos and memos without `due_at` are never returned.
//! - Overdue (`due_at <= now`) items come before upcoming
//!   (`now < due_at <= now + window`) items.
//! - Within a group, order is `due_at` ascending, then id ascending.
//! - Computing reminders never mutates memo state.

use crate::model::memo::Memo;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default look-ahead for upcoming reminders.
pub const DEFAULT_REMINDER_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Reminder group a memo falls into at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderGroup {
    Overdue,
    Upcoming,
}

/// One memo surfaced by the reminder engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reminder {
    pub group: ReminderGroup,
    #[serde(flatten)]
    pub memo: Memo,
}

/// Look-ahead configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSettings {
    pub window: Duration,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            window: DEFAULT_REMINDER_WINDOW,
        }
    }
}

impl ReminderSettings {
    /// Window in epoch-millisecond units, saturating on overflow.
    pub fn window_ms(&self) -> i64 {
        i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX)
    }

    /// Latest `due_at` that still counts as upcoming at `now_ms`.
    pub fn horizon(&self, now_ms: i64) -> i64 {
        now_ms.saturating_add(self.window_ms())
    }
}

/// Returns the group for `memo` at `now_ms`, or `None` when it is not due.
pub fn reminder_group(memo: &Memo, now_ms: i64, settings: &ReminderSettings) -> Option<ReminderGroup> {
    if memo.completed {
        return None;
    }
    let due_at = memo.due_at?;
    if due_at <= now_ms {
        Some(ReminderGroup::Overdue)
    } else if due_at <= settings.horizon(now_ms) {
        Some(ReminderGroup::Upcoming)
    } else {
        None
    }
}

/// Selects and orders reminders from an arbitrary memo set.
pub fn compute_reminders<I>(memos: I, now_ms: i64, settings: &ReminderSettings) -> Vec<Reminder>
where
    I: IntoIterator<Item = Memo>,
{
    let mut reminders: Vec<Reminder> = memos
        .into_iter()
        .filter_map(|memo| {
            reminder_group(&memo, now_ms, settings).map(|group| Reminder { group, memo })
        })
        .collect();

    reminders.sort_by_key(|reminder| (reminder.group, reminder.memo.due_at, reminder.memo.id));
    reminders
}
