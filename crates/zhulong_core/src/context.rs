//! Request-scoped context.
//!
//! Carries what a single call needs to know about "now" and who it is,
//! so nothing in the core reads process-wide mutable state.

use chrono::{DateTime, FixedOffset, Local};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    /// Correlates log lines of one request.
    pub request_id: Uuid,
    /// Reference time in the user's local offset.
    pub now: DateTime<FixedOffset>,
}

impl RequestContext {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            now,
        }
    }

    /// Context stamped with the host's local clock.
    pub fn now_local() -> Self {
        Self::new(Local::now().fixed_offset())
    }

    pub fn now_ms(&self) -> i64 {
        self.now.timestamp_millis()
    }
}
