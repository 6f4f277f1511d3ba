//! Periodic durability safety net.

use crate::service::TaskService;
use opsboard_store::StorageMedium;
use time::{Duration, OffsetDateTime};

/// Re-persists in-memory state on a fixed interval, independent of explicit
/// mutations, so a missed persist is repaired on the next tick. Synchronous
/// and fire-and-forget; the caller drives it by passing the current time.
#[derive(Debug, Clone, Copy)]
pub struct Autosave {
    interval: Duration,
    last_save: OffsetDateTime,
}

impl Autosave {
    /// Create a ticker that first fires `interval` after `now`.
    #[must_use]
    pub const fn new(interval: Duration, now: OffsetDateTime) -> Self {
        Self {
            interval,
            last_save: now,
        }
    }

    /// Create a ticker from a configured interval in seconds.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn from_secs(interval_secs: u64, now: OffsetDateTime) -> Self {
        Self::new(Duration::seconds(interval_secs as i64), now)
    }

    /// Whether the interval has elapsed at `now`.
    #[must_use]
    pub fn due(&self, now: OffsetDateTime) -> bool {
        now - self.last_save >= self.interval
    }

    /// Save unconditionally when due. Returns `None` when nothing was due,
    /// otherwise whether the save reached durable storage.
    pub fn tick<M: StorageMedium>(
        &mut self,
        service: &TaskService<M>,
        now: OffsetDateTime,
    ) -> Option<bool> {
        if !self.due(now) {
            return None;
        }
        self.last_save = now;
        Some(service.save())
    }
}
