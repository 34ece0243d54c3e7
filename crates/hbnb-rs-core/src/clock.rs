//! Time source for record timestamps.

use chrono::{NaiveDateTime, SubsecRound, Utc};

/// Source of "now" for record creation and saves.
pub trait Clock: Send + Sync {
    /// Current naive UTC time.
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

/// Drop sub-microsecond precision, which the persisted layout cannot carry.
pub(crate) fn truncate_to_micros(ts: NaiveDateTime) -> NaiveDateTime {
    ts.trunc_subsecs(6)
}
