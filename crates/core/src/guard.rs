//! Past-date guard.
//!
//! Any day at or before "today" is read-only. The guard is applied by
//! every mutating path in the editor, not only by presentation code.

use chrono::{Local, NaiveDate};

use crate::dates::DateKey;

/// Source of "today" for the guard.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;

    /// `true` when `date` is today or earlier and must not be mutated.
    fn is_past_or_today(&self, date: DateKey) -> bool {
        is_past_or_today(date, self.today())
    }
}

/// Wall clock in the local zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Day-granularity comparison; both sides carry no time of day.
pub fn is_past_or_today(date: DateKey, today: NaiveDate) -> bool {
    date.date() <= today
}
