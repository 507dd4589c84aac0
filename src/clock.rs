/// Time source used by streak and cache logic
///
/// Everything that needs "today" or "now" takes a `Clock` so tests can pin
/// the date instead of depending on the wall clock.

use std::sync::Mutex;

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, Offset, Utc};

pub trait Clock: Send + Sync {
    /// Current instant, used for cache timestamps
    fn now(&self) -> DateTime<Utc>;

    /// Civil date of an instant in the user's local time zone
    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate;

    /// Current civil date in the user's local time zone
    fn today(&self) -> NaiveDate {
        self.local_date(self.now())
    }
}

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&Local).date_naive()
    }
}

/// A manually controlled clock
///
/// Local dates use a fixed UTC offset, UTC itself unless `with_offset` is
/// called.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
            offset: Utc.fix(),
        }
    }

    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Fixed clock at noon UTC on the given date
    pub fn at_date(date: NaiveDate) -> Self {
        let noon = date
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);
        Self::new(noon)
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }

    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }
}
