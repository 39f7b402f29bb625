//! Clock and calendar collaborator.
//!
//! Streaks and the daily counter key off the user's local calendar day, so
//! every "what day is it / what day was yesterday" question goes through this
//! trait. Tests inject [`FixedClock`] with an explicit UTC offset instead of
//! relying on the machine timezone.

use std::sync::Mutex;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Local calendar date of an instant. The default uses the system
    /// timezone; DST and year rollovers come for free from chrono.
    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&Local).date_naive()
    }
}

/// Real wall clock in the system timezone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock with a fixed UTC offset, for deterministic tests.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            now: Mutex::new(now),
            offset,
        }
    }

    /// Fixed clock pinned to UTC.
    pub fn utc(now: DateTime<Utc>) -> Self {
        Self::new(now, FixedOffset::east_opt(0).unwrap())
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = self.now.lock().unwrap();
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }
}
