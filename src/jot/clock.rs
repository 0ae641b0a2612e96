//! Time source for partition naming and sweep cutoffs.
//!
//! Production code uses [`SystemClock`]; tests pin the date with
//! [`FixedClock`] so "today's partition" is predictable.

use chrono::{DateTime, Local, Utc};
use std::sync::Mutex;

pub const DATE_DIR_FORMAT: &str = "%Y%m%d";

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// The `YYYYMMDD` partition for "now", in local time.
    fn today(&self) -> String {
        date_dir_for(self.now())
    }
}

/// Partition name for a timestamp, in local time like the directory layout.
pub fn date_dir_for(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(DATE_DIR_FORMAT).to_string()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    current: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(at),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *current = at;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *current += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self
            .current
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
