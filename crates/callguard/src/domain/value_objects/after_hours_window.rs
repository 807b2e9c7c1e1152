//! AfterHoursWindow - the time-of-day range that triggers automated handling

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// First hour (inclusive) of the default after-hours window
pub const DEFAULT_START_HOUR: u32 = 2;
/// Last hour (exclusive) of the default after-hours window
pub const DEFAULT_END_HOUR: u32 = 8;

/// Half-open hour range `[start_hour, end_hour)` on a 24-hour clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AfterHoursWindow {
    start_hour: u32,
    end_hour: u32,
}

impl AfterHoursWindow {
    /// Create a window, rejecting empty or out-of-range bounds
    pub fn new(start_hour: u32, end_hour: u32) -> Result<Self, DomainError> {
        if start_hour >= end_hour || end_hour > 24 {
            return Err(DomainError::Validation(format!(
                "after-hours window must satisfy start < end <= 24 (got {}..{})",
                start_hour, end_hour
            )));
        }
        Ok(Self {
            start_hour,
            end_hour,
        })
    }

    pub fn start_hour(&self) -> u32 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u32 {
        self.end_hour
    }

    /// True iff the hour component of `time` lies in the window
    pub fn contains(&self, time: &NaiveDateTime) -> bool {
        let hour = time.hour();
        self.start_hour <= hour && hour < self.end_hour
    }
}

impl Default for AfterHoursWindow {
    fn default() -> Self {
        Self {
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
        }
    }
}

impl std::fmt::Display for AfterHoursWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:00-{:02}:00", self.start_hour, self.end_hour)
    }
}

/// Classify a call time against the default 2:00-7:59 window
pub fn is_after_hours(time: &NaiveDateTime) -> bool {
    AfterHoursWindow::default().contains(time)
}
