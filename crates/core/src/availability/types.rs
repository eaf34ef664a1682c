//! Time window parsing.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::AvailabilityError;

/// A clock range encoded as `"HH:MM-HH:MM"`, with start strictly before end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Minutes since midnight of the start.
    pub fn start_minute(&self) -> u32 {
        self.start.hour() * 60 + self.start.minute()
    }

    /// Minutes since midnight of the end.
    pub fn end_minute(&self) -> u32 {
        self.end.hour() * 60 + self.end.minute()
    }

    /// Whether this window fits inside the slot `[start_minute, end_minute)`.
    pub fn covered_by(&self, start_minute: u32, end_minute: u32) -> bool {
        start_minute <= self.start_minute() && self.end_minute() <= end_minute
    }
}

impl FromStr for TimeWindow {
    type Err = AvailabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AvailabilityError::InvalidTimeWindow(s.to_string());

        let (start, end) = s.trim().split_once('-').ok_or_else(invalid)?;
        let start = NaiveTime::parse_from_str(start.trim(), "%H:%M").map_err(|_| invalid())?;
        let end = NaiveTime::parse_from_str(end.trim(), "%H:%M").map_err(|_| invalid())?;

        if start >= end {
            return Err(invalid());
        }

        Ok(Self { start, end })
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}
