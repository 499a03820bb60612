use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::clock::serde_clock;

/// One open range in a doctor's week. `weekday` counts from Sunday = 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkingHours {
    pub id: String,
    pub doctor_id: String,
    pub weekday: u8,
    #[serde(with = "serde_clock")]
    pub start_time: NaiveTime,
    #[serde(with = "serde_clock")]
    pub end_time: NaiveTime,
}

impl WorkingHours {
    pub fn range(&self) -> TimeRange {
        TimeRange {
            start: self.start_time,
            end: self.end_time,
        }
    }
}

/// A clock-time range with no date attached.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeRange {
    #[serde(with = "serde_clock")]
    pub start: NaiveTime,
    #[serde(with = "serde_clock")]
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn is_chronological(&self) -> bool {
        self.start < self.end
    }

    pub fn contains(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Pins the range to a calendar date.
    pub fn on(&self, date: NaiveDate) -> Interval {
        Interval {
            start: date.and_time(self.start),
            end: date.and_time(self.end),
        }
    }
}

/// Half-open `[start, end)` span of absolute time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

pub fn validate_weekday(day: i64) -> anyhow::Result<u8> {
    if !(0..=6).contains(&day) {
        anyhow::bail!("weekday must be between 0 (Sunday) and 6 (Saturday), got {day}");
    }
    Ok(day as u8)
}
