use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::clock::serde_clock;
use super::working_hours::TimeRange;

/// A bookable unit offered to the client. Computed per request, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Slot {
    #[serde(with = "serde_clock")]
    pub start_time: NaiveTime,
    #[serde(with = "serde_clock")]
    pub end_time: NaiveTime,
    pub is_available: bool,
}

impl Slot {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }
}
