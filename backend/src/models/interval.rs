use serde::{Deserialize, Serialize};

/// One weekly availability window, in minutes from midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInterval {
    /// Sunday=0..Saturday=6, same numbering as the calendar grid.
    pub week_day: u32,
    pub start_time_in_minutes: u32,
    pub end_time_in_minutes: u32,
}

impl TimeInterval {
    /// Whether the window is well-formed: a known weekday and a non-empty
    /// range inside a single day.
    pub fn is_valid(&self) -> bool {
        self.week_day < 7
            && self.start_time_in_minutes < self.end_time_in_minutes
            && self.end_time_in_minutes <= 24 * 60
    }
}
