use std::collections::BTreeSet;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// The first day of the month currently displayed on the calendar.
///
/// Navigation moves the cursor one month at a time; the cursor is never
/// persisted. The in-memory month index is 0-based (0 = January), matching
/// `chrono::Datelike::month0`; the remote availability API expects 1-based
/// months, so `month1` exists for that boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthCursor(NaiveDate);

impl MonthCursor {
    /// Build a cursor for the given year and 0-based month.
    pub fn new(year: i32, month0: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month0 + 1, 1).map(Self)
    }

    /// Truncate an arbitrary date to the first of its month.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date - Duration::days(date.day0() as i64))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// 0-based month index (0 = January).
    pub fn month0(&self) -> u32 {
        self.0.month0()
    }

    /// 1-based month number, as submitted to the remote service.
    pub fn month1(&self) -> u32 {
        self.0.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn days_in_month(&self) -> u32 {
        self.next()
            .first_day()
            .signed_duration_since(self.0)
            .num_days() as u32
    }

    pub fn next(&self) -> Self {
        Self(self.0 + Months::new(1))
    }

    pub fn previous(&self) -> Self {
        Self(self.0 - Months::new(1))
    }
}

/// Weekdays with zero configured availability for a given user and month.
///
/// Indices are Sunday=0..Saturday=6 and must match the numbering used by the
/// grid builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedDates {
    pub blocked_week_days: BTreeSet<u32>,
}

/// One cell of the rendered month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub disabled: bool,
}

/// One row of the rendered month grid: a 1-based week index and exactly
/// seven days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarWeek {
    pub week: u32,
    pub days: Vec<CalendarDay>,
}

/// Build the month grid for `cursor`, padded to whole weeks.
///
/// Leading cells are taken from the end of the previous month and trailing
/// cells from the start of the next month, both always disabled. An in-month
/// day is disabled when its end-of-day instant is strictly before `now` or
/// its weekday is in `blocked.blocked_week_days`.
///
/// Returns an empty vec while `blocked` is `None`: without the blocked-weekday
/// data there is no correct grid to show, only a guessed one.
pub fn build_month_grid(
    cursor: MonthCursor,
    blocked: Option<&BlockedDates>,
    now: NaiveDateTime,
) -> Vec<CalendarWeek> {
    let Some(blocked) = blocked else {
        return Vec::new();
    };

    let first = cursor.first_day();
    let days_in_month = cursor.days_in_month();
    let last = first + Duration::days(days_in_month as i64 - 1);

    let initial_week_day = first.weekday().num_days_from_sunday();
    let last_week_day = last.weekday().num_days_from_sunday();

    let mut days: Vec<CalendarDay> = Vec::with_capacity(42);

    // Fill from the previous month, in ascending order.
    for offset in (1..=initial_week_day as i64).rev() {
        days.push(CalendarDay {
            date: first - Duration::days(offset),
            disabled: true,
        });
    }

    for day0 in 0..days_in_month {
        let date = first + Duration::days(day0 as i64);
        let week_day = date.weekday().num_days_from_sunday();
        let disabled = date.and_time(NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap()) < now
            || blocked.blocked_week_days.contains(&week_day);
        days.push(CalendarDay { date, disabled });
    }

    // Fill from the next month up to a full trailing week.
    for offset in 1..=(6 - last_week_day) as i64 {
        days.push(CalendarDay {
            date: last + Duration::days(offset),
            disabled: true,
        });
    }

    days.chunks(7)
        .enumerate()
        .map(|(i, chunk)| CalendarWeek {
            week: i as u32 + 1,
            days: chunk.to_vec(),
        })
        .collect()
}
