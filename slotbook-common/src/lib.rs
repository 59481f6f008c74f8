//! Slotbook Common Types
//!
//! Shared calendar model used by both the backend and the booking client.

pub mod calendar;
pub mod week_day;

pub use calendar::{build_month_grid, BlockedDates, CalendarDay, CalendarWeek, MonthCursor};
pub use week_day::{short_week_days, week_day_name};
