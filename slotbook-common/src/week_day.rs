//! Weekday labels for the calendar grid, Sunday-first.
//!
//! The deployment locale is pt-BR, matching the rest of the product copy.

const WEEK_DAYS: [&str; 7] = [
    "Domingo",
    "Segunda-Feira",
    "Terça-Feira",
    "Quarta-Feira",
    "Quinta-Feira",
    "Sexta-Feira",
    "Sábado",
];

const SHORT_WEEK_DAYS: [&str; 7] = ["DOM", "SEG", "TER", "QUA", "QUI", "SEX", "SAB"];

/// Full weekday name for a Sunday=0..Saturday=6 index.
pub fn week_day_name(index: u32) -> Option<&'static str> {
    WEEK_DAYS.get(index as usize).copied()
}

/// The seven short labels used as grid column headers.
pub fn short_week_days() -> [&'static str; 7] {
    SHORT_WEEK_DAYS
}
