pub mod availability;
pub mod health;
pub mod time_intervals;
pub mod users;
