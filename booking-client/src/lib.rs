//! Slotbook booking client.
//!
//! Consumer-side plumbing for the public scheduling page: a cached
//! availability query client and the month-view state that feeds the shared
//! grid builder.

pub mod client;
pub mod view;

pub use client::{AvailabilityClient, AvailabilityError};
pub use view::CalendarView;
