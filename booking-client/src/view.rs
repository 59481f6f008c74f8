use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::NaiveDateTime;

use slotbook_common::{build_month_grid, CalendarWeek, MonthCursor};

use crate::client::{AvailabilityClient, AvailabilityError};

/// Month-view state for one user's public schedule.
///
/// Navigation bumps an epoch counter. `refresh` snapshots the cursor and
/// epoch before fetching; if navigation happened while the fetch was in
/// flight, the response belongs to a superseded month and is discarded
/// instead of rendered (last-requested-wins).
pub struct CalendarView {
    client: AvailabilityClient,
    username: String,
    cursor: Mutex<MonthCursor>,
    epoch: AtomicU64,
}

impl CalendarView {
    pub fn new(client: AvailabilityClient, username: &str, initial: MonthCursor) -> Self {
        Self {
            client,
            username: username.to_string(),
            cursor: Mutex::new(initial),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn cursor(&self) -> MonthCursor {
        *self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn previous_month(&self) {
        self.navigate(MonthCursor::previous)
    }

    pub fn next_month(&self) {
        self.navigate(MonthCursor::next)
    }

    fn navigate(&self, step: fn(&MonthCursor) -> MonthCursor) {
        let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        *cursor = step(&cursor);
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// Fetch blocked data for the current month and build the grid.
    ///
    /// Returns `Ok(None)` when the month changed while the fetch was in
    /// flight; the caller keeps whatever it was showing and waits for the
    /// refresh of the newer month. A fetch failure propagates as
    /// `Unavailable` — it must not be rendered as "no blocked days".
    pub async fn refresh(
        &self,
        now: NaiveDateTime,
    ) -> Result<Option<Vec<CalendarWeek>>, AvailabilityError> {
        let cursor = self.cursor();
        let epoch = self.epoch.load(Ordering::SeqCst);

        let blocked = self
            .client
            .fetch_blocked_dates(&self.username, cursor.year(), cursor.month0())
            .await?;

        if self.epoch.load(Ordering::SeqCst) != epoch {
            tracing::debug!(
                year = cursor.year(),
                month = cursor.month1(),
                "Discarding stale availability response"
            );
            return Ok(None);
        }

        Ok(Some(build_month_grid(cursor, Some(&blocked), now)))
    }
}
