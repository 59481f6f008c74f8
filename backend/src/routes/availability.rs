use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Deserialize;
use slotbook_common::BlockedDates;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BlockedDatesQuery {
    pub year: i32,
    /// 1-based month, as documented on the public API.
    pub month: u32,
}

/// Weekdays on which `username` has no availability configured at all.
async fn blocked_dates(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(query): Query<BlockedDatesQuery>,
) -> Result<Json<BlockedDates>, (StatusCode, String)> {
    if !(1..=12).contains(&query.month) {
        return Err((
            StatusCode::BAD_REQUEST,
            "Month must be between 1 and 12".to_string(),
        ));
    }

    tracing::debug!(
        username = %username,
        year = query.year,
        month = query.month,
        "Blocked dates requested"
    );

    let blocked = state
        .store
        .blocked_week_days(&username)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    match blocked {
        Some(blocked_week_days) => Ok(Json(BlockedDates { blocked_week_days })),
        None => Err((StatusCode::NOT_FOUND, "User not found".to_string())),
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/users/:username/blocked-dates", get(blocked_dates))
        .with_state(state)
}
