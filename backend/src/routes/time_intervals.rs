use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::{routing::post, Json, Router};
use serde::Deserialize;

use crate::auth::session::authenticate;
use crate::models::interval::TimeInterval;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TimeIntervalsRequest {
    pub intervals: Vec<TimeInterval>,
}

/// Store the authenticated user's weekly availability windows.
///
/// One `user_time_intervals` row per submitted interval; 201 on success.
async fn create_time_intervals(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<TimeIntervalsRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    let auth = authenticate(&headers, &state.store)
        .await
        .map_err(|e| (StatusCode::UNAUTHORIZED, e.to_string()))?;

    if request.intervals.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "At least one interval is required".to_string(),
        ));
    }
    if let Some(bad) = request.intervals.iter().find(|i| !i.is_valid()) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "Invalid interval: weekDay {} {}..{} minutes",
                bad.week_day, bad.start_time_in_minutes, bad.end_time_in_minutes
            ),
        ));
    }

    state
        .store
        .insert_time_intervals(&auth.user.id, &request.intervals)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(StatusCode::CREATED)
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/users/time-intervals", post(create_time_intervals))
        .with_state(state)
}
