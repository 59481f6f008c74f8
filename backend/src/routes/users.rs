use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::pending::PENDING_TOKEN_COOKIE;
use crate::models::user::AdapterUser;
use crate::storage::StoreError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    pub user: AdapterUser,
    /// Raw pending-signup token; also set as the `pendingUserId` cookie.
    pub pending_user_id: String,
}

fn valid_username(username: &str) -> bool {
    username.len() >= 3
        && username
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Claim a username and create the pre-signup user row.
///
/// The response carries the single-use pending-signup token that the later
/// identity-provider `create_user` call consumes.
async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if request.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Name must not be empty".to_string()));
    }
    if !valid_username(&request.username) {
        return Err((
            StatusCode::BAD_REQUEST,
            "Username must be at least 3 characters of lowercase letters, digits or hyphens"
                .to_string(),
        ));
    }

    let user = state
        .store
        .create_pre_signup_user(&request.name, &request.username)
        .map_err(|e| match e {
            StoreError::UniquenessViolation => {
                (StatusCode::CONFLICT, "Username already taken".to_string())
            }
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        })?;

    let token = state
        .store
        .issue_pending_signup(&user.id)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let cookie = format!("{}={}; Path=/; HttpOnly", PENDING_TOKEN_COOKIE, token);

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(CreateUserResponse {
            user,
            pending_user_id: token,
        }),
    ))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/users", post(create_user))
        .with_state(state)
}
