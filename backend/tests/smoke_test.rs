use std::sync::Arc;

use bytes::Bytes;
use chrono::{Duration, Utc};
use http::StatusCode;
use serde_json::{json, Value};
use tower::ServiceExt;

use slotbook_backend::test_util::create_test_state;
use slotbook_backend::{routes, AdapterSession, AppState, IdentityAdapter};

fn app(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .merge(routes::health::router())
        .merge(routes::users::router(state.clone()))
        .merge(routes::availability::router(state.clone()))
        .merge(routes::time_intervals::router(state))
}

async fn send_request(
    app: &axum::Router,
    method: http::Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Bytes) {
    let mut req_builder = http::Request::builder().method(method).uri(uri);

    if body.is_some() {
        req_builder = req_builder.header("Content-Type", "application/json");
    }
    if let Some(token) = bearer {
        req_builder = req_builder.header("Authorization", format!("Bearer {}", token));
    }

    let req = req_builder
        .body(if let Some(b) = body {
            axum::body::Body::from(b.to_string())
        } else {
            axum::body::Body::empty()
        })
        .unwrap();

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes)
}

async fn logged_in_user(state: &Arc<AppState>, name: &str, username: &str) -> (String, String) {
    let user = state.store.create_pre_signup_user(name, username).unwrap();
    let token = format!("session-{}", username);
    state
        .store
        .create_session(AdapterSession {
            session_token: token.clone(),
            user_id: user.id.clone(),
            expires: Utc::now() + Duration::hours(2),
        })
        .await
        .unwrap();
    (user.id, token)
}

#[tokio::test]
async fn test_health_is_public() {
    let app = app(create_test_state());
    let (status, _) = send_request(&app, http::Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_time_intervals_requires_auth() {
    let app = app(create_test_state());
    let body = json!({"intervals": [{"weekDay": 1, "startTimeInMinutes": 540, "endTimeInMinutes": 1080}]});
    let (status, _) =
        send_request(&app, http::Method::POST, "/users/time-intervals", None, Some(body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_time_intervals_rejects_unknown_session() {
    let app = app(create_test_state());
    let body = json!({"intervals": [{"weekDay": 1, "startTimeInMinutes": 540, "endTimeInMinutes": 1080}]});
    let (status, _) = send_request(
        &app,
        http::Method::POST,
        "/users/time-intervals",
        Some("bogus"),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_time_intervals_rejects_expired_session() {
    let state = create_test_state();
    let user = state.store.create_pre_signup_user("Ana", "ana").unwrap();
    state
        .store
        .create_session(AdapterSession {
            session_token: "stale".to_string(),
            user_id: user.id,
            expires: Utc::now() - Duration::hours(1),
        })
        .await
        .unwrap();

    let app = app(state);
    let body = json!({"intervals": [{"weekDay": 1, "startTimeInMinutes": 540, "endTimeInMinutes": 1080}]});
    let (status, _) = send_request(
        &app,
        http::Method::POST,
        "/users/time-intervals",
        Some("stale"),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_time_intervals_method_not_allowed() {
    let app = app(create_test_state());
    let (status, _) =
        send_request(&app, http::Method::GET, "/users/time-intervals", None, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_time_intervals_created_for_authenticated_user() {
    let state = create_test_state();
    let (_, token) = logged_in_user(&state, "Ana", "ana").await;

    let app = app(state);
    let body = json!({"intervals": [
        {"weekDay": 1, "startTimeInMinutes": 540, "endTimeInMinutes": 1080},
        {"weekDay": 3, "startTimeInMinutes": 600, "endTimeInMinutes": 720}
    ]});
    let (status, _) = send_request(
        &app,
        http::Method::POST,
        "/users/time-intervals",
        Some(&token),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_time_intervals_rejects_invalid_windows() {
    let state = create_test_state();
    let (_, token) = logged_in_user(&state, "Ana", "ana").await;
    let app = app(state);

    // Weekday out of range.
    let body = json!({"intervals": [{"weekDay": 7, "startTimeInMinutes": 540, "endTimeInMinutes": 1080}]});
    let (status, _) = send_request(
        &app,
        http::Method::POST,
        "/users/time-intervals",
        Some(&token),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Empty interval list.
    let body = json!({ "intervals": [] });
    let (status, _) = send_request(
        &app,
        http::Method::POST,
        "/users/time-intervals",
        Some(&token),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_user_returns_pending_token() {
    let app = app(create_test_state());
    let body = json!({"name": "Ana", "username": "ana"});
    let (status, bytes) = send_request(&app, http::Method::POST, "/users", None, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let parsed: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed["user"]["username"], "ana");
    assert!(parsed["pendingUserId"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_create_user_rejects_taken_username() {
    let app = app(create_test_state());
    let body = json!({"name": "Ana", "username": "ana"});
    let (status, _) =
        send_request(&app, http::Method::POST, "/users", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send_request(&app, http::Method::POST, "/users", None, Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_user_rejects_bad_username() {
    let app = app(create_test_state());
    let body = json!({"name": "Ana", "username": "Not Valid!"});
    let (status, _) = send_request(&app, http::Method::POST, "/users", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blocked_dates_unknown_user_is_404() {
    let app = app(create_test_state());
    let (status, _) = send_request(
        &app,
        http::Method::GET,
        "/users/ghost/blocked-dates?year=2024&month=6",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blocked_dates_validates_month() {
    let state = create_test_state();
    state.store.create_pre_signup_user("Ana", "ana").unwrap();
    let app = app(state);

    for month in [0, 13] {
        let uri = format!("/users/ana/blocked-dates?year=2024&month={}", month);
        let (status, _) = send_request(&app, http::Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_blocked_dates_reflects_configured_intervals() {
    let state = create_test_state();
    let (_, token) = logged_in_user(&state, "Ana", "ana").await;
    let app = app(state);

    // No intervals yet: every weekday is blocked.
    let (status, bytes) = send_request(
        &app,
        http::Method::GET,
        "/users/ana/blocked-dates?year=2024&month=6",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let parsed: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed["blockedWeekDays"], json!([0, 1, 2, 3, 4, 5, 6]));

    // Configure availability on Monday and Wednesday.
    let body = json!({"intervals": [
        {"weekDay": 1, "startTimeInMinutes": 540, "endTimeInMinutes": 1080},
        {"weekDay": 3, "startTimeInMinutes": 600, "endTimeInMinutes": 720}
    ]});
    let (status, _) = send_request(
        &app,
        http::Method::POST,
        "/users/time-intervals",
        Some(&token),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, bytes) = send_request(
        &app,
        http::Method::GET,
        "/users/ana/blocked-dates?year=2024&month=6",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let parsed: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed["blockedWeekDays"], json!([0, 2, 4, 5, 6]));
}
