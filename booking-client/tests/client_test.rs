use std::time::Duration;

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use booking_client::{AvailabilityClient, AvailabilityError, CalendarView};
use slotbook_common::{BlockedDates, MonthCursor};

fn blocked_body(days: &[u32]) -> serde_json::Value {
    json!({ "blockedWeekDays": days })
}

fn now() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

#[tokio::test]
async fn internal_month_zero_queries_month_one_on_the_wire() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/ana/blocked-dates"))
        .and(query_param("year", "2024"))
        .and(query_param("month", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(blocked_body(&[0])))
        .expect(1)
        .mount(&server)
        .await;

    let client = AvailabilityClient::new(&server.uri());
    let blocked = client.fetch_blocked_dates("ana", 2024, 0).await.unwrap();

    assert_eq!(blocked, BlockedDates {
        blocked_week_days: [0].into_iter().collect(),
    });
}

#[tokio::test]
async fn repeated_fetches_for_the_same_month_hit_the_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/ana/blocked-dates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(blocked_body(&[0, 6])))
        .expect(1)
        .mount(&server)
        .await;

    let client = AvailabilityClient::new(&server.uri());
    let first = client.fetch_blocked_dates("ana", 2024, 5).await.unwrap();
    let second = client.fetch_blocked_dates("ana", 2024, 5).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn concurrent_fetches_for_one_key_share_a_single_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/ana/blocked-dates"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(blocked_body(&[3]))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = AvailabilityClient::new(&server.uri());
    let (a, b) = tokio::join!(
        client.fetch_blocked_dates("ana", 2024, 5),
        client.fetch_blocked_dates("ana", 2024, 5),
    );

    assert_eq!(a.unwrap(), b.unwrap());
}

#[tokio::test]
async fn different_months_are_cached_separately() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/ana/blocked-dates"))
        .and(query_param("month", "6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(blocked_body(&[0])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/ana/blocked-dates"))
        .and(query_param("month", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(blocked_body(&[0, 1])))
        .expect(1)
        .mount(&server)
        .await;

    let client = AvailabilityClient::new(&server.uri());
    let june = client.fetch_blocked_dates("ana", 2024, 5).await.unwrap();
    let july = client.fetch_blocked_dates("ana", 2024, 6).await.unwrap();

    assert_ne!(june, july);
}

#[tokio::test]
async fn service_errors_surface_as_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/ana/blocked-dates"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = AvailabilityClient::new(&server.uri());
    let err = client.fetch_blocked_dates("ana", 2024, 5).await.unwrap_err();
    assert!(matches!(err, AvailabilityError::Unavailable(_)));
}

#[tokio::test]
async fn refresh_builds_the_grid_for_the_current_month() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/ana/blocked-dates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(blocked_body(&[0])))
        .mount(&server)
        .await;

    let view = CalendarView::new(
        AvailabilityClient::new(&server.uri()),
        "ana",
        MonthCursor::new(2024, 5).unwrap(),
    );

    let weeks = view.refresh(now()).await.unwrap().unwrap();
    assert_eq!(weeks.len(), 6);
    assert!(weeks.iter().all(|w| w.days.len() == 7));
}

#[tokio::test]
async fn navigation_is_reversible() {
    let server = MockServer::start().await;
    let view = CalendarView::new(
        AvailabilityClient::new(&server.uri()),
        "ana",
        MonthCursor::new(2024, 5).unwrap(),
    );

    let start = view.cursor();
    view.next_month();
    view.previous_month();
    assert_eq!(view.cursor(), start);
}

#[tokio::test]
async fn stale_response_for_a_superseded_month_is_discarded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/ana/blocked-dates"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(blocked_body(&[]))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let view = CalendarView::new(
        AvailabilityClient::new(&server.uri()),
        "ana",
        MonthCursor::new(2024, 5).unwrap(),
    );

    // Navigate away while the first month's fetch is still in flight.
    let (grid, _) = tokio::join!(view.refresh(now()), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        view.next_month();
    });

    assert!(grid.unwrap().is_none());
}

#[tokio::test]
async fn refresh_propagates_unavailable_instead_of_an_empty_grid() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/ana/blocked-dates"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let view = CalendarView::new(
        AvailabilityClient::new(&server.uri()),
        "ana",
        MonthCursor::new(2024, 5).unwrap(),
    );

    assert!(matches!(
        view.refresh(now()).await,
        Err(AvailabilityError::Unavailable(_))
    ));
}
