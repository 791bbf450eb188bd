mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use availability_cell::router::availability_routes_with_service;
use common::{service_with, InMemoryScheduleReader};

fn create_test_app() -> Router {
    let reader = InMemoryScheduleReader::new()
        .with_service(1, 30)
        .with_service(2, 60)
        .with_window(7, "2025-09-05", "09:00", "10:00")
        .with_window(7, "2025-09-10", "09:00", "10:00")
        .with_window(7, "2025-09-15", "09:00", "11:00")
        .with_booking(7, "2025-09-15", "09:00", 2)
        .with_booking(7, "2025-09-10", "09:00", 2);

    availability_routes_with_service(Arc::new(service_with(Arc::new(reader))))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response = serde_json::from_slice(&body).unwrap_or(Value::Null);

    (status, json_response)
}

#[tokio::test]
async fn test_available_dates_endpoint() {
    let (status, body) = get(
        create_test_app(),
        "/available-dates?specialistId=7&serviceId=1&month=2025-09",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "specialistId": 7,
            "month": "2025-09",
            "availableDates": ["2025-09-05", "2025-09-10", "2025-09-15"]
        })
    );
}

#[tokio::test]
async fn test_available_slots_endpoint() {
    let (status, body) = get(
        create_test_app(),
        "/available-slots?specialistId=7&serviceId=1&date=2025-09-15",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "specialistId": 7,
            "date": "2025-09-15",
            "availableSlots": ["10:00", "10:30"]
        })
    );
}

#[tokio::test]
async fn test_available_slots_without_schedule_returns_empty_list() {
    let (status, body) = get(
        create_test_app(),
        "/available-slots?specialistId=7&serviceId=1&date=2025-09-16",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["availableSlots"], json!([]));
}

#[tokio::test]
async fn test_unknown_service_is_internal_error() {
    let (status, body) = get(
        create_test_app(),
        "/available-slots?specialistId=7&serviceId=99&date=2025-09-15",
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("service 99"));
}

#[tokio::test]
async fn test_malformed_date_is_bad_request() {
    let (status, body) = get(
        create_test_app(),
        "/available-slots?specialistId=7&serviceId=1&date=2025-9-15",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_missing_query_parameter_is_bad_request() {
    let (status, _) = get(create_test_app(), "/available-slots?specialistId=7&date=2025-09-15").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_slots_by_range_endpoint() {
    let (status, body) = get(
        create_test_app(),
        "/slots-by-range?specialistId=7&serviceId=1&startDate=2025-09-01&endDate=2025-09-30",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "specialistId": 7,
            "serviceId": 1,
            "slotsByDay": [
                { "date": "2025-09-05", "availableSlots": ["09:00", "09:30"] },
                { "date": "2025-09-15", "availableSlots": ["10:00", "10:30"] }
            ]
        })
    );
}

#[tokio::test]
async fn test_slots_by_range_inverted_is_bad_request() {
    let (status, _) = get(
        create_test_app(),
        "/slots-by-range?specialistId=7&serviceId=1&startDate=2025-09-30&endDate=2025-09-01",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_slot_check_endpoint() {
    let (status, body) = get(
        create_test_app(),
        "/slot-check?specialistId=7&serviceId=1&date=2025-09-15&time=10:30",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], json!(true));

    let (status, _) = get(
        create_test_app(),
        "/slot-check?specialistId=7&serviceId=1&date=2025-09-15&time=half-past",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
