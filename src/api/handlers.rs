//! HTTP request handlers for the Pointage Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::attendance::{
    AttendanceStatus, CheckInOrchestrator, CheckInOutcome, available_events, find_today,
};
use crate::error::{EngineError, EngineResult};
use crate::location::PositionAcquirer;

use super::request::CheckInRequest;
use super::response::{ApiError, ApiErrorResponse, HistoryResponse, TodayResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/checkin", post(check_in_handler))
        .route("/attendance/:user_id", get(history_handler))
        .route("/attendance/:user_id/today", get(today_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(error: EngineError) -> Response {
    let api_error: ApiErrorResponse = error.into();
    json_response(api_error.status, api_error.error)
}

fn rejection_error(correlation_id: Uuid, rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's detailed message.
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    }
}

/// Handler for POST /checkin.
///
/// Replays the position reported by the device through the acquisition
/// policy, enforces the geofence and records the punch.
async fn check_in_handler(
    State(state): State<AppState>,
    payload: Result<Json<CheckInRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing check-in request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                rejection_error(correlation_id, rejection),
            );
        }
    };

    if request.user_id.trim().is_empty() || request.store_id.trim().is_empty() {
        return json_response(
            StatusCode::BAD_REQUEST,
            ApiError::validation_error("user_id and store_id must not be empty"),
        );
    }

    let start_time = Instant::now();
    match perform_check_in(&state, &request).await {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                user_id = %request.user_id,
                store_id = %request.store_id,
                event = %request.event_type,
                status = %outcome.status,
                distance_m = outcome.distance_meters.round() as i64,
                duration_us = start_time.elapsed().as_micros(),
                "Check-in completed successfully"
            );
            json_response(StatusCode::OK, outcome)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                user_id = %request.user_id,
                event = %request.event_type,
                error = %err,
                "Check-in failed"
            );
            error_response(err)
        }
    }
}

async fn perform_check_in(state: &AppState, request: &CheckInRequest) -> EngineResult<CheckInOutcome> {
    let sensor = request.reported_position()?;
    let orchestrator = CheckInOrchestrator::new(
        PositionAcquirer::with_policy(sensor, state.policy()),
        Arc::clone(state.persistence()),
        state.geofence(),
    )
    .with_clock(Arc::clone(state.clock()))
    .with_local_offset(state.local_offset());

    orchestrator
        .check_in_today(request.event_type, &request.user(), state.directory())
        .await
}

/// Handler for GET /attendance/{user_id}/today.
///
/// Returns today's record, the derived status and the punches still allowed.
async fn today_handler(State(state): State<AppState>, Path(user_id): Path<String>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, user_id = %user_id, "Loading today's attendance");

    let records = match state.persistence().list_for_user(&user_id).await {
        Ok(records) => records,
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                user_id = %user_id,
                error = %err,
                "Failed to load attendance"
            );
            return error_response(err);
        }
    };

    let date = state.today();
    let record = find_today(&records, date).cloned();

    json_response(
        StatusCode::OK,
        TodayResponse {
            status: AttendanceStatus::of(record.as_ref()),
            available_events: available_events(record.as_ref()),
            user_id,
            date,
            record,
        },
    )
}

/// Handler for GET /attendance/{user_id}.
///
/// Returns every day record of the user, most recent first.
async fn history_handler(State(state): State<AppState>, Path(user_id): Path<String>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, user_id = %user_id, "Loading attendance history");

    match state.persistence().list_for_user(&user_id).await {
        Ok(records) => json_response(StatusCode::OK, HistoryResponse { user_id, records }),
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                user_id = %user_id,
                error = %err,
                "Failed to load attendance history"
            );
            error_response(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryAttendanceStore;
    use crate::config::ConfigLoader;
    use crate::models::{AttendanceEvent, Coordinate, EventType};
    use crate::ports::{AttendancePersistence, Clock};
    use axum::{body::Body, http::Request};
    use chrono::{DateTime, Utc};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    // Store "1" in config/default.
    const STORE_LAT: f64 = 14.6708;
    const STORE_LON: f64 = -17.4381;

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            "2026-03-02T08:00:00Z".parse().unwrap()
        }
    }

    fn create_test_app() -> (Router, Arc<InMemoryAttendanceStore>) {
        let config = ConfigLoader::load("./config/default").expect("Failed to load config");
        let store = Arc::new(InMemoryAttendanceStore::new(config.local_offset()));
        let state = AppState::new(&config, store.clone(), Arc::new(config.store_directory()))
            .with_clock(Arc::new(FixedClock));
        (create_router(state), store)
    }

    fn check_in_body(event: &str, lat_offset: f64) -> Value {
        json!({
            "user_id": "7",
            "store_id": "1",
            "event_type": event,
            "position": {
                "latitude": STORE_LAT + lat_offset,
                "longitude": STORE_LON,
                "accuracy": 10.0
            }
        })
    }

    async fn post_json(router: &Router, body: String) -> (StatusCode, Vec<u8>) {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/checkin")
                    .header("Content-Type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    async fn post_check_in(router: &Router, body: Value) -> (StatusCode, Vec<u8>) {
        post_json(router, body.to_string()).await
    }

    async fn get_today(router: &Router, user_id: &str) -> TodayResponse {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/attendance/{}/today", user_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_api_001_arrival_inside_geofence_returns_200() {
        let (router, store) = create_test_app();

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/checkin")
                    .header("Content-Type", "application/json")
                    .body(Body::from(check_in_body("arrival", 0.00045).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap();
        assert_eq!(content_type, "application/json");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let outcome: CheckInOutcome = serde_json::from_slice(&body).unwrap();

        assert_eq!(outcome.status, AttendanceStatus::Present);
        assert!(outcome.record.arrival_time.is_some());
        assert!(outcome.distance_meters > 45.0 && outcome.distance_meters < 55.0);
        assert_eq!(store.event_count("7"), 1);
    }

    #[tokio::test]
    async fn test_api_002_malformed_json_returns_400() {
        let (router, _) = create_test_app();

        let (status, body) = post_json(&router, "{invalid json".to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_api_003_missing_event_type_returns_400() {
        let (router, _) = create_test_app();

        let (status, body) = post_check_in(&router, json!({"user_id": "7", "store_id": "1"})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "VALIDATION_ERROR");
        assert!(
            error.message.contains("event_type"),
            "Expected error message to mention event_type, got: {}",
            error.message
        );
    }

    #[tokio::test]
    async fn test_api_004_out_of_range_returns_422_and_records_nothing() {
        let (router, store) = create_test_app();

        let (status, body) = post_check_in(&router, check_in_body("arrival", 0.00135)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "OUT_OF_RANGE");
        assert_eq!(store.event_count("7"), 0);
    }

    #[tokio::test]
    async fn test_api_005_permission_denied_returns_422() {
        let (router, store) = create_test_app();

        let body = json!({
            "user_id": "7",
            "store_id": "1",
            "event_type": "arrival",
            "position_error": {"code": 1, "message": "User denied Geolocation"}
        });
        let (status, body) = post_check_in(&router, body).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "LOCATION_PERMISSION_DENIED");
        assert_eq!(store.event_count("7"), 0);
    }

    #[tokio::test]
    async fn test_api_006_no_position_reported_is_unsupported() {
        let (router, _) = create_test_app();

        let body = json!({"user_id": "7", "store_id": "1", "event_type": "arrival"});
        let (status, body) = post_check_in(&router, body).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "LOCATION_UNSUPPORTED");
    }

    #[tokio::test]
    async fn test_api_007_break_before_arrival_returns_409() {
        let (router, store) = create_test_app();

        let (status, body) = post_check_in(&router, check_in_body("break_start", 0.0)).await;

        assert_eq!(status, StatusCode::CONFLICT);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "INVALID_TRANSITION");
        assert_eq!(store.event_count("7"), 0);
    }

    #[tokio::test]
    async fn test_api_008_unknown_store_returns_404() {
        let (router, _) = create_test_app();

        let mut body = check_in_body("arrival", 0.0);
        body["store_id"] = json!("999");
        let (status, body) = post_check_in(&router, body).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "STORE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_api_009_blank_user_returns_400() {
        let (router, _) = create_test_app();

        let mut body = check_in_body("arrival", 0.0);
        body["user_id"] = json!("  ");
        let (status, body) = post_check_in(&router, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_today_without_punches_is_absent() {
        let (router, _) = create_test_app();

        let today = get_today(&router, "7").await;

        assert_eq!(today.status, AttendanceStatus::Absent);
        assert!(today.record.is_none());
        assert_eq!(today.available_events, vec![EventType::Arrival]);
        assert_eq!(today.date.to_string(), "2026-03-02");
    }

    #[tokio::test]
    async fn test_today_after_break_start_is_on_break() {
        let (router, _) = create_test_app();

        let (status, _) = post_check_in(&router, check_in_body("arrival", 0.0)).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = post_check_in(&router, check_in_body("break_start", 0.0001)).await;
        assert_eq!(status, StatusCode::OK);

        let today = get_today(&router, "7").await;

        assert_eq!(today.status, AttendanceStatus::OnBreak);
        assert_eq!(
            today.available_events,
            vec![EventType::BreakEnd, EventType::Departure]
        );

        let (status, _) = post_check_in(&router, check_in_body("arrival", 0.0)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    async fn get_history(router: &Router, user_id: &str) -> HistoryResponse {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/attendance/{}", user_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn punch_at(event_type: EventType, timestamp: &str) -> AttendanceEvent {
        AttendanceEvent {
            user_id: "7".to_string(),
            store_id: "1".to_string(),
            store_name: "Dakar Plateau".to_string(),
            event_type,
            timestamp: timestamp.parse().unwrap(),
            coordinate: Coordinate::new(STORE_LAT, STORE_LON).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_history_lists_days_most_recent_first() {
        let (router, store) = create_test_app();
        for (event_type, at) in [
            (EventType::Arrival, "2026-02-27T08:00:00Z"),
            (EventType::Departure, "2026-02-27T17:00:00Z"),
            (EventType::Arrival, "2026-03-01T08:10:00Z"),
        ] {
            store.submit(&punch_at(event_type, at)).await.unwrap();
        }
        let (status, _) = post_check_in(&router, check_in_body("arrival", 0.0)).await;
        assert_eq!(status, StatusCode::OK);

        let history = get_history(&router, "7").await;

        assert_eq!(history.user_id, "7");
        let dates: Vec<String> = history.records.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2026-03-02", "2026-03-01", "2026-02-27"]);
        assert!(history.records[2].departure_time.is_some());
    }

    #[tokio::test]
    async fn test_history_of_unknown_user_is_empty() {
        let (router, _) = create_test_app();

        let history = get_history(&router, "42").await;

        assert_eq!(history.user_id, "42");
        assert!(history.records.is_empty());
    }
}
