//! Response types for the Pointage Engine API.
//!
//! This module defines the success bodies, the error response structures and
//! the mapping from [`EngineError`] to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::attendance::AttendanceStatus;
use crate::error::{EngineError, LocationError};
use crate::models::{AttendanceRecord, EventType};

/// Response body of `GET /attendance/{user_id}/today`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodayResponse {
    /// The employee.
    pub user_id: String,
    /// Today's date in the service's local zone.
    pub date: NaiveDate,
    /// Status derived from today's record.
    pub status: AttendanceStatus,
    /// Today's record, if any punch was made.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<AttendanceRecord>,
    /// Punches that are currently legal.
    pub available_events: Vec<EventType>,
}

/// Response body of `GET /attendance/{user_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// The employee.
    pub user_id: String,
    /// One record per day, most recent first.
    pub records: Vec<AttendanceRecord>,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

fn location_code(error: LocationError) -> &'static str {
    match error {
        LocationError::Unsupported => "LOCATION_UNSUPPORTED",
        LocationError::PermissionDenied => "LOCATION_PERMISSION_DENIED",
        LocationError::PositionUnavailable => "POSITION_UNAVAILABLE",
        LocationError::Timeout => "LOCATION_TIMEOUT",
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfig { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            },
            EngineError::InvalidCoordinate { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::new("INVALID_COORDINATE", message),
            },
            EngineError::Location { source, .. } => ApiErrorResponse {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: ApiError::new(location_code(source), message),
            },
            EngineError::OutOfRange {
                distance_meters,
                radius_meters,
            } => ApiErrorResponse {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: ApiError::with_details(
                    "OUT_OF_RANGE",
                    message,
                    format!(
                        "distance_meters={:.1} radius_meters={:.1}",
                        distance_meters, radius_meters
                    ),
                ),
            },
            EngineError::InvalidTransition { .. } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::new("INVALID_TRANSITION", message),
            },
            EngineError::NotFound { entity, .. } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new(format!("{}_NOT_FOUND", entity.to_uppercase()), message),
            },
            EngineError::SubmissionFailed { .. } => ApiErrorResponse {
                status: StatusCode::BAD_GATEWAY,
                error: ApiError::new("SUBMISSION_FAILED", message),
            },
            EngineError::MalformedRecord { .. } => ApiErrorResponse {
                status: StatusCode::BAD_GATEWAY,
                error: ApiError::with_details(
                    "MALFORMED_RECORD",
                    "The attendance backend returned an unreadable record",
                    message,
                ),
            },
            EngineError::Backend { .. } => ApiErrorResponse {
                status: StatusCode::BAD_GATEWAY,
                error: ApiError::new("BACKEND_ERROR", message),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(error: EngineError) -> ApiErrorResponse {
        error.into()
    }

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }

    #[test]
    fn test_out_of_range_maps_to_422() {
        let response = map(EngineError::OutOfRange {
            distance_meters: 150.2,
            radius_meters: 100.0,
        });
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.error.code, "OUT_OF_RANGE");
        assert_eq!(
            response.error.details.as_deref(),
            Some("distance_meters=150.2 radius_meters=100.0")
        );
    }

    #[test]
    fn test_location_errors_keep_their_classification() {
        let response = map(EngineError::location(
            "during check-in",
            LocationError::PermissionDenied,
        ));
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.error.code, "LOCATION_PERMISSION_DENIED");
        assert!(response.error.message.contains("during check-in"));
    }

    #[test]
    fn test_invalid_transition_maps_to_409() {
        let response = map(EngineError::InvalidTransition {
            event: EventType::Arrival,
            reason: "arrival already recorded today",
        });
        assert_eq!(response.status, StatusCode::CONFLICT);
        assert_eq!(response.error.code, "INVALID_TRANSITION");
    }

    #[test]
    fn test_not_found_code_names_the_entity() {
        let response = map(EngineError::NotFound {
            entity: "store",
            id: "9".to_string(),
        });
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.error.code, "STORE_NOT_FOUND");
    }

    #[test]
    fn test_backend_failures_map_to_502() {
        for error in [
            EngineError::SubmissionFailed {
                message: "boom".to_string(),
            },
            EngineError::Backend {
                message: "boom".to_string(),
            },
            EngineError::malformed("date_pointage", "missing"),
        ] {
            assert_eq!(map(error).status, StatusCode::BAD_GATEWAY);
        }
    }

    #[test]
    fn test_config_errors_map_to_500() {
        let response = map(EngineError::ConfigNotFound {
            path: "settings.yaml".to_string(),
        });
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.error.code, "CONFIG_ERROR");
    }
}
