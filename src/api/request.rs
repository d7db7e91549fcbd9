//! Request types for the Pointage Engine API.
//!
//! This module defines the JSON request structures for the `/checkin` endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::location::{ReportedPosition, SensorError};
use crate::models::{Coordinate, EventType, User};

/// Request body for the `/checkin` endpoint.
///
/// The device acquires its own position; it sends either the fix it got or
/// the sensor error. When neither is present the device is treated as having
/// no location capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInRequest {
    /// The employee punching in.
    pub user_id: String,
    /// The store the employee is assigned to.
    pub store_id: String,
    /// The punch to record.
    pub event_type: EventType,
    /// The fix reported by the device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionRequest>,
    /// The sensor failure reported by the device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_error: Option<PositionErrorRequest>,
}

/// A device fix in a check-in request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRequest {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Accuracy radius in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// When the fix was captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A device sensor failure in a check-in request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionErrorRequest {
    /// Platform error code: 1 denied, 2 unavailable, 3 timeout.
    pub code: i32,
    /// Platform error message.
    #[serde(default)]
    pub message: String,
}

impl CheckInRequest {
    /// The punching user, assigned to the requested store.
    pub fn user(&self) -> User {
        User::assigned_to(self.user_id.clone(), self.store_id.clone())
    }

    /// Converts what the device reported into a replayable sensor.
    ///
    /// A reported fix takes precedence over a reported error. Fails with
    /// `InvalidCoordinate` when the fix is out of range.
    pub fn reported_position(&self) -> EngineResult<ReportedPosition> {
        if let Some(position) = &self.position {
            return Ok(ReportedPosition::Fix {
                coordinate: Coordinate::new(position.latitude, position.longitude)?,
                accuracy_meters: position.accuracy,
                captured_at: position.timestamp,
            });
        }

        Ok(match &self.position_error {
            Some(error) => ReportedPosition::Failed(SensorError::from_code(
                error.code,
                error.message.clone(),
            )),
            None => ReportedPosition::Missing,
        })
    }
}
