//! The platform-level location primitive.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::LocationError;
use crate::models::{AccuracyMode, Position};

/// Raw failure reported by a location sensor.
///
/// Numeric codes follow the platform geolocation convention:
/// 1 permission denied, 2 position unavailable, 3 timeout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    /// Code 1.
    #[error("permission denied: {message}")]
    PermissionDenied {
        /// Sensor-provided message.
        message: String,
    },

    /// Code 2.
    #[error("position unavailable: {message}")]
    PositionUnavailable {
        /// Sensor-provided message.
        message: String,
    },

    /// Code 3, or the attempt exceeded its deadline.
    #[error("sensor timed out")]
    Timeout,

    /// Any other code.
    #[error("sensor error {code}: {message}")]
    Other {
        /// The unrecognised code.
        code: i32,
        /// Sensor-provided message.
        message: String,
    },
}

impl SensorError {
    /// Maps a platform error code to a sensor error.
    pub fn from_code(code: i32, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            1 => SensorError::PermissionDenied { message },
            2 => SensorError::PositionUnavailable { message },
            3 => SensorError::Timeout,
            code => SensorError::Other { code, message },
        }
    }

    /// Classifies the failure into the engine's location taxonomy.
    ///
    /// Unknown codes are treated as an unavailable position.
    pub fn classify(&self) -> LocationError {
        match self {
            SensorError::PermissionDenied { .. } => LocationError::PermissionDenied,
            SensorError::PositionUnavailable { .. } | SensorError::Other { .. } => {
                LocationError::PositionUnavailable
            }
            SensorError::Timeout => LocationError::Timeout,
        }
    }
}

/// A source of device positions.
#[async_trait]
pub trait LocationSensor: Send + Sync {
    /// Whether the device has any location capability at all.
    fn is_supported(&self) -> bool {
        true
    }

    /// Requests one fix in the given mode.
    ///
    /// `timeout` is a hint for the platform; callers enforce it regardless.
    async fn get_position(
        &self,
        mode: AccuracyMode,
        timeout: Duration,
    ) -> Result<Position, SensorError>;
}
