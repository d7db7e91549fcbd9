//! A sensor that replays what the client device reported.
//!
//! The HTTP service cannot read the employee's GPS itself; the client sends
//! the fix (or the error it got) with the check-in request and the service
//! feeds it through the same acquisition policy.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{AccuracyMode, Coordinate, Position};

use super::{LocationSensor, SensorError};

/// What the client reported about its location.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportedPosition {
    /// The client obtained a fix.
    Fix {
        /// Where the device was.
        coordinate: Coordinate,
        /// Accuracy radius in meters, if reported.
        accuracy_meters: Option<f64>,
        /// Capture time, if reported.
        captured_at: Option<DateTime<Utc>>,
    },
    /// The client's sensor failed.
    Failed(SensorError),
    /// The client has no location capability.
    Missing,
}

#[async_trait]
impl LocationSensor for ReportedPosition {
    fn is_supported(&self) -> bool {
        !matches!(self, ReportedPosition::Missing)
    }

    async fn get_position(
        &self,
        mode: AccuracyMode,
        _timeout: Duration,
    ) -> Result<Position, SensorError> {
        match self {
            ReportedPosition::Fix {
                coordinate,
                accuracy_meters,
                captured_at,
            } => {
                let mut position = Position::new(*coordinate, mode);
                if let Some(accuracy) = accuracy_meters {
                    position = position.with_accuracy(*accuracy);
                }
                if let Some(at) = captured_at {
                    position = position.captured_at(*at);
                }
                Ok(position)
            }
            ReportedPosition::Failed(err) => Err(err.clone()),
            ReportedPosition::Missing => Err(SensorError::PositionUnavailable {
                message: "no position reported".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fix_is_returned_in_requested_mode() {
        let coordinate = Coordinate::new(14.7, -17.4).unwrap();
        let reported = ReportedPosition::Fix {
            coordinate,
            accuracy_meters: Some(8.0),
            captured_at: None,
        };

        let position = reported
            .get_position(AccuracyMode::Low, Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(position.coordinate, coordinate);
        assert_eq!(position.accuracy_meters, Some(8.0));
        assert_eq!(position.mode, AccuracyMode::Low);
    }

    #[tokio::test]
    async fn test_failure_is_replayed() {
        let reported = ReportedPosition::Failed(SensorError::from_code(1, "denied"));
        let err = reported
            .get_position(AccuracyMode::High, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SensorError::PermissionDenied { .. }));
    }

    #[test]
    fn test_missing_is_unsupported() {
        assert!(!ReportedPosition::Missing.is_supported());
        assert!(ReportedPosition::Failed(SensorError::Timeout).is_supported());
    }
}
