//! Error types for the Pointage Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while validating and recording
//! an attendance check-in.

use thiserror::Error;

use crate::models::EventType;

/// Terminal failure of a position acquisition.
///
/// Sensor-level errors are classified into exactly one of these variants at
/// the [`PositionAcquirer`](crate::location::PositionAcquirer) boundary and
/// are never re-classified downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    /// The device has no location capability.
    #[error("geolocation is not supported on this device")]
    Unsupported,

    /// The user refused access to their position.
    #[error("geolocation permission denied")]
    PermissionDenied,

    /// The sensor could not produce a fix.
    #[error("position unavailable")]
    PositionUnavailable,

    /// No fix was produced before the attempt timed out.
    #[error("timed out waiting for a position")]
    Timeout,
}

/// The main error type for the Pointage Engine.
///
/// # Example
///
/// ```
/// use pointage_engine::error::EngineError;
///
/// let error = EngineError::OutOfRange {
///     distance_meters: 150.4,
///     radius_meters: 100.0,
/// };
/// assert_eq!(error.to_string(), "Out of range: 150m from the store, allowed radius is 100m");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value was present but unusable.
    #[error("Invalid configuration value '{field}': {message}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// Latitude or longitude outside of the valid range.
    #[error("Invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate {
        /// The rejected latitude.
        latitude: f64,
        /// The rejected longitude.
        longitude: f64,
    },

    /// Position acquisition failed.
    #[error("Location error {context}: {source}")]
    Location {
        /// Where the acquisition was requested from.
        context: &'static str,
        /// The classified acquisition failure.
        #[source]
        source: LocationError,
    },

    /// The acquired position lies outside the store geofence.
    #[error(
        "Out of range: {distance_meters:.0}m from the store, allowed radius is {radius_meters:.0}m"
    )]
    OutOfRange {
        /// Measured distance to the store.
        distance_meters: f64,
        /// Configured geofence radius.
        radius_meters: f64,
    },

    /// The punch is not legal given today's record.
    #[error("Invalid transition '{event}': {reason}")]
    InvalidTransition {
        /// The rejected event.
        event: EventType,
        /// Which precondition failed.
        reason: &'static str,
    },

    /// The persistence collaborator rejected or failed to store the event.
    #[error("Submission failed: {message}")]
    SubmissionFailed {
        /// Description of the underlying failure.
        message: String,
    },

    /// A store or user could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity ("store", "user").
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// A record coming from the backend could not be turned into a typed record.
    #[error("Malformed record field '{field}': {message}")]
    MalformedRecord {
        /// The field that failed to parse.
        field: String,
        /// Why it failed.
        message: String,
    },

    /// The backend could not be reached or answered with an error.
    #[error("Backend error: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },
}

impl EngineError {
    /// Wraps a classified acquisition failure with the caller's context.
    pub fn location(context: &'static str, source: LocationError) -> Self {
        EngineError::Location { context, source }
    }

    /// Shorthand for a [`EngineError::MalformedRecord`].
    pub fn malformed(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::MalformedRecord {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/settings.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/settings.yaml"
        );
    }

    #[test]
    fn test_location_error_keeps_context_and_source() {
        let error = EngineError::location("during check-in", LocationError::PermissionDenied);
        assert_eq!(
            error.to_string(),
            "Location error during check-in: geolocation permission denied"
        );

        let source = std::error::Error::source(&error).unwrap();
        assert_eq!(source.to_string(), "geolocation permission denied");
    }

    #[test]
    fn test_out_of_range_rounds_distance() {
        let error = EngineError::OutOfRange {
            distance_meters: 149.6,
            radius_meters: 100.0,
        };
        assert_eq!(
            error.to_string(),
            "Out of range: 150m from the store, allowed radius is 100m"
        );
    }

    #[test]
    fn test_invalid_transition_displays_event() {
        let error = EngineError::InvalidTransition {
            event: EventType::BreakEnd,
            reason: "break has not started",
        };
        assert_eq!(
            error.to_string(),
            "Invalid transition 'break_end': break has not started"
        );
    }

    #[test]
    fn test_not_found_displays_entity() {
        let error = EngineError::NotFound {
            entity: "store",
            id: "42".to_string(),
        };
        assert_eq!(error.to_string(), "store not found: 42");
    }

    #[test]
    fn test_malformed_record_helper() {
        let error = EngineError::malformed("latitude", "not a number");
        assert_eq!(
            error.to_string(),
            "Malformed record field 'latitude': not a number"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<EngineError>();
        assert_error::<LocationError>();
    }
}
