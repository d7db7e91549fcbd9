//! Geofence policy.
//!
//! A check-in is accepted only when the acquired position lies within the
//! configured radius around the store coordinate.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{EngineError, EngineResult};
use crate::models::Coordinate;
use crate::ports::SettingsStore;

use super::haversine_distance;

/// Radius used when no usable setting is available.
pub const DEFAULT_GEOFENCE_RADIUS_METERS: f64 = 100.0;

/// Process-wide geofence configuration, read-only once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeofenceParts")]
pub struct GeofenceConfig {
    radius_meters: f64,
}

#[derive(Deserialize)]
struct GeofenceParts {
    radius_meters: f64,
}

impl TryFrom<GeofenceParts> for GeofenceConfig {
    type Error = EngineError;

    fn try_from(parts: GeofenceParts) -> EngineResult<Self> {
        GeofenceConfig::new(parts.radius_meters)
    }
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        Self {
            radius_meters: DEFAULT_GEOFENCE_RADIUS_METERS,
        }
    }
}

impl GeofenceConfig {
    /// Creates a configuration with an explicit radius.
    ///
    /// Fails with `InvalidConfig` unless the radius is positive and finite.
    pub fn new(radius_meters: f64) -> EngineResult<Self> {
        if !(radius_meters.is_finite() && radius_meters > 0.0) {
            return Err(EngineError::InvalidConfig {
                field: "geofence.radius_meters".to_string(),
                message: format!("must be a positive number, got {}", radius_meters),
            });
        }
        Ok(Self { radius_meters })
    }

    /// Builds the configuration from a settings store.
    ///
    /// Falls back to [`DEFAULT_GEOFENCE_RADIUS_METERS`] when the setting is
    /// unset, unreadable or not a positive number.
    ///
    /// # Example
    ///
    /// ```
    /// use pointage_engine::error::EngineResult;
    /// use pointage_engine::geo::GeofenceConfig;
    /// use pointage_engine::ports::SettingsStore;
    ///
    /// struct Unset;
    ///
    /// impl SettingsStore for Unset {
    ///     fn geofence_radius_meters(&self) -> EngineResult<Option<f64>> {
    ///         Ok(None)
    ///     }
    /// }
    ///
    /// assert_eq!(GeofenceConfig::from_settings(&Unset).radius_meters(), 100.0);
    /// ```
    pub fn from_settings(settings: &dyn SettingsStore) -> Self {
        match settings.geofence_radius_meters() {
            Ok(Some(radius)) => Self::new(radius).unwrap_or_else(|err| {
                warn!(error = %err, "Ignoring geofence radius setting");
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(err) => {
                warn!(error = %err, "Could not read geofence radius setting");
                Self::default()
            }
        }
    }

    /// The allowed distance from the store, in meters.
    pub fn radius_meters(&self) -> f64 {
        self.radius_meters
    }
}

/// Outcome of comparing a position against a store geofence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeofenceCheck {
    /// Measured distance between the position and the store.
    pub distance_meters: f64,
    /// Radius the distance was compared against.
    pub radius_meters: f64,
}

impl GeofenceCheck {
    /// True when the position is inside the geofence. The boundary counts as inside.
    pub fn is_within(&self) -> bool {
        self.distance_meters <= self.radius_meters
    }

    /// Returns the distance, or `OutOfRange` when outside the geofence.
    pub fn into_result(self) -> EngineResult<f64> {
        if self.is_within() {
            Ok(self.distance_meters)
        } else {
            Err(EngineError::OutOfRange {
                distance_meters: self.distance_meters,
                radius_meters: self.radius_meters,
            })
        }
    }
}

/// Measures how far `position` is from `store` and compares it to the radius.
pub fn check_geofence(
    position: Coordinate,
    store: Coordinate,
    config: &GeofenceConfig,
) -> GeofenceCheck {
    GeofenceCheck {
        distance_meters: haversine_distance(position, store),
        radius_meters: config.radius_meters(),
    }
}
