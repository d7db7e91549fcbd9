//! Geometry for the geofenced check-in.
//!
//! This module contains the great-circle distance calculation and the
//! geofence policy that compares a measured distance against the configured
//! radius.

mod distance;
mod geofence;

pub use distance::{EARTH_RADIUS_METERS, haversine_distance};
pub use geofence::{DEFAULT_GEOFENCE_RADIUS_METERS, GeofenceCheck, GeofenceConfig, check_geofence};
