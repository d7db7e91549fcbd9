//! Great-circle distance calculation.

use crate::models::Coordinate;

/// Mean Earth radius used by the haversine formula, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Computes the great-circle distance between two coordinates.
///
/// Uses the haversine formula on a sphere of radius [`EARTH_RADIUS_METERS`].
/// The result is always non-negative and symmetric in its arguments.
///
/// # Example
///
/// ```
/// use pointage_engine::geo::haversine_distance;
/// use pointage_engine::models::Coordinate;
///
/// let a = Coordinate::new(48.8566, 2.3522).unwrap();
/// let b = Coordinate::new(48.8576, 2.3522).unwrap();
///
/// let meters = haversine_distance(a, b);
/// assert!((meters - 111.19).abs() < 0.5);
/// assert_eq!(haversine_distance(a, a), 0.0);
/// ```
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let phi_1 = a.latitude().to_radians();
    let phi_2 = b.latitude().to_radians();
    let delta_phi = (b.latitude() - a.latitude()).to_radians();
    let delta_lambda = (b.longitude() - a.longitude()).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi_1.cos() * phi_2.cos() * (delta_lambda / 2.0).sin().powi(2);

    // Rounding can push h a hair outside [0, 1] for antipodal points.
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().atan2((1.0 - h).sqrt())
}
