//! Device position acquisition.
//!
//! [`LocationSensor`] is the platform primitive. [`PositionAcquirer`] wraps it
//! with the two-tier accuracy policy and classifies failures into
//! [`LocationError`](crate::error::LocationError).

mod acquirer;
mod reported;
mod sensor;

pub use acquirer::{AcquisitionAttempt, AcquisitionPolicy, PositionAcquirer};
pub use reported::ReportedPosition;
pub use sensor::{LocationSensor, SensorError};
