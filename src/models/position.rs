//! Position acquired from a location sensor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Coordinate;

/// The accuracy mode requested from the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyMode {
    /// GPS-grade fix, slower and more power hungry.
    High,
    /// Network/cell based fix.
    Low,
}

impl std::fmt::Display for AccuracyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccuracyMode::High => write!(f, "high"),
            AccuracyMode::Low => write!(f, "low"),
        }
    }
}

/// A single fix produced by one acquisition attempt. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Where the device was.
    pub coordinate: Coordinate,
    /// Reported accuracy radius in meters, when the sensor provides one.
    #[serde(default)]
    pub accuracy_meters: Option<f64>,
    /// When the fix was captured, when the sensor provides it.
    #[serde(default)]
    pub captured_at: Option<DateTime<Utc>>,
    /// The mode of the attempt that produced this fix.
    pub mode: AccuracyMode,
}

impl Position {
    /// Creates a position without accuracy or capture time.
    pub fn new(coordinate: Coordinate, mode: AccuracyMode) -> Self {
        Self {
            coordinate,
            accuracy_meters: None,
            captured_at: None,
            mode,
        }
    }

    /// Sets the reported accuracy. Negative or non-finite values are dropped.
    pub fn with_accuracy(mut self, accuracy_meters: f64) -> Self {
        self.accuracy_meters =
            (accuracy_meters.is_finite() && accuracy_meters >= 0.0).then_some(accuracy_meters);
        self
    }

    /// Sets the capture timestamp.
    pub fn captured_at(mut self, at: DateTime<Utc>) -> Self {
        self.captured_at = Some(at);
        self
    }
}
