//! Two-tier position acquisition.
//!
//! The first attempt asks for a high-accuracy fix with a generous timeout.
//! Any failure triggers exactly one low-accuracy attempt with a shorter
//! timeout. If that fails too, its error is classified and returned.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::LocationError;
use crate::models::{AccuracyMode, Position};

use super::{LocationSensor, SensorError};

/// One acquisition attempt: which mode, and how long to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionAttempt {
    /// Requested accuracy mode.
    pub mode: AccuracyMode,
    /// Deadline for the attempt.
    pub timeout: Duration,
}

/// The accuracy-tiered retry policy.
///
/// Defaults to high accuracy for 30 seconds, then low accuracy for 15 seconds.
///
/// # Example
///
/// ```
/// use pointage_engine::location::AcquisitionPolicy;
/// use pointage_engine::models::AccuracyMode;
/// use std::time::Duration;
///
/// let policy = AcquisitionPolicy::default();
/// assert_eq!(policy.primary.mode, AccuracyMode::High);
/// assert_eq!(policy.primary.timeout, Duration::from_secs(30));
/// assert_eq!(policy.fallback.mode, AccuracyMode::Low);
/// assert_eq!(policy.fallback.timeout, Duration::from_secs(15));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionPolicy {
    /// First attempt.
    pub primary: AcquisitionAttempt,
    /// Second and last attempt.
    pub fallback: AcquisitionAttempt,
}

/// Default timeout of the high-accuracy attempt, in milliseconds.
pub(crate) const HIGH_ACCURACY_TIMEOUT_MS: u64 = 30_000;

/// Default timeout of the low-accuracy attempt, in milliseconds.
pub(crate) const LOW_ACCURACY_TIMEOUT_MS: u64 = 15_000;

impl Default for AcquisitionPolicy {
    fn default() -> Self {
        Self::from_timeouts(HIGH_ACCURACY_TIMEOUT_MS, LOW_ACCURACY_TIMEOUT_MS)
    }
}

impl AcquisitionPolicy {
    /// High accuracy then low accuracy, with the given timeouts in milliseconds.
    pub fn from_timeouts(high_accuracy_ms: u64, low_accuracy_ms: u64) -> Self {
        Self {
            primary: AcquisitionAttempt {
                mode: AccuracyMode::High,
                timeout: Duration::from_millis(high_accuracy_ms),
            },
            fallback: AcquisitionAttempt {
                mode: AccuracyMode::Low,
                timeout: Duration::from_millis(low_accuracy_ms),
            },
        }
    }
}

/// Obtains a fresh device position through a [`LocationSensor`].
///
/// Every call re-acquires; previous fixes are never reused.
#[derive(Debug, Clone)]
pub struct PositionAcquirer<S> {
    sensor: S,
    policy: AcquisitionPolicy,
}

impl<S: LocationSensor> PositionAcquirer<S> {
    /// Creates an acquirer with the default policy.
    pub fn new(sensor: S) -> Self {
        Self::with_policy(sensor, AcquisitionPolicy::default())
    }

    /// Creates an acquirer with an explicit policy.
    pub fn with_policy(sensor: S, policy: AcquisitionPolicy) -> Self {
        Self { sensor, policy }
    }

    /// The wrapped sensor.
    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// The policy in use.
    pub fn policy(&self) -> &AcquisitionPolicy {
        &self.policy
    }

    /// Acquires one position, falling back to low accuracy once.
    ///
    /// The terminal error is the classification of the last attempt's failure.
    pub async fn acquire(&self) -> Result<Position, LocationError> {
        if !self.sensor.is_supported() {
            warn!("Location sensor is not supported");
            return Err(LocationError::Unsupported);
        }

        let primary = self.policy.primary;
        let first_error = match self.attempt(primary).await {
            Ok(position) => return Ok(position),
            Err(err) => err,
        };

        warn!(
            mode = %primary.mode,
            error = %first_error,
            "Position attempt failed, retrying with lower accuracy"
        );

        let fallback = self.policy.fallback;
        match self.attempt(fallback).await {
            Ok(position) => {
                info!(mode = %fallback.mode, "Position obtained on fallback attempt");
                Ok(position)
            }
            Err(err) => {
                let classified = err.classify();
                warn!(error = %err, classified = %classified, "All position attempts failed");
                Err(classified)
            }
        }
    }

    async fn attempt(&self, attempt: AcquisitionAttempt) -> Result<Position, SensorError> {
        debug!(
            mode = %attempt.mode,
            timeout_ms = attempt.timeout.as_millis() as u64,
            "Requesting position"
        );

        let request = self.sensor.get_position(attempt.mode, attempt.timeout);
        match tokio::time::timeout(attempt.timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(SensorError::Timeout),
        }
    }
}
