//! Check-in orchestration.
//!
//! A check-in runs strictly in order: validate the transition, acquire a fresh
//! position, measure the distance to the store, enforce the geofence, then
//! submit exactly one event. Nothing is written unless every step succeeds.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult, LocationError};
use crate::geo::{GeofenceConfig, check_geofence};
use crate::location::{LocationSensor, PositionAcquirer};
use crate::models::{AttendanceEvent, AttendanceRecord, EventType, Position, StoreSite, User};
use crate::ports::{AttendancePersistence, Clock, StoreDirectory, SystemClock};

use super::{AttendanceStatus, find_today, local_date, validate_transition};

/// Context attached to location failures raised by a check-in.
pub const CHECK_IN_CONTEXT: &str = "during check-in";

/// How far ahead of the server clock a fix may be stamped.
pub const MAX_FIX_CLOCK_SKEW_SECONDS: i64 = 5;

/// Result of a check-in resolved against the user's own store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInOutcome {
    /// The updated day record.
    pub record: AttendanceRecord,
    /// Status derived from the updated record.
    pub status: AttendanceStatus,
    /// Distance between the acquired position and the store.
    pub distance_meters: f64,
}

/// Coordinates position acquisition, the geofence and persistence.
pub struct CheckInOrchestrator<S> {
    acquirer: PositionAcquirer<S>,
    persistence: Arc<dyn AttendancePersistence>,
    clock: Arc<dyn Clock>,
    geofence: GeofenceConfig,
    local_offset: FixedOffset,
}

impl<S: LocationSensor> CheckInOrchestrator<S> {
    /// Creates an orchestrator using the system clock and UTC as local zone.
    pub fn new(
        acquirer: PositionAcquirer<S>,
        persistence: Arc<dyn AttendancePersistence>,
        geofence: GeofenceConfig,
    ) -> Self {
        Self {
            acquirer,
            persistence,
            clock: Arc::new(SystemClock),
            geofence,
            local_offset: Utc.fix(),
        }
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the zone used to decide which calendar day "today" is.
    pub fn with_local_offset(mut self, offset: FixedOffset) -> Self {
        self.local_offset = offset;
        self
    }

    /// The geofence in force.
    pub fn geofence(&self) -> &GeofenceConfig {
        &self.geofence
    }

    /// Today's date in the local zone.
    pub fn today(&self) -> NaiveDate {
        local_date(self.clock.now(), self.local_offset)
    }

    /// Records one punch for `user` at `store`.
    ///
    /// `today_record` is the user's current record; a record dated another day
    /// is treated as no record.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` before any position is requested
    /// - `Location` with the acquirer's classified failure
    /// - `OutOfRange` when the position is outside the geofence
    /// - `SubmissionFailed` when persistence fails
    pub async fn check_in(
        &self,
        event_type: EventType,
        user: &User,
        store: &StoreSite,
        today_record: Option<&AttendanceRecord>,
    ) -> EngineResult<AttendanceRecord> {
        let (record, _) = self.run(event_type, user, store, today_record).await?;
        Ok(record)
    }

    /// Records one punch at the user's assigned store.
    ///
    /// Resolves the store through `directory`, loads today's record from
    /// persistence, runs [`check_in`](Self::check_in) and recomputes the status.
    pub async fn check_in_today(
        &self,
        event_type: EventType,
        user: &User,
        directory: &dyn StoreDirectory,
    ) -> EngineResult<CheckInOutcome> {
        let store_id = user.store_id.as_deref().ok_or_else(|| EngineError::NotFound {
            entity: "store",
            id: format!("(none assigned to user {})", user.id),
        })?;
        let store = directory.get_store(store_id).await?;

        let records = self.persistence.list_for_user(&user.id).await?;
        let today_record = find_today(&records, self.today());

        let (record, distance_meters) = self.run(event_type, user, &store, today_record).await?;
        let status = AttendanceStatus::of(Some(&record));

        Ok(CheckInOutcome {
            record,
            status,
            distance_meters,
        })
    }

    /// The instant a punch is recorded at.
    ///
    /// A fix without capture time is stamped now. A stamped fix must fall on
    /// `today`, must not lie in the future beyond the tolerated skew, and must
    /// not be older than the whole acquisition window.
    fn punch_time(
        &self,
        position: &Position,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> EngineResult<DateTime<Utc>> {
        let Some(captured_at) = position.captured_at else {
            return Ok(now);
        };

        let policy = self.acquirer.policy();
        let window_ms = (policy.primary.timeout + policy.fallback.timeout)
            .as_millis()
            .min(86_400_000) as i64;
        let oldest = now - TimeDelta::milliseconds(window_ms);
        let newest = now + TimeDelta::seconds(MAX_FIX_CLOCK_SKEW_SECONDS);

        if captured_at < oldest
            || captured_at > newest
            || local_date(captured_at, self.local_offset) != today
        {
            warn!(
                captured_at = %captured_at,
                now = %now,
                today = %today,
                "Rejecting fix that is not fresh"
            );
            return Err(EngineError::location(
                CHECK_IN_CONTEXT,
                LocationError::PositionUnavailable,
            ));
        }

        Ok(captured_at)
    }

    async fn run(
        &self,
        event_type: EventType,
        user: &User,
        store: &StoreSite,
        today_record: Option<&AttendanceRecord>,
    ) -> EngineResult<(AttendanceRecord, f64)> {
        let now = self.clock.now();
        let today = local_date(now, self.local_offset);
        let today_record = today_record.filter(|record| record.date == today);

        validate_transition(event_type, today_record)?;

        let position = self
            .acquirer
            .acquire()
            .await
            .map_err(|source| EngineError::location(CHECK_IN_CONTEXT, source))?;

        let timestamp = self.punch_time(&position, now, today)?;

        let check = check_geofence(position.coordinate, store.coordinate, &self.geofence);
        debug!(
            user_id = %user.id,
            store_id = %store.id,
            distance_m = check.distance_meters,
            radius_m = check.radius_meters,
            accuracy_m = ?position.accuracy_meters,
            "Geofence check"
        );

        let distance_meters = check.into_result().inspect_err(|err| {
            warn!(user_id = %user.id, store_id = %store.id, error = %err, "Check-in rejected");
        })?;

        let event = AttendanceEvent {
            user_id: user.id.clone(),
            store_id: store.id.clone(),
            store_name: store.name.clone(),
            event_type,
            timestamp,
            coordinate: position.coordinate,
        };

        let record = self
            .persistence
            .submit(&event)
            .await
            .map_err(|err| EngineError::SubmissionFailed {
                message: err.to_string(),
            })?;

        info!(
            user_id = %user.id,
            store_id = %store.id,
            event = %event_type,
            distance_m = distance_meters.round() as i64,
            "Check-in recorded"
        );

        Ok((record, distance_meters))
    }
}
