//! Application state for the Pointage Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate};

use crate::attendance::local_date;
use crate::config::ConfigLoader;
use crate::geo::GeofenceConfig;
use crate::location::AcquisitionPolicy;
use crate::ports::{AttendancePersistence, Clock, StoreDirectory, SystemClock};

/// Shared application state.
///
/// Holds the collaborators and the policy every check-in is evaluated with.
#[derive(Clone)]
pub struct AppState {
    persistence: Arc<dyn AttendancePersistence>,
    directory: Arc<dyn StoreDirectory>,
    clock: Arc<dyn Clock>,
    geofence: GeofenceConfig,
    policy: AcquisitionPolicy,
    local_offset: FixedOffset,
}

impl AppState {
    /// Creates the state from loaded configuration and the chosen backend.
    pub fn new(
        config: &ConfigLoader,
        persistence: Arc<dyn AttendancePersistence>,
        directory: Arc<dyn StoreDirectory>,
    ) -> Self {
        Self {
            persistence,
            directory,
            clock: Arc::new(SystemClock),
            geofence: config.geofence(),
            policy: config.acquisition_policy(),
            local_offset: config.local_offset(),
        }
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Where attendance is recorded.
    pub fn persistence(&self) -> &Arc<dyn AttendancePersistence> {
        &self.persistence
    }

    /// Where stores are resolved.
    pub fn directory(&self) -> &dyn StoreDirectory {
        self.directory.as_ref()
    }

    /// The clock used for "today" and missing capture times.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// The geofence in force.
    pub fn geofence(&self) -> GeofenceConfig {
        self.geofence
    }

    /// The acquisition policy applied to reported positions.
    pub fn policy(&self) -> AcquisitionPolicy {
        self.policy
    }

    /// The local zone.
    pub fn local_offset(&self) -> FixedOffset {
        self.local_offset
    }

    /// Today's date in the local zone.
    pub fn today(&self) -> NaiveDate {
        local_date(self.clock.now(), self.local_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryAttendanceStore;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_state_takes_policy_from_config() {
        let config = ConfigLoader::load("./config/default").expect("Failed to load config");
        let state = AppState::new(
            &config,
            Arc::new(InMemoryAttendanceStore::new(config.local_offset())),
            Arc::new(config.store_directory()),
        );

        assert_eq!(state.geofence().radius_meters(), 100.0);
        assert_eq!(state.policy(), AcquisitionPolicy::default());
    }
}
