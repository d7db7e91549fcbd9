//! Collaborator interfaces the check-in engine depends on.
//!
//! Persistence, the store directory, settings and the wall clock live outside
//! the engine. Adapters for them are in [`crate::backend`] and
//! [`crate::config`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::EngineResult;
use crate::models::{AttendanceEvent, AttendanceRecord, StoreSite};

/// Looks up stores by id.
#[async_trait]
pub trait StoreDirectory: Send + Sync {
    /// Returns the store, or `NotFound` when no store has this id.
    async fn get_store(&self, id: &str) -> EngineResult<StoreSite>;
}

/// Stores attendance punches and serves the resulting day records.
#[async_trait]
pub trait AttendancePersistence: Send + Sync {
    /// Records one punch and returns the updated day record.
    async fn submit(&self, event: &AttendanceEvent) -> EngineResult<AttendanceRecord>;

    /// Returns every day record of a user, most recent first.
    async fn list_for_user(&self, user_id: &str) -> EngineResult<Vec<AttendanceRecord>>;
}

/// Source of user-adjustable settings.
pub trait SettingsStore: Send + Sync {
    /// The configured geofence radius in meters, `None` when unset.
    fn geofence_radius_meters(&self) -> EngineResult<Option<f64>>;
}

/// Wall clock, injectable for tests.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
