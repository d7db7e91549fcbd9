//! In-process persistence.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{FixedOffset, Offset, Utc};
use parking_lot::Mutex;
use tracing::debug;

use crate::attendance::{find_today, fold_events, local_date, validate_transition};
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceEvent, AttendanceRecord, StoreSite};
use crate::ports::{AttendancePersistence, StoreDirectory};

/// Attendance persistence over an append-only in-memory event log.
///
/// Each submission is re-validated against the user's day record before it
/// is appended, so the one-punch-per-kind-per-day invariant also holds at the
/// persistence boundary.
#[derive(Debug)]
pub struct InMemoryAttendanceStore {
    events: Mutex<HashMap<String, Vec<AttendanceEvent>>>,
    local_offset: FixedOffset,
}

impl Default for InMemoryAttendanceStore {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}

impl InMemoryAttendanceStore {
    /// Creates an empty store deriving days in the given zone.
    pub fn new(local_offset: FixedOffset) -> Self {
        Self {
            events: Mutex::new(HashMap::new()),
            local_offset,
        }
    }

    /// Number of events recorded for a user.
    pub fn event_count(&self, user_id: &str) -> usize {
        self.events.lock().get(user_id).map_or(0, Vec::len)
    }
}

#[async_trait]
impl AttendancePersistence for InMemoryAttendanceStore {
    async fn submit(&self, event: &AttendanceEvent) -> EngineResult<AttendanceRecord> {
        let mut events = self.events.lock();
        let log = events.entry(event.user_id.clone()).or_default();

        let day = local_date(event.timestamp, self.local_offset);
        let records = fold_events(log.iter(), self.local_offset)?;
        validate_transition(event.event_type, find_today(&records, day))?;

        log.push(event.clone());
        debug!(user_id = %event.user_id, event = %event.event_type, "Event appended");

        let records = fold_events(log.iter(), self.local_offset)?;
        find_today(&records, day)
            .cloned()
            .ok_or_else(|| EngineError::Backend {
                message: format!("no record for {} after appending", day),
            })
    }

    async fn list_for_user(&self, user_id: &str) -> EngineResult<Vec<AttendanceRecord>> {
        let events = self.events.lock();
        match events.get(user_id) {
            Some(log) => fold_events(log.iter(), self.local_offset),
            None => Ok(Vec::new()),
        }
    }
}

/// Store directory over a fixed set of stores.
#[derive(Debug, Clone, Default)]
pub struct StaticStoreDirectory {
    stores: HashMap<String, StoreSite>,
}

impl StaticStoreDirectory {
    /// Creates a directory from a list of stores. Later duplicates win.
    pub fn new(stores: impl IntoIterator<Item = StoreSite>) -> Self {
        Self {
            stores: stores
                .into_iter()
                .map(|store| (store.id.clone(), store))
                .collect(),
        }
    }

    /// Number of stores.
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    /// True when no store is configured.
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

#[async_trait]
impl StoreDirectory for StaticStoreDirectory {
    async fn get_store(&self, id: &str) -> EngineResult<StoreSite> {
        self.stores
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound {
                entity: "store",
                id: id.to_string(),
            })
    }
}
