//! Attendance events and day records.
//!
//! Punches are submitted as [`AttendanceEvent`]s and folded into one
//! [`AttendanceRecord`] per user per local calendar day.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Coordinate;

/// The kind of punch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Start of the working day.
    Arrival,
    /// End of the working day.
    Departure,
    /// Start of the pause.
    BreakStart,
    /// End of the pause.
    BreakEnd,
}

impl EventType {
    /// All event types in the order they normally happen during a day.
    pub const ALL: [EventType; 4] = [
        EventType::Arrival,
        EventType::BreakStart,
        EventType::BreakEnd,
        EventType::Departure,
    ];
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Arrival => write!(f, "arrival"),
            EventType::Departure => write!(f, "departure"),
            EventType::BreakStart => write!(f, "break_start"),
            EventType::BreakEnd => write!(f, "break_end"),
        }
    }
}

/// A punch as submitted to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    /// Who punched.
    pub user_id: String,
    /// Store the punch was validated against.
    pub store_id: String,
    /// Store display name, denormalized onto the record by the backend.
    pub store_name: String,
    /// What kind of punch.
    pub event_type: EventType,
    /// When the punch happened.
    pub timestamp: DateTime<Utc>,
    /// Where the device was.
    pub coordinate: Coordinate,
}

/// The logical attendance record of one user for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Record identifier.
    pub id: String,
    /// Owner of the record.
    pub user_id: String,
    /// Store the punches were made at.
    pub store_id: String,
    /// Local calendar day of the record.
    pub date: NaiveDate,
    /// Arrival punch.
    #[serde(default)]
    pub arrival_time: Option<DateTime<Utc>>,
    /// Departure punch.
    #[serde(default)]
    pub departure_time: Option<DateTime<Utc>>,
    /// Break start punch.
    #[serde(default)]
    pub break_start: Option<DateTime<Utc>>,
    /// Break end punch.
    #[serde(default)]
    pub break_end: Option<DateTime<Utc>>,
    /// Whole minutes between break start and break end.
    #[serde(default)]
    pub break_duration_minutes: Option<i64>,
    /// Coordinate of the most recent punch.
    pub coordinate: Coordinate,
    /// Type of the most recent punch.
    pub event_type: EventType,
}

impl AttendanceRecord {
    /// Creates an empty day record seeded from the day's first event.
    ///
    /// None of the punch fields are set; apply the event with
    /// [`apply_event`](crate::attendance::apply_event) to fill them in.
    pub fn open(id: impl Into<String>, date: NaiveDate, event: &AttendanceEvent) -> Self {
        Self {
            id: id.into(),
            user_id: event.user_id.clone(),
            store_id: event.store_id.clone(),
            date,
            arrival_time: None,
            departure_time: None,
            break_start: None,
            break_end: None,
            break_duration_minutes: None,
            coordinate: event.coordinate,
            event_type: event.event_type,
        }
    }
}
