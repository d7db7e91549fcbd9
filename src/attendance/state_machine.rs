//! Attendance state machine.
//!
//! The status is never stored; it is derived from today's record. Each punch
//! has a precondition on that record, checked before any position is
//! acquired.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceEvent, AttendanceRecord, EventType};

/// Where the employee stands today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Not arrived yet, or already left.
    Absent,
    /// Arrived and working.
    Present,
    /// Arrived and currently on break.
    OnBreak,
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceStatus::Absent => write!(f, "absent"),
            AttendanceStatus::Present => write!(f, "present"),
            AttendanceStatus::OnBreak => write!(f, "on_break"),
        }
    }
}

impl AttendanceStatus {
    /// Derives the status from today's record.
    ///
    /// # Example
    ///
    /// ```
    /// use pointage_engine::attendance::AttendanceStatus;
    ///
    /// assert_eq!(AttendanceStatus::of(None), AttendanceStatus::Absent);
    /// ```
    pub fn of(record: Option<&AttendanceRecord>) -> Self {
        let Some(record) = record else {
            return AttendanceStatus::Absent;
        };

        if record.arrival_time.is_none() || record.departure_time.is_some() {
            AttendanceStatus::Absent
        } else if record.break_start.is_some() && record.break_end.is_none() {
            AttendanceStatus::OnBreak
        } else {
            AttendanceStatus::Present
        }
    }
}

/// Checks the precondition of `event` against today's record.
///
/// | Event | Precondition |
/// |---|---|
/// | arrival | no arrival today |
/// | break_start | arrived, break not started |
/// | break_end | break started, not ended |
/// | departure | arrived, not departed |
pub fn validate_transition(event: EventType, record: Option<&AttendanceRecord>) -> EngineResult<()> {
    let arrived = record.is_some_and(|r| r.arrival_time.is_some());
    let departed = record.is_some_and(|r| r.departure_time.is_some());
    let break_started = record.is_some_and(|r| r.break_start.is_some());
    let break_ended = record.is_some_and(|r| r.break_end.is_some());

    let violation = match event {
        EventType::Arrival if arrived => Some("arrival already recorded today"),
        EventType::BreakStart if !arrived => Some("no arrival recorded today"),
        EventType::BreakStart if break_started => Some("break already started today"),
        EventType::BreakEnd if !break_started => Some("break has not started"),
        EventType::BreakEnd if break_ended => Some("break already ended today"),
        EventType::Departure if !arrived => Some("no arrival recorded today"),
        EventType::Departure if departed => Some("departure already recorded today"),
        _ => None,
    };

    match violation {
        Some(reason) => Err(EngineError::InvalidTransition { event, reason }),
        None => Ok(()),
    }
}

/// The punches currently legal for today's record.
pub fn available_events(record: Option<&AttendanceRecord>) -> Vec<EventType> {
    EventType::ALL
        .into_iter()
        .filter(|event| validate_transition(*event, record).is_ok())
        .collect()
}

/// Applies a punch to a day record.
///
/// Validates the transition first and leaves the record untouched on error.
/// Ending a break also computes the break duration in whole minutes.
pub fn apply_event(record: &mut AttendanceRecord, event: &AttendanceEvent) -> EngineResult<()> {
    validate_transition(event.event_type, Some(record))?;

    let at = event.timestamp;
    match event.event_type {
        EventType::Arrival => record.arrival_time = Some(at),
        EventType::Departure => record.departure_time = Some(at),
        EventType::BreakStart => record.break_start = Some(at),
        EventType::BreakEnd => {
            record.break_end = Some(at);
            record.break_duration_minutes = record
                .break_start
                .map(|start| (at - start).num_minutes().max(0));
        }
    }

    record.coordinate = event.coordinate;
    record.event_type = event.event_type;
    Ok(())
}
