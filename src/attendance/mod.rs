//! Attendance logic.
//!
//! This module contains the attendance state machine, the folding of punches
//! into per-day records, and the check-in orchestrator that ties position
//! acquisition, the geofence and persistence together.

mod day_record;
mod orchestrator;
mod state_machine;

pub use day_record::{day_record_id, find_today, fold_events, local_date, merge_records};
pub use orchestrator::{
    CHECK_IN_CONTEXT, CheckInOrchestrator, CheckInOutcome, MAX_FIX_CLOCK_SKEW_SECONDS,
};
pub use state_machine::{AttendanceStatus, apply_event, available_events, validate_transition};
