//! Core data models for the Pointage Engine.
//!
//! This module contains the value types and records shared by the
//! geolocation, state machine and orchestration layers.

mod attendance;
mod coordinate;
mod position;
mod store;

pub use attendance::{AttendanceEvent, AttendanceRecord, EventType};
pub use coordinate::Coordinate;
pub use position::{AccuracyMode, Position};
pub use store::{StoreSite, User};
