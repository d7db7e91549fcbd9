//! Adapters for the persistence and store-directory collaborators.
//!
//! - [`InMemoryAttendanceStore`] keeps an append-only event log in process.
//! - [`StaticStoreDirectory`] serves stores loaded from configuration.
//! - [`HttpBackend`] talks to the REST attendance backend.

mod http;
mod memory;
mod wire;

pub use http::{HttpBackend, HttpBackendSettings};
pub use memory::{InMemoryAttendanceStore, StaticStoreDirectory};
pub use wire::{AttendancePayload, LooseId, LooseNumber, RawAttendanceRecord, RawStore};
