//! Pointage Engine: geofenced attendance check-in.
//!
//! This crate records employee punches (arrival, break start, break end,
//! departure) only when a freshly acquired device position lies within a
//! configured radius of the employee's store. It provides:
//!
//! - [`geo`]: great-circle distance and the geofence check
//! - [`location`]: two-tier position acquisition over a [`location::LocationSensor`]
//! - [`attendance`]: the daily state machine, day records and the check-in orchestrator
//! - [`backend`]: in-memory and REST persistence
//! - [`api`]: the HTTP service

#![warn(missing_docs)]

pub mod api;
pub mod attendance;
pub mod backend;
pub mod config;
pub mod error;
pub mod geo;
pub mod location;
pub mod models;
pub mod ports;
