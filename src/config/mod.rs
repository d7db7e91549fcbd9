//! Configuration loading for the Pointage Engine.
//!
//! This module loads a configuration directory made of YAML files: the
//! process settings (geofence radius, acquisition timeouts, local zone,
//! server and backend) and the store list.
//!
//! # Example
//!
//! ```no_run
//! use pointage_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Geofence radius: {}m", config.geofence().radius_meters());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    BackendSettings, GeofenceSettings, LocationSettings, ServerSettings, Settings, StoreEntry,
    StoresConfig,
};
