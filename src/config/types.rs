//! Configuration types.
//!
//! This module contains the strongly-typed structures deserialized from the
//! YAML files of a configuration directory.

use serde::Deserialize;

use crate::backend::{HttpBackendSettings, LooseId};
use crate::location::AcquisitionPolicy;

/// Contents of `settings.yaml`. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Geofence section.
    #[serde(default)]
    pub geofence: GeofenceSettings,
    /// Position acquisition section.
    #[serde(default)]
    pub location: LocationSettings,
    /// Offset of the local zone from UTC, used to decide calendar days.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// HTTP service section.
    #[serde(default)]
    pub server: ServerSettings,
    /// Where attendance is persisted.
    #[serde(default)]
    pub backend: BackendSettings,
}

/// Geofence settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeofenceSettings {
    /// Allowed distance from the store, in meters. Defaults to 100 when unset.
    #[serde(default)]
    pub radius_meters: Option<f64>,
}

/// Position acquisition timeouts.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationSettings {
    /// Timeout of the high-accuracy attempt.
    #[serde(default = "default_high_accuracy_timeout_ms")]
    pub high_accuracy_timeout_ms: u64,
    /// Timeout of the low-accuracy fallback attempt.
    #[serde(default = "default_low_accuracy_timeout_ms")]
    pub low_accuracy_timeout_ms: u64,
}

fn default_high_accuracy_timeout_ms() -> u64 {
    AcquisitionPolicy::default().primary.timeout.as_millis() as u64
}

fn default_low_accuracy_timeout_ms() -> u64 {
    AcquisitionPolicy::default().fallback.timeout.as_millis() as u64
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            high_accuracy_timeout_ms: default_high_accuracy_timeout_ms(),
            low_accuracy_timeout_ms: default_low_accuracy_timeout_ms(),
        }
    }
}

/// HTTP service settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Address the service listens on.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

fn default_bind_address() -> String {
    "127.0.0.1:3000".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

/// Persistence backend selection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendSettings {
    /// Keep attendance in process memory; stores come from `stores.yaml`.
    #[default]
    Memory,
    /// Use the REST attendance backend for both attendance and stores.
    Http(HttpBackendSettings),
}

/// Contents of `stores.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoresConfig {
    /// Configured stores.
    #[serde(default)]
    pub stores: Vec<StoreEntry>,
}

/// One store in `stores.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreEntry {
    /// Store identifier.
    pub id: LooseId,
    /// Display name.
    pub name: String,
    /// Latitude of the geofence centre.
    pub latitude: f64,
    /// Longitude of the geofence centre.
    pub longitude: f64,
}
