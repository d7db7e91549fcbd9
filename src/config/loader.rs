//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from YAML files.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::FixedOffset;

use crate::backend::StaticStoreDirectory;
use crate::error::{EngineError, EngineResult};
use crate::geo::GeofenceConfig;
use crate::location::AcquisitionPolicy;
use crate::models::{Coordinate, StoreSite};
use crate::ports::SettingsStore;

use super::types::{BackendSettings, Settings, StoresConfig};

/// Loads and provides access to the engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── settings.yaml   # Geofence, acquisition, zone, server and backend
/// └── stores.yaml     # Optional list of stores
/// ```
///
/// # Example
///
/// ```no_run
/// use pointage_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default")?;
/// let store = loader.get_store("1")?;
/// println!("{} at {:?}", store.name, store.coordinate);
/// # Ok::<(), pointage_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    settings: Settings,
    stores: Vec<StoreSite>,
    local_offset: FixedOffset,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if `settings.yaml` is missing, any file contains
    /// invalid YAML, or a value fails validation.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<Settings>(&path.join("settings.yaml"))?;

        let stores_path = path.join("stores.yaml");
        let stores = if stores_path.exists() {
            Self::load_yaml::<StoresConfig>(&stores_path)?
        } else {
            StoresConfig::default()
        };

        Self::from_parts(settings, stores)
    }

    /// Builds a loader from already parsed configuration, validating it.
    pub fn from_parts(settings: Settings, stores: StoresConfig) -> EngineResult<Self> {
        let local_offset = FixedOffset::east_opt(settings.utc_offset_minutes.saturating_mul(60))
            .ok_or_else(|| EngineError::InvalidConfig {
                field: "utc_offset_minutes".to_string(),
                message: format!("{} is not a valid offset", settings.utc_offset_minutes),
            })?;

        if let Some(radius) = settings.geofence.radius_meters {
            GeofenceConfig::new(radius)?;
        }

        for (field, value) in [
            (
                "location.high_accuracy_timeout_ms",
                settings.location.high_accuracy_timeout_ms,
            ),
            (
                "location.low_accuracy_timeout_ms",
                settings.location.low_accuracy_timeout_ms,
            ),
        ] {
            if value == 0 {
                return Err(EngineError::InvalidConfig {
                    field: field.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
        }

        let stores = Self::validate_stores(stores)?;

        Ok(Self {
            settings,
            stores,
            local_offset,
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate_stores(config: StoresConfig) -> EngineResult<Vec<StoreSite>> {
        let mut seen = HashSet::new();
        let mut stores = Vec::with_capacity(config.stores.len());

        for (index, entry) in config.stores.into_iter().enumerate() {
            let id = entry.id.to_string();
            if !seen.insert(id.clone()) {
                return Err(EngineError::InvalidConfig {
                    field: format!("stores[{}].id", index),
                    message: format!("duplicate store id '{}'", id),
                });
            }

            let coordinate = Coordinate::new(entry.latitude, entry.longitude).map_err(|err| {
                EngineError::InvalidConfig {
                    field: format!("stores[{}]", index),
                    message: err.to_string(),
                }
            })?;

            stores.push(StoreSite {
                id,
                name: entry.name,
                coordinate,
            });
        }

        Ok(stores)
    }

    /// Returns the raw settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The geofence configuration, defaulting to 100 meters.
    pub fn geofence(&self) -> GeofenceConfig {
        GeofenceConfig::from_settings(self)
    }

    /// The position acquisition policy.
    pub fn acquisition_policy(&self) -> AcquisitionPolicy {
        AcquisitionPolicy::from_timeouts(
            self.settings.location.high_accuracy_timeout_ms,
            self.settings.location.low_accuracy_timeout_ms,
        )
    }

    /// The local zone used to decide calendar days.
    pub fn local_offset(&self) -> FixedOffset {
        self.local_offset
    }

    /// Address the HTTP service listens on.
    pub fn bind_address(&self) -> &str {
        &self.settings.server.bind_address
    }

    /// Persistence backend selection.
    pub fn backend(&self) -> &BackendSettings {
        &self.settings.backend
    }

    /// All configured stores.
    pub fn stores(&self) -> &[StoreSite] {
        &self.stores
    }

    /// Gets a configured store by id.
    pub fn get_store(&self, id: &str) -> EngineResult<&StoreSite> {
        self.stores
            .iter()
            .find(|store| store.id == id)
            .ok_or_else(|| EngineError::NotFound {
                entity: "store",
                id: id.to_string(),
            })
    }

    /// A store directory over the configured stores.
    pub fn store_directory(&self) -> StaticStoreDirectory {
        StaticStoreDirectory::new(self.stores.iter().cloned())
    }
}

impl SettingsStore for ConfigLoader {
    fn geofence_radius_meters(&self) -> EngineResult<Option<f64>> {
        Ok(self.settings.geofence.radius_meters)
    }
}
