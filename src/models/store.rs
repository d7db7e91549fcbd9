//! Store sites and the users assigned to them.

use serde::{Deserialize, Serialize};

use super::Coordinate;

/// A physical store with the coordinate its geofence is centred on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSite {
    /// Store identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Centre of the geofence.
    pub coordinate: Coordinate,
}

/// The employee punching in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: String,
    /// The store the user is assigned to, if any.
    #[serde(default)]
    pub store_id: Option<String>,
}

impl User {
    /// Creates a user assigned to the given store.
    pub fn assigned_to(id: impl Into<String>, store_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            store_id: Some(store_id.into()),
        }
    }
}
