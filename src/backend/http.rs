//! Client for the REST attendance backend.

use std::time::Duration;

use async_trait::async_trait;
use chrono::FixedOffset;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::attendance::{find_today, merge_records};
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceEvent, AttendanceRecord, StoreSite};
use crate::ports::{AttendancePersistence, StoreDirectory};

use super::wire::{AttendancePayload, Listing, RawAttendanceRecord, RawStore};

/// Connection settings for [`HttpBackend`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpBackendSettings {
    /// Base URL of the API, e.g. `http://localhost:8000/api`.
    pub base_url: String,
    /// Bearer token sent with every request.
    #[serde(default)]
    pub token: Option<String>,
    /// Path of the attendance collection.
    #[serde(default = "default_attendance_path")]
    pub attendance_path: String,
    /// Path of the store collection.
    #[serde(default = "default_stores_path")]
    pub stores_path: String,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_attendance_path() -> String {
    "attendance/".to_string()
}

fn default_stores_path() -> String {
    "stores/".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl HttpBackendSettings {
    /// Settings for `base_url` with default paths and no token.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            attendance_path: default_attendance_path(),
            stores_path: default_stores_path(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Attendance persistence and store directory backed by the REST API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    settings: HttpBackendSettings,
    local_offset: FixedOffset,
}

impl HttpBackend {
    /// Creates a client. `local_offset` decides the calendar day of records.
    pub fn new(settings: HttpBackendSettings, local_offset: FixedOffset) -> EngineResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()
            .map_err(|err| EngineError::Backend {
                message: format!("failed to build HTTP client: {}", err),
            })?;

        Ok(Self {
            client,
            settings,
            local_offset,
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.settings.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> EngineResult<Response> {
        let response = builder.send().await.map_err(|err| EngineError::Backend {
            message: err.to_string(),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, url = %url, "Backend returned an error");
        Err(EngineError::Backend {
            message: format!("{} from {}: {}", status, url, body),
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> EngineResult<T> {
        response.json::<T>().await.map_err(|err| EngineError::Backend {
            message: format!("unexpected response body: {}", err),
        })
    }

    async fn fetch_listing<T: DeserializeOwned>(&self, path: &str) -> EngineResult<Vec<T>> {
        let response = self.send(self.request(Method::GET, path)).await?;
        let listing: Listing<T> = Self::decode(response).await?;
        Ok(listing.into_items())
    }
}

#[async_trait]
impl AttendancePersistence for HttpBackend {
    /// Posts the punch on behalf of `event.user_id` and returns the merged
    /// record of the punch's day.
    ///
    /// The service account behind the token must be allowed to punch for
    /// other users; a row attributed to anyone else is rejected.
    async fn submit(&self, event: &AttendanceEvent) -> EngineResult<AttendanceRecord> {
        let payload = AttendancePayload::from(event);
        debug!(user_id = %event.user_id, event = %event.event_type, "Posting attendance event");

        let builder = self
            .request(Method::POST, &self.settings.attendance_path)
            .json(&payload);
        let response = self.send(builder).await?;
        let raw: RawAttendanceRecord = Self::decode(response).await?;

        let owner = raw.owner();
        if owner.as_deref() != Some(event.user_id.as_str()) {
            warn!(
                user_id = %event.user_id,
                owner = ?owner,
                "Backend attributed the punch to another user"
            );
            return Err(EngineError::Backend {
                message: format!(
                    "punch for user {} was recorded for {}",
                    event.user_id,
                    owner.as_deref().unwrap_or("nobody")
                ),
            });
        }

        let posted = raw.into_record(self.local_offset)?;
        let date = posted.date;
        let mut rows = self.list_for_user(&event.user_id).await?;
        rows.push(posted);

        let merged = merge_records(rows);
        find_today(&merged, date)
            .cloned()
            .ok_or_else(|| EngineError::Backend {
                message: format!("no record for {} after posting", date),
            })
    }

    async fn list_for_user(&self, user_id: &str) -> EngineResult<Vec<AttendanceRecord>> {
        let raw: Vec<RawAttendanceRecord> =
            self.fetch_listing(&self.settings.attendance_path).await?;

        let records = raw
            .into_iter()
            .filter(|record| record.owner().as_deref() == Some(user_id))
            .map(|record| record.into_record(self.local_offset))
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(merge_records(records))
    }
}

#[async_trait]
impl StoreDirectory for HttpBackend {
    async fn get_store(&self, id: &str) -> EngineResult<StoreSite> {
        let stores: Vec<RawStore> = self.fetch_listing(&self.settings.stores_path).await?;

        stores
            .into_iter()
            .find(|store| store.id().as_deref() == Some(id))
            .ok_or_else(|| EngineError::NotFound {
                entity: "store",
                id: id.to_string(),
            })?
            .into_store()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base_url: &str) -> HttpBackend {
        HttpBackend::new(
            HttpBackendSettings::new(base_url),
            FixedOffset::east_opt(0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_url_joins_without_double_slashes() {
        let backend = backend("http://localhost:8000/api/");
        assert_eq!(
            backend.url("/attendance/"),
            "http://localhost:8000/api/attendance/"
        );
        assert_eq!(backend.url("stores/"), "http://localhost:8000/api/stores/");
    }

    #[test]
    fn test_settings_defaults() {
        let settings: HttpBackendSettings =
            serde_yaml::from_str("base_url: http://localhost:8000/api").unwrap();
        assert_eq!(settings, HttpBackendSettings::new("http://localhost:8000/api"));
    }
}
