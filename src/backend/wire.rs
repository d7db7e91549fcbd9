//! Wire types of the REST attendance backend.
//!
//! Records arrive loosely typed: ids may be numbers or strings, decimals may
//! be serialized as strings, and most fields can be missing or null. Every
//! raw record goes through [`RawAttendanceRecord::into_record`] before it
//! reaches the state machine.

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::attendance::local_date;
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceEvent, AttendanceRecord, Coordinate, EventType, StoreSite};

/// An identifier serialized either as a number or as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseId {
    /// Numeric primary key.
    Number(i64),
    /// String identifier.
    Text(String),
}

impl std::fmt::Display for LooseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LooseId::Number(n) => write!(f, "{}", n),
            LooseId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A number serialized either natively or as a decimal string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    /// JSON number.
    Number(f64),
    /// Decimal string such as `"14.692800"`.
    Text(String),
}

impl LooseNumber {
    fn to_f64(&self, field: &str) -> EngineResult<f64> {
        match self {
            LooseNumber::Number(n) => Ok(*n),
            LooseNumber::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| EngineError::malformed(field, format!("'{}' is not a number", s))),
        }
    }
}

/// Event type names used by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum WireEventType {
    Arrivee,
    Depart,
    PauseEntree,
    PauseSortie,
}

impl From<EventType> for WireEventType {
    fn from(event: EventType) -> Self {
        match event {
            EventType::Arrival => WireEventType::Arrivee,
            EventType::Departure => WireEventType::Depart,
            EventType::BreakStart => WireEventType::PauseEntree,
            EventType::BreakEnd => WireEventType::PauseSortie,
        }
    }
}

impl From<WireEventType> for EventType {
    fn from(event: WireEventType) -> Self {
        match event {
            WireEventType::Arrivee => EventType::Arrival,
            WireEventType::Depart => EventType::Departure,
            WireEventType::PauseEntree => EventType::BreakStart,
            WireEventType::PauseSortie => EventType::BreakEnd,
        }
    }
}

/// Body of `POST attendance/`.
#[derive(Debug, Clone, Serialize)]
pub struct AttendancePayload {
    user: String,
    magasin: String,
    magasin_nom: String,
    date_pointage: String,
    latitude: f64,
    longitude: f64,
    #[serde(rename = "type")]
    event_type: WireEventType,
}

impl From<&AttendanceEvent> for AttendancePayload {
    fn from(event: &AttendanceEvent) -> Self {
        Self {
            user: event.user_id.clone(),
            magasin: event.store_id.clone(),
            magasin_nom: event.store_name.clone(),
            date_pointage: event.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            latitude: event.coordinate.latitude(),
            longitude: event.coordinate.longitude(),
            event_type: event.event_type.into(),
        }
    }
}

/// An attendance record exactly as the backend serializes it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAttendanceRecord {
    #[serde(default)]
    id: Option<LooseId>,
    #[serde(default)]
    user: Option<LooseId>,
    #[serde(default)]
    user_id: Option<LooseId>,
    #[serde(default)]
    magasin: Option<LooseId>,
    #[serde(default)]
    magasin_id: Option<LooseId>,
    #[serde(default)]
    date_pointage: Option<String>,
    #[serde(default)]
    heure_entree: Option<String>,
    #[serde(default)]
    heure_sortie: Option<String>,
    #[serde(default)]
    pause_entree: Option<String>,
    #[serde(default)]
    pause_sortie: Option<String>,
    #[serde(default)]
    duree_pause: Option<LooseNumber>,
    #[serde(default)]
    latitude: Option<LooseNumber>,
    #[serde(default)]
    longitude: Option<LooseNumber>,
    #[serde(default, rename = "type")]
    event_type: Option<String>,
}

impl RawAttendanceRecord {
    /// The owning user id, as a string, if present.
    pub fn owner(&self) -> Option<String> {
        self.user_id
            .as_ref()
            .or(self.user.as_ref())
            .map(ToString::to_string)
    }

    /// Parses the raw record into a typed record.
    ///
    /// Naive timestamps are interpreted in `local_offset`, which also decides
    /// the record's calendar day.
    pub fn into_record(self, local_offset: FixedOffset) -> EngineResult<AttendanceRecord> {
        let id = required(self.id.as_ref(), "id")?.to_string();
        let user_id = self
            .owner()
            .ok_or_else(|| EngineError::malformed("user_id", "missing"))?;
        let store_id = self
            .magasin_id
            .as_ref()
            .or(self.magasin.as_ref())
            .map(ToString::to_string)
            .ok_or_else(|| EngineError::malformed("magasin_id", "missing"))?;

        let punched_at = parse_timestamp(
            required(self.date_pointage.as_ref(), "date_pointage")?,
            "date_pointage",
            local_offset,
        )?;

        let latitude = required(self.latitude.as_ref(), "latitude")?.to_f64("latitude")?;
        let longitude = required(self.longitude.as_ref(), "longitude")?.to_f64("longitude")?;
        let coordinate = Coordinate::new(latitude, longitude).map_err(|err| {
            EngineError::malformed("latitude/longitude", err.to_string())
        })?;

        let event_type = parse_event_type(required(self.event_type.as_ref(), "type")?)?;

        let optional = |value: &Option<String>, field: &str| {
            value
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(|s| parse_timestamp(s, field, local_offset))
                .transpose()
        };
        let mut arrival_time = optional(&self.heure_entree, "heure_entree")?;
        let mut departure_time = optional(&self.heure_sortie, "heure_sortie")?;
        let mut break_start = optional(&self.pause_entree, "pause_entree")?;
        let mut break_end = optional(&self.pause_sortie, "pause_sortie")?;

        // A per-punch row may only carry its type and date_pointage.
        let implied = match event_type {
            EventType::Arrival => &mut arrival_time,
            EventType::Departure => &mut departure_time,
            EventType::BreakStart => &mut break_start,
            EventType::BreakEnd => &mut break_end,
        };
        if implied.is_none() {
            *implied = Some(punched_at);
        }

        let break_duration_minutes = match &self.duree_pause {
            Some(value) => Some(value.to_f64("duree_pause")?.round() as i64),
            None => match (break_start, break_end) {
                (Some(start), Some(end)) => Some((end - start).num_minutes().max(0)),
                _ => None,
            },
        };

        Ok(AttendanceRecord {
            id,
            user_id,
            store_id,
            date: local_date(punched_at, local_offset),
            arrival_time,
            departure_time,
            break_start,
            break_end,
            break_duration_minutes,
            coordinate,
            event_type,
        })
    }
}

/// A store as the backend serializes it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStore {
    #[serde(default)]
    id: Option<LooseId>,
    #[serde(default, alias = "name")]
    nom: Option<String>,
    #[serde(default)]
    latitude: Option<LooseNumber>,
    #[serde(default)]
    longitude: Option<LooseNumber>,
}

impl RawStore {
    /// The store id, as a string, if present.
    pub fn id(&self) -> Option<String> {
        self.id.as_ref().map(ToString::to_string)
    }

    /// Parses the raw store into a [`StoreSite`].
    pub fn into_store(self) -> EngineResult<StoreSite> {
        let id = required(self.id.as_ref(), "id")?.to_string();
        let latitude = required(self.latitude.as_ref(), "latitude")?.to_f64("latitude")?;
        let longitude = required(self.longitude.as_ref(), "longitude")?.to_f64("longitude")?;
        let coordinate = Coordinate::new(latitude, longitude).map_err(|err| {
            EngineError::malformed("latitude/longitude", err.to_string())
        })?;

        Ok(StoreSite {
            name: self.nom.unwrap_or_else(|| format!("store {}", id)),
            id,
            coordinate,
        })
    }
}

/// A list response, either bare or wrapped in a pagination envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Listing<T> {
    Plain(Vec<T>),
    Paginated { results: Vec<T> },
}

impl<T> Listing<T> {
    pub(crate) fn into_items(self) -> Vec<T> {
        match self {
            Listing::Plain(items) | Listing::Paginated { results: items } => items,
        }
    }
}

fn required<'a, T>(value: Option<&'a T>, field: &str) -> EngineResult<&'a T> {
    value.ok_or_else(|| EngineError::malformed(field, "missing"))
}

fn parse_event_type(value: &str) -> EngineResult<EventType> {
    serde_json::from_value::<WireEventType>(serde_json::Value::String(value.to_string()))
        .map(EventType::from)
        .map_err(|_| EngineError::malformed("type", format!("unknown event type '{}'", value)))
}

fn parse_timestamp(value: &str, field: &str, local_offset: FixedOffset) -> EngineResult<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .and_then(|naive| local_offset.from_local_datetime(&naive).single())
        .map(|at| at.with_timezone(&Utc))
        .ok_or_else(|| EngineError::malformed(field, format!("'{}' is not a timestamp", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn raw(value: serde_json::Value) -> RawAttendanceRecord {
        serde_json::from_value(value).unwrap()
    }

    fn full_record() -> serde_json::Value {
        json!({
            "id": 12,
            "user": 7,
            "user_id": "7",
            "magasin": 3,
            "magasin_id": "3",
            "magasin_nom": "Plateau",
            "date_pointage": "2026-03-02T08:00:00.000Z",
            "heure_entree": "2026-03-02T08:00:00Z",
            "heure_sortie": null,
            "pause_entree": "2026-03-02T12:00:00Z",
            "pause_sortie": "2026-03-02T12:25:00Z",
            "duree_pause": null,
            "latitude": "14.692800",
            "longitude": "-17.446700",
            "type": "pause_sortie"
        })
    }

    #[test]
    fn test_parses_loosely_typed_record() {
        let record = raw(full_record()).into_record(utc()).unwrap();

        assert_eq!(record.id, "12");
        assert_eq!(record.user_id, "7");
        assert_eq!(record.store_id, "3");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert!(record.arrival_time.is_some());
        assert!(record.departure_time.is_none());
        assert_eq!(record.break_duration_minutes, Some(25));
        assert_eq!(record.event_type, EventType::BreakEnd);
        assert_eq!(record.coordinate.latitude(), 14.6928);
    }

    #[test]
    fn test_punch_time_falls_back_to_date_pointage() {
        let mut value = full_record();
        value["type"] = json!("pause_entree");
        value["date_pointage"] = json!("2026-03-02T12:05:00Z");
        value["pause_entree"] = json!(null);
        value["pause_sortie"] = json!(null);
        value["heure_entree"] = json!(null);

        let record = raw(value).into_record(utc()).unwrap();

        assert_eq!(
            record.break_start,
            Some("2026-03-02T12:05:00Z".parse::<DateTime<Utc>>().unwrap())
        );
        assert!(record.arrival_time.is_none());
        assert!(record.break_duration_minutes.is_none());
    }

    #[test]
    fn test_explicit_punch_time_is_kept() {
        let mut value = full_record();
        value["date_pointage"] = json!("2026-03-02T12:30:00Z");

        let record = raw(value).into_record(utc()).unwrap();

        assert_eq!(
            record.break_end,
            Some("2026-03-02T12:25:00Z".parse::<DateTime<Utc>>().unwrap())
        );
    }

    #[test]
    fn test_backend_duration_wins_over_computed() {
        let mut value = full_record();
        value["duree_pause"] = json!(30);
        let record = raw(value).into_record(utc()).unwrap();
        assert_eq!(record.break_duration_minutes, Some(30));
    }

    #[test]
    fn test_missing_id_is_malformed() {
        let mut value = full_record();
        value.as_object_mut().unwrap().remove("id");

        match raw(value).into_record(utc()) {
            Err(EngineError::MalformedRecord { field, .. }) => assert_eq!(field, "id"),
            other => panic!("Expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_coordinate_is_malformed() {
        let mut value = full_record();
        value["latitude"] = json!("north");
        assert!(matches!(
            raw(value).into_record(utc()),
            Err(EngineError::MalformedRecord { .. })
        ));

        let mut value = full_record();
        value["latitude"] = json!(123.0);
        assert!(matches!(
            raw(value).into_record(utc()),
            Err(EngineError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_unknown_event_type_is_malformed() {
        let mut value = full_record();
        value["type"] = json!("lunch");

        match raw(value).into_record(utc()) {
            Err(EngineError::MalformedRecord { field, message }) => {
                assert_eq!(field, "type");
                assert!(message.contains("lunch"));
            }
            other => panic!("Expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_naive_timestamps_use_local_offset() {
        let mut value = full_record();
        value["date_pointage"] = json!("2026-03-02T23:30:00");
        value["heure_entree"] = json!("2026-03-02T23:30:00");

        let minus_two = FixedOffset::west_opt(2 * 3600).unwrap();
        let record = raw(value).into_record(minus_two).unwrap();

        assert_eq!(record.date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert_eq!(
            record.arrival_time.unwrap(),
            "2026-03-03T01:30:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn test_payload_uses_backend_names() {
        let event = AttendanceEvent {
            user_id: "7".to_string(),
            store_id: "3".to_string(),
            store_name: "Plateau".to_string(),
            event_type: EventType::BreakStart,
            timestamp: "2026-03-02T12:00:00Z".parse().unwrap(),
            coordinate: Coordinate::new(14.6928, -17.4467).unwrap(),
        };

        let body = serde_json::to_value(AttendancePayload::from(&event)).unwrap();

        assert_eq!(
            body,
            json!({
                "user": "7",
                "magasin": "3",
                "magasin_nom": "Plateau",
                "date_pointage": "2026-03-02T12:00:00.000Z",
                "latitude": 14.6928,
                "longitude": -17.4467,
                "type": "pause_entree"
            })
        );
    }

    #[test]
    fn test_listing_accepts_both_envelopes() {
        let plain: Listing<RawStore> = serde_json::from_value(json!([{"id": 1}])).unwrap();
        assert_eq!(plain.into_items().len(), 1);

        let paginated: Listing<RawStore> =
            serde_json::from_value(json!({"count": 2, "results": [{"id": 1}, {"id": "2"}]}))
                .unwrap();
        assert_eq!(paginated.into_items().len(), 2);
    }

    #[test]
    fn test_store_parsing() {
        let store: RawStore = serde_json::from_value(json!({
            "id": 3,
            "nom": "Plateau",
            "latitude": 14.6928,
            "longitude": "-17.4467"
        }))
        .unwrap();

        let site = store.into_store().unwrap();
        assert_eq!(site.id, "3");
        assert_eq!(site.name, "Plateau");
        assert_eq!(site.coordinate.longitude(), -17.4467);
    }
}
