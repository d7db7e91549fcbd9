//! Day records.
//!
//! Punches are append-only events. A user's record for a day is obtained by
//! folding that day's events in order, where the day is the punch's calendar
//! date in the configured local zone.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::error::EngineResult;
use crate::models::{AttendanceEvent, AttendanceRecord, EventType};

use super::apply_event;

/// The local calendar date of an instant.
///
/// # Example
///
/// ```
/// use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
/// use pointage_engine::attendance::local_date;
///
/// let late_evening: DateTime<Utc> = "2026-03-02T23:30:00Z".parse().unwrap();
/// let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
///
/// assert_eq!(local_date(late_evening, plus_two), NaiveDate::from_ymd_opt(2026, 3, 3).unwrap());
/// ```
pub fn local_date(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}

/// Identifier of a user's record for a given day.
pub fn day_record_id(user_id: &str, date: NaiveDate) -> String {
    format!("{}-{}", user_id, date)
}

/// Folds events, given in chronological order, into day records.
///
/// Records are grouped per user and local day and returned most recent day
/// first. An event violating its day's state machine fails the fold.
pub fn fold_events<'a, I>(events: I, offset: FixedOffset) -> EngineResult<Vec<AttendanceRecord>>
where
    I: IntoIterator<Item = &'a AttendanceEvent>,
{
    let mut days: BTreeMap<(NaiveDate, String), AttendanceRecord> = BTreeMap::new();

    for event in events {
        let date = local_date(event.timestamp, offset);
        let record = days
            .entry((date, event.user_id.clone()))
            .or_insert_with(|| {
                AttendanceRecord::open(day_record_id(&event.user_id, date), date, event)
            });
        apply_event(record, event)?;
    }

    Ok(days.into_values().rev().collect())
}

/// Merges records that describe the same user and day.
///
/// Some backends keep one row per punch, so a day arrives as several partial
/// records. Rows are ordered by their own punch time; punch fields are taken
/// from whichever row carries them, the latest row decides the coordinate and
/// event type, and the earliest row keeps its id. Records are returned most
/// recent day first.
pub fn merge_records(records: Vec<AttendanceRecord>) -> Vec<AttendanceRecord> {
    let mut days: BTreeMap<(NaiveDate, String), Vec<AttendanceRecord>> = BTreeMap::new();
    for record in records {
        days.entry((record.date, record.user_id.clone()))
            .or_default()
            .push(record);
    }

    let mut merged: Vec<AttendanceRecord> = days.into_values().filter_map(merge_day).collect();
    merged.sort_by(|a, b| b.date.cmp(&a.date));
    merged
}

fn merge_day(mut rows: Vec<AttendanceRecord>) -> Option<AttendanceRecord> {
    rows.sort_by_key(last_punch);

    let mut rows = rows.into_iter();
    let mut merged = rows.next()?;
    for row in rows {
        merged.arrival_time = merged.arrival_time.or(row.arrival_time);
        merged.departure_time = merged.departure_time.or(row.departure_time);
        merged.break_start = merged.break_start.or(row.break_start);
        merged.break_end = merged.break_end.or(row.break_end);
        merged.break_duration_minutes = merged
            .break_duration_minutes
            .or(row.break_duration_minutes);
        merged.store_id = row.store_id;
        merged.coordinate = row.coordinate;
        merged.event_type = row.event_type;
    }

    if merged.break_duration_minutes.is_none() {
        if let (Some(start), Some(end)) = (merged.break_start, merged.break_end) {
            merged.break_duration_minutes = Some((end - start).num_minutes().max(0));
        }
    }

    Some(merged)
}

/// The time of the punch a record was last updated by.
fn last_punch(record: &AttendanceRecord) -> Option<DateTime<Utc>> {
    match record.event_type {
        EventType::Arrival => record.arrival_time,
        EventType::Departure => record.departure_time,
        EventType::BreakStart => record.break_start,
        EventType::BreakEnd => record.break_end,
    }
}

/// Picks the record dated `today`, if any.
pub fn find_today(records: &[AttendanceRecord], today: NaiveDate) -> Option<&AttendanceRecord> {
    records.iter().find(|record| record.date == today)
}
