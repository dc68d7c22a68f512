//! Boundary between loosely typed persistence rows and the strict event model.
//!
//! Rows arrive as JSON with string timestamps, nullable columns and either
//! snake_case or camelCase keys. [`EventRecord`] accepts that shape and
//! `TryFrom<EventRecord> for CalendarEvent` turns it into the strict type the
//! engines consume. Type errors (unknown kinds, unparseable dates, weekday
//! indices out of range) are rejected here; semantically odd but well-typed
//! events, like a weekly class with no days, pass through untouched.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use crate::error::{Result, ScheduleError};
use crate::event::{weekday_from_index, CalendarEvent, EventKind, RepeatPattern};
use crate::slots::BusyEvent;

/// A calendar row as stored by the persistence layer.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(alias = "type")]
    pub kind: String,
    #[serde(alias = "start_time", alias = "startTime")]
    pub start: String,
    #[serde(alias = "end_time", alias = "endTime")]
    pub end: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, alias = "repeatPattern")]
    pub repeat_pattern: Option<String>,
    #[serde(default, alias = "repeatDays")]
    pub repeat_days: Option<Vec<i64>>,
    #[serde(default, alias = "repeatUntil")]
    pub repeat_until: Option<String>,
    #[serde(default, alias = "excludeDates")]
    pub exclude_dates: Option<Vec<String>>,
}

/// Owner columns of a busy row, read alongside its [`EventRecord`].
#[derive(Debug, Clone, Default, Deserialize)]
struct BusyOwner {
    #[serde(default, alias = "isInstructor")]
    is_instructor: bool,
    #[serde(default, alias = "studentId")]
    student_id: Option<String>,
}

impl FromStr for EventKind {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "subject" => Ok(EventKind::Subject),
            "exam" => Ok(EventKind::Exam),
            "task" => Ok(EventKind::Task),
            _ => Err(ScheduleError::UnknownKind(s.to_string())),
        }
    }
}

impl FromStr for RepeatPattern {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(RepeatPattern::None),
            "daily" => Ok(RepeatPattern::Daily),
            "weekly" => Ok(RepeatPattern::Weekly),
            "monthly" => Ok(RepeatPattern::Monthly),
            _ => Err(ScheduleError::UnknownRepeatPattern(s.to_string())),
        }
    }
}

/// Parse a timestamp into local wall-clock time.
///
/// Accepts RFC 3339 (the offset is dropped, the local part kept),
/// `YYYY-MM-DDTHH:MM[:SS[.fff]]`, the same with a space separator, and a bare
/// `YYYY-MM-DD` which is read as midnight.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| ScheduleError::InvalidDateTime(s.to_string()))
}

impl TryFrom<EventRecord> for CalendarEvent {
    type Error = ScheduleError;

    fn try_from(record: EventRecord) -> Result<Self> {
        let repeat_pattern = match record.repeat_pattern.as_deref() {
            Some(p) => p.parse()?,
            None => RepeatPattern::None,
        };
        let repeat_days = record
            .repeat_days
            .unwrap_or_default()
            .into_iter()
            .map(weekday_from_index)
            .collect::<Result<Vec<_>>>()?;
        let repeat_until = record
            .repeat_until
            .as_deref()
            .map(parse_datetime)
            .transpose()?;
        let exclude_dates = record
            .exclude_dates
            .unwrap_or_default()
            .iter()
            .map(|d| parse_datetime(d))
            .collect::<Result<Vec<_>>>()?;

        Ok(CalendarEvent {
            kind: record.kind.parse()?,
            start: parse_datetime(&record.start)?,
            end: parse_datetime(&record.end)?,
            id: record.id,
            title: record.title,
            color: record.color,
            repeat_pattern,
            repeat_days,
            repeat_until,
            exclude_dates,
        })
    }
}

/// Parse a JSON array of rows into strict events.
pub fn parse_records(json: &str) -> Result<Vec<CalendarEvent>> {
    let records: Vec<EventRecord> = serde_json::from_str(json)?;
    records.into_iter().map(CalendarEvent::try_from).collect()
}

/// Parse a single JSON row into a strict event.
pub fn parse_record(json: &str) -> Result<CalendarEvent> {
    let record: EventRecord = serde_json::from_str(json)?;
    record.try_into()
}

/// Parse a JSON array of busy rows for slot search.
///
/// Each row is an event row plus optional `is_instructor` / `student_id` columns.
pub fn parse_busy_records(json: &str) -> Result<Vec<BusyEvent>> {
    let rows: Vec<serde_json::Value> = serde_json::from_str(json)?;
    rows.iter()
        .map(|row| -> Result<BusyEvent> {
            let record = EventRecord::deserialize(row)?;
            let owner = BusyOwner::deserialize(row)?;
            Ok(BusyEvent {
                event: record.try_into()?,
                is_instructor: owner.is_instructor,
                student_id: owner.student_id,
            })
        })
        .collect()
}
