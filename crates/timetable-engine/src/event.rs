//! The strict calendar event model shared by every engine in this crate.
//!
//! A [`CalendarEvent`] is either a one-off entry (an exam, a task, a single class
//! meeting) or the template of a recurring class series. Instances produced by
//! the expander are shallow copies of the template carrying a derived id of the
//! form `{base_id}_{epoch_millis}`, which [`split_instance_id`] reverses.

use chrono::{Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// What a calendar entry represents. Only subjects (classes) may recur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Subject,
    Exam,
    Task,
}

/// How a subject repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatPattern {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

/// A base calendar record, or an expanded instance of one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub kind: EventKind,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Display colour, carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub repeat_pattern: RepeatPattern,
    /// Weekdays a weekly series meets on. Serialized as 0 (Sunday) .. 6 (Saturday).
    #[serde(default, with = "weekdays")]
    pub repeat_days: Vec<Weekday>,
    /// Last day of the series, inclusive. `None` means the series never ends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_until: Option<NaiveDateTime>,
    /// Days on which a recurring series does not meet. Only the date part matters.
    #[serde(default)]
    pub exclude_dates: Vec<NaiveDateTime>,
}

impl CalendarEvent {
    /// Create a non-recurring event.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        kind: EventKind,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            start,
            end,
            color: None,
            repeat_pattern: RepeatPattern::None,
            repeat_days: Vec::new(),
            repeat_until: None,
            exclude_dates: Vec::new(),
        }
    }

    /// Repeat weekly on the given days.
    pub fn weekly(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.repeat_pattern = RepeatPattern::Weekly;
        self.repeat_days = days.into_iter().collect();
        self
    }

    pub fn daily(mut self) -> Self {
        self.repeat_pattern = RepeatPattern::Daily;
        self
    }

    pub fn monthly(mut self) -> Self {
        self.repeat_pattern = RepeatPattern::Monthly;
        self
    }

    pub fn until(mut self, until: NaiveDateTime) -> Self {
        self.repeat_until = Some(until);
        self
    }

    pub fn excluding(mut self, dates: impl IntoIterator<Item = NaiveDateTime>) -> Self {
        self.exclude_dates.extend(dates);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Whether the expander generates instances for this event.
    ///
    /// Only subjects recur; an exam or task carrying a repeat pattern is shown once.
    pub fn is_recurring(&self) -> bool {
        self.kind == EventKind::Subject && self.repeat_pattern != RepeatPattern::None
    }

    /// Whether the event carries any repeat pattern, regardless of kind.
    ///
    /// This is the recurrence test used by conflict detection.
    pub fn repeats(&self) -> bool {
        self.repeat_pattern != RepeatPattern::None
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// True if `date` matches one of the exclude dates at day granularity.
    pub fn is_excluded_on(&self, date: NaiveDate) -> bool {
        self.exclude_dates.iter().any(|d| d.date() == date)
    }

    pub fn repeats_on(&self, day: Weekday) -> bool {
        self.repeat_days.contains(&day)
    }

    /// Build an instance of this event starting at `start`, keeping the duration.
    pub fn instance_at(&self, start: NaiveDateTime) -> CalendarEvent {
        CalendarEvent {
            id: instance_id(&self.id, start),
            start,
            end: start + self.duration(),
            ..self.clone()
        }
    }
}

/// Milliseconds since the Unix epoch, reading the wall-clock value as UTC.
pub fn epoch_millis(at: NaiveDateTime) -> i64 {
    at.and_utc().timestamp_millis()
}

/// Derive the id of the instance of `base_id` that starts at `start`.
pub fn instance_id(base_id: &str, start: NaiveDateTime) -> String {
    format!("{}_{}", base_id, epoch_millis(start))
}

/// Split an instance id into its base id and start time in epoch milliseconds.
///
/// Returns `None` for ids without an underscore-delimited numeric suffix, i.e.
/// for base ids.
pub fn split_instance_id(id: &str) -> Option<(&str, i64)> {
    let (base, suffix) = id.rsplit_once('_')?;
    let numeric = suffix.bytes().all(|b| b.is_ascii_digit() || b == b'-');
    if base.is_empty() || suffix.is_empty() || !numeric {
        return None;
    }
    let millis = suffix.parse().ok()?;
    Some((base, millis))
}

/// Map an instance id back to its base id. Base ids are returned unchanged.
pub fn base_id_of(id: &str) -> &str {
    split_instance_id(id).map_or(id, |(base, _)| base)
}

/// Find the base record an instance was generated from.
pub fn find_base<'a>(events: &'a [CalendarEvent], id: &str) -> Option<&'a CalendarEvent> {
    events
        .iter()
        .find(|e| e.id == id)
        .or_else(|| events.iter().find(|e| e.id == base_id_of(id)))
}

/// Convert a 0 (Sunday) .. 6 (Saturday) index into a [`Weekday`].
pub fn weekday_from_index(index: i64) -> Result<Weekday> {
    match index {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(ScheduleError::InvalidWeekday(other)),
    }
}

pub fn weekday_index(day: Weekday) -> u8 {
    day.num_days_from_sunday() as u8
}

/// Serde adapter storing weekday lists as Sunday-based integers.
pub(crate) mod weekdays {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(days: &[Weekday], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(days.iter().map(|d| super::weekday_index(*d)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Weekday>, D::Error> {
        let raw = Option::<Vec<i64>>::deserialize(deserializer)?.unwrap_or_default();
        raw.into_iter()
            .map(|i| super::weekday_from_index(i).map_err(serde::de::Error::custom))
            .collect()
    }
}
