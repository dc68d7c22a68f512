//! Visible calendar windows (day, week, month, agenda).

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// Number of days after the reference day covered by the agenda view.
pub const AGENDA_DAYS: i64 = 30;

/// Calendar view granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Day,
    #[default]
    Week,
    Month,
    Agenda,
}

impl FromStr for ViewKind {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(ViewKind::Day),
            "week" => Ok(ViewKind::Week),
            "month" => Ok(ViewKind::Month),
            "agenda" => Ok(ViewKind::Agenda),
            _ => Err(ScheduleError::UnknownView(s.to_string())),
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViewKind::Day => "day",
            ViewKind::Week => "week",
            ViewKind::Month => "month",
            ViewKind::Agenda => "agenda",
        };
        f.write_str(name)
    }
}

/// An inclusive `[start, end]` range of wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// The last millisecond of `date`.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    start_of_day(date) + Duration::days(1) - Duration::milliseconds(1)
}

impl ViewWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Whole days `first..=last`.
    pub fn from_dates(first: NaiveDate, last: NaiveDate) -> Self {
        Self::new(start_of_day(first), end_of_day(last))
    }

    /// The window a calendar shows for `view` around `reference`.
    ///
    /// Weeks start on Monday. The agenda covers the reference day and the
    /// following [`AGENDA_DAYS`] days.
    pub fn for_view(reference: NaiveDateTime, view: ViewKind) -> Self {
        let day = reference.date();
        match view {
            ViewKind::Day => Self::from_dates(day, day),
            ViewKind::Week => {
                let monday = day - Duration::days(i64::from(day.weekday().num_days_from_monday()));
                Self::from_dates(monday, monday + Duration::days(6))
            }
            ViewKind::Month => {
                let first = day - Duration::days(i64::from(day.day0()));
                let last = first
                    .checked_add_months(Months::new(1))
                    .map_or(NaiveDate::MAX, |next| next - Duration::days(1));
                Self::from_dates(first, last)
            }
            ViewKind::Agenda => Self::from_dates(day, day + Duration::days(AGENDA_DAYS)),
        }
    }

    /// Seven whole days starting on `today`.
    pub fn rolling_week(today: NaiveDate) -> Self {
        Self::from_dates(today, today + Duration::days(6))
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at <= self.end
    }

    /// Calendar dates touched by the window, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.end.date();
        self.start.date().iter_days().take_while(move |d| *d <= last)
    }
}
