//! Search for weekly meeting slots that avoid everyone's busy time.
//!
//! Busy events are expanded over the seven days starting today, then sorted and
//! merged into non-overlapping busy periods. Each k-subset of the candidate
//! weekdays is tried at every step of the preferred time range; a pairing is
//! suggested only when every chosen day, projected onto its next occurrence in
//! the week, is free for the whole session.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScheduleError};
use crate::event::{weekdays, CalendarEvent};
use crate::expander::expand_in_window;
use crate::window::ViewWindow;

pub const DEFAULT_STEP_MINUTES: u32 = 30;
pub const DEFAULT_MAX_SUGGESTIONS: usize = 5;

/// Part of the day a new meeting should fall in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePreference {
    #[default]
    Any,
    Morning,
    Afternoon,
}

impl TimePreference {
    /// Searchable range as `(first_hour, last_hour)`; sessions must end by `last_hour`.
    pub fn hours(self) -> (u32, u32) {
        match self {
            TimePreference::Any => (7, 20),
            TimePreference::Morning => (7, 12),
            TimePreference::Afternoon => (13, 20),
        }
    }
}

impl FromStr for TimePreference {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(TimePreference::Any),
            "morning" => Ok(TimePreference::Morning),
            "afternoon" => Ok(TimePreference::Afternoon),
            _ => Err(ScheduleError::UnknownTimePreference(s.to_string())),
        }
    }
}

impl fmt::Display for TimePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimePreference::Any => "any",
            TimePreference::Morning => "morning",
            TimePreference::Afternoon => "afternoon",
        })
    }
}

/// An event occupying someone's time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusyEvent {
    pub event: CalendarEvent,
    pub is_instructor: bool,
    pub student_id: Option<String>,
}

impl From<CalendarEvent> for BusyEvent {
    fn from(event: CalendarEvent) -> Self {
        Self {
            event,
            is_instructor: false,
            student_id: None,
        }
    }
}

/// Parameters of a slot search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSearch {
    pub duration_minutes: u32,
    #[serde(with = "weekdays")]
    pub candidate_days: Vec<Weekday>,
    pub sessions_per_week: usize,
    #[serde(default)]
    pub time_preference: TimePreference,
    #[serde(default = "default_step_minutes")]
    pub step_minutes: u32,
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

fn default_step_minutes() -> u32 {
    DEFAULT_STEP_MINUTES
}

fn default_max_suggestions() -> usize {
    DEFAULT_MAX_SUGGESTIONS
}

impl SlotSearch {
    pub fn new(
        duration_minutes: u32,
        candidate_days: Vec<Weekday>,
        sessions_per_week: usize,
        time_preference: TimePreference,
    ) -> Self {
        Self {
            duration_minutes,
            candidate_days,
            sessions_per_week,
            time_preference,
            step_minutes: DEFAULT_STEP_MINUTES,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
        }
    }
}

/// A proposed set of meeting days at a common time.
///
/// `busy_count` and `busy_student_names` are left for the caller to fill in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    #[serde(with = "weekdays")]
    pub days: Vec<Weekday>,
    pub start_time: String,
    pub end_time: String,
    pub busy_count: usize,
    pub busy_student_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u32>,
}

/// All `k`-element subsets of `items`, each in input order, in lexicographic order.
///
/// Yields nothing when `k` is zero or larger than `items`.
pub fn combinations<T: Clone>(items: &[T], k: usize) -> Vec<Vec<T>> {
    let mut out = Vec::new();
    if k == 0 || k > items.len() {
        return out;
    }
    let mut current = Vec::with_capacity(k);
    collect_combinations(items, k, 0, &mut current, &mut out);
    out
}

fn collect_combinations<T: Clone>(
    items: &[T],
    k: usize,
    from: usize,
    current: &mut Vec<T>,
    out: &mut Vec<Vec<T>>,
) {
    if current.len() == k {
        out.push(current.clone());
        return;
    }
    let needed = k - current.len();
    for i in from..=items.len() - needed {
        current.push(items[i].clone());
        collect_combinations(items, k, i + 1, current, out);
        current.pop();
    }
}

/// Busy periods over the seven days starting `today`, merged and sorted.
///
/// Instances are clipped to the week; intervals that overlap or touch are
/// fused, and zero-length events block nothing.
pub fn busy_periods(busy: &[BusyEvent], today: NaiveDate) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    let window = ViewWindow::rolling_week(today);
    let events: Vec<CalendarEvent> = busy.iter().map(|b| b.event.clone()).collect();

    // Expansion output is sorted by start, and clipping keeps that order.
    expand_in_window(&events, &window)
        .iter()
        .filter(|instance| instance.start < instance.end)
        .map(|instance| (instance.start.max(window.start), instance.end.min(window.end)))
        .fold(Vec::<(NaiveDateTime, NaiveDateTime)>::new(), |mut periods, (start, end)| {
            match periods.last_mut() {
                Some((_, last_end)) if start <= *last_end => *last_end = (*last_end).max(end),
                _ => periods.push((start, end)),
            }
            periods
        })
}

/// The first date on or after `today` that falls on `day`.
pub fn next_occurrence(today: NaiveDate, day: Weekday) -> NaiveDate {
    let ahead = (7 + day.num_days_from_sunday() - today.weekday().num_days_from_sunday()) % 7;
    today + Duration::days(i64::from(ahead))
}

fn is_free(
    periods: &[(NaiveDateTime, NaiveDateTime)],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> bool {
    !periods
        .iter()
        .any(|&(busy_start, busy_end)| start < busy_end && end > busy_start)
}

/// Propose up to `search.max_suggestions` day/time pairings free of all busy events.
///
/// Earlier times come first; within one time, day sets follow the order of
/// [`combinations`] over `search.candidate_days`.
pub fn find_slots(busy: &[BusyEvent], search: &SlotSearch, today: NaiveDate) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();
    if search.duration_minutes == 0
        || search.sessions_per_week == 0
        || search.max_suggestions == 0
    {
        return suggestions;
    }

    let periods = busy_periods(busy, today);
    let day_sets = combinations(&search.candidate_days, search.sessions_per_week);
    let (first_hour, last_hour) = search.time_preference.hours();
    let range_end = last_hour * 60;
    let step = search.step_minutes.max(1);
    let duration = Duration::minutes(i64::from(search.duration_minutes));

    // Offsets are minutes past midnight; an overflowing step ends the scan.
    let fits = |offset: u32| {
        offset
            .checked_add(search.duration_minutes)
            .is_some_and(|end| end <= range_end)
    };
    let mut next = Some(first_hour * 60);
    'times: while let Some(offset) = next.filter(|&offset| fits(offset)) {
        let start_time = NaiveTime::MIN + Duration::minutes(i64::from(offset));
        let end_time = start_time + duration;

        for days in &day_sets {
            let free = days.iter().all(|day| {
                let start = next_occurrence(today, *day).and_time(start_time);
                is_free(&periods, start, start + duration)
            });
            if !free {
                continue;
            }
            suggestions.push(Suggestion {
                days: days.clone(),
                start_time: start_time.format("%H:%M").to_string(),
                end_time: end_time.format("%H:%M").to_string(),
                busy_count: 0,
                busy_student_names: Vec::new(),
                total_duration: search.duration_minutes.checked_mul(days.len() as u32),
            });
            if suggestions.len() >= search.max_suggestions {
                break 'times;
            }
        }
        next = offset.checked_add(step);
    }

    debug!(
        busy_periods = periods.len(),
        day_sets = day_sets.len(),
        suggestions = suggestions.len(),
        preference = %search.time_preference,
        "slot search finished"
    );
    suggestions
}
