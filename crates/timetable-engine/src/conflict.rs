//! Detect schedule conflicts between a candidate event and existing base events.
//!
//! Works on base (unexpanded) records. Time of day is compared first; only when
//! the clock ranges overlap are the dates examined:
//!
//! - one-off vs one-off: same calendar day;
//! - series vs series: active date ranges overlap and the repeat-day sets share
//!   a weekday (exclude dates are not consulted);
//! - one-off vs series: the one-off's day lies inside the series' active range,
//!   falls on one of its repeat days, and is not excluded.
//!
//! Only subjects and exams block time. Tasks never conflict, and an existing
//! event with the candidate's own id is skipped so edits don't collide with
//! themselves. Touching ranges (10:00 end, 10:00 start) are not conflicts.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use tracing::debug;

use crate::event::{CalendarEvent, EventKind};

/// Active-range end for series without `repeat_until`.
fn open_ended_until() -> NaiveDate {
    NaiveDate::from_ymd_opt(2100, 1, 1).unwrap_or(NaiveDate::MAX)
}

fn minute_of_day(at: NaiveDateTime) -> i64 {
    i64::from(at.hour() * 60 + at.minute())
}

/// Whether the clock ranges of two events overlap, ignoring dates.
fn clock_overlaps(a: &CalendarEvent, b: &CalendarEvent) -> bool {
    minute_of_day(a.start) < minute_of_day(b.end) && minute_of_day(a.end) > minute_of_day(b.start)
}

/// Length of the time-of-day overlap of two events, in minutes, ignoring dates.
///
/// For reporting only; never negative, and 0 when the clock ranges do not overlap.
pub fn overlap_minutes(a: &CalendarEvent, b: &CalendarEvent) -> i64 {
    if !clock_overlaps(a, b) {
        return 0;
    }
    let overlap_start = minute_of_day(a.start).max(minute_of_day(b.start));
    let overlap_end = minute_of_day(a.end).min(minute_of_day(b.end));
    (overlap_end - overlap_start).max(0)
}

/// First and last day a series is active, inclusive.
fn active_range(event: &CalendarEvent) -> (NaiveDate, NaiveDate) {
    let until = event
        .repeat_until
        .map_or_else(open_ended_until, |until| until.date());
    (event.start.date(), until)
}

fn series_overlap(a: &CalendarEvent, b: &CalendarEvent) -> bool {
    let (a_from, a_until) = active_range(a);
    let (b_from, b_until) = active_range(b);
    let dates_overlap = a_from <= b_until && a_until >= b_from;
    dates_overlap && a.repeat_days.iter().any(|day| b.repeats_on(*day))
}

fn single_meets_series(single: &CalendarEvent, series: &CalendarEvent) -> bool {
    let day = single.start.date();
    let (from, until) = active_range(series);
    from <= day && day <= until && series.repeats_on(day.weekday()) && !series.is_excluded_on(day)
}

fn conflicts_with(candidate: &CalendarEvent, existing: &CalendarEvent) -> bool {
    if !clock_overlaps(candidate, existing) {
        return false;
    }
    match (candidate.repeats(), existing.repeats()) {
        (false, false) => candidate.start.date() == existing.start.date(),
        (true, true) => series_overlap(candidate, existing),
        (true, false) => single_meets_series(existing, candidate),
        (false, true) => single_meets_series(candidate, existing),
    }
}

fn blocks_time(event: &CalendarEvent) -> bool {
    matches!(event.kind, EventKind::Subject | EventKind::Exam)
}

/// Every existing event the candidate collides with, in input order.
pub fn list_conflicts<'a>(
    candidate: &CalendarEvent,
    existing: &'a [CalendarEvent],
) -> Vec<&'a CalendarEvent> {
    let conflicts: Vec<&CalendarEvent> = existing
        .iter()
        .filter(|e| e.id != candidate.id && blocks_time(e))
        .filter(|e| conflicts_with(candidate, e))
        .collect();

    debug!(
        candidate = %candidate.id,
        checked = existing.len(),
        conflicts = conflicts.len(),
        "conflict check"
    );
    conflicts
}

/// Whether the candidate collides with any existing event.
pub fn has_conflict(candidate: &CalendarEvent, existing: &[CalendarEvent]) -> bool {
    !list_conflicts(candidate, existing).is_empty()
}
