//! Recurrence expansion -- turns base events into the concrete instances shown
//! in a calendar window.
//!
//! One-off events (and anything that is not a recurring subject) are returned
//! as-is when they touch the window. Recurring subjects are expanded daily,
//! weekly on their repeat days, or monthly on the day-of-month of their first
//! meeting, bounded by `repeat_until` (inclusive, by day) and skipping exclude
//! dates. Every instance keeps the base duration and gets a derived id, see
//! [`crate::event::instance_id`].

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use tracing::{debug, trace};

use crate::event::{CalendarEvent, RepeatPattern};
use crate::window::{end_of_day, ViewKind, ViewWindow};

/// Upper bounds on the daily and monthly walks.
///
/// These guard against runaway loops; they are not scheduling rules. The
/// defaults cover one year of days and one year of months counted from the
/// first meeting of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionLimits {
    pub daily_steps: u32,
    pub monthly_steps: u32,
}

impl Default for ExpansionLimits {
    fn default() -> Self {
        Self {
            daily_steps: 365,
            monthly_steps: 12,
        }
    }
}

/// Expand `events` for the calendar `view` around `reference`.
///
/// The result is sorted by start time.
pub fn expand(
    events: &[CalendarEvent],
    reference: NaiveDateTime,
    view: ViewKind,
) -> Vec<CalendarEvent> {
    expand_in_window(events, &ViewWindow::for_view(reference, view))
}

/// Expand `events` for an explicit window with the default limits.
pub fn expand_in_window(events: &[CalendarEvent], window: &ViewWindow) -> Vec<CalendarEvent> {
    expand_with_limits(events, window, ExpansionLimits::default())
}

/// Expand `events` for an explicit window.
pub fn expand_with_limits(
    events: &[CalendarEvent],
    window: &ViewWindow,
    limits: ExpansionLimits,
) -> Vec<CalendarEvent> {
    let mut instances = Vec::new();

    for event in events {
        if !event.is_recurring() {
            // No clipping: an event is shown when either endpoint is visible.
            if window.contains(event.start) || window.contains(event.end) {
                instances.push(event.clone());
            }
            continue;
        }

        let before = instances.len();
        let end = recurrence_end(event, window);
        match event.repeat_pattern {
            RepeatPattern::Weekly => expand_weekly(event, window, end, &mut instances),
            RepeatPattern::Daily => expand_daily(event, window, end, limits, &mut instances),
            RepeatPattern::Monthly => expand_monthly(event, window, end, limits, &mut instances),
            RepeatPattern::None => {}
        }
        trace!(
            id = %event.id,
            pattern = ?event.repeat_pattern,
            generated = instances.len() - before,
            "expanded series"
        );
    }

    instances.sort_by_key(|e| e.start);

    debug!(
        base_events = events.len(),
        instances = instances.len(),
        window_start = %window.start,
        window_end = %window.end,
        "expanded calendar window"
    );
    instances
}

/// Group instances by the calendar date they start on, for agenda rendering.
pub fn group_by_day(instances: &[CalendarEvent]) -> BTreeMap<NaiveDate, Vec<CalendarEvent>> {
    let mut days: BTreeMap<NaiveDate, Vec<CalendarEvent>> = BTreeMap::new();
    for instance in instances {
        days.entry(instance.start.date())
            .or_default()
            .push(instance.clone());
    }
    days
}

/// The later bound of a series within `window`: the end of its `repeat_until`
/// day, or the window end, whichever comes first.
fn recurrence_end(event: &CalendarEvent, window: &ViewWindow) -> NaiveDateTime {
    match event.repeat_until {
        Some(until) => end_of_day(until.date()).min(window.end),
        None => window.end,
    }
}

fn expand_weekly(
    event: &CalendarEvent,
    window: &ViewWindow,
    end: NaiveDateTime,
    out: &mut Vec<CalendarEvent>,
) {
    if event.repeat_days.is_empty() {
        return;
    }

    let time = event.start.time();
    let last_day = event.repeat_until.map(|until| until.date());

    for day in ViewWindow::new(window.start, end).days() {
        if !event.repeats_on(day.weekday()) {
            continue;
        }
        let start = day.and_time(time);
        if start < event.start || last_day.is_some_and(|last| day > last) {
            continue;
        }
        if event.is_excluded_on(day) {
            continue;
        }
        out.push(event.instance_at(start));
    }
}

fn expand_daily(
    event: &CalendarEvent,
    window: &ViewWindow,
    end: NaiveDateTime,
    limits: ExpansionLimits,
    out: &mut Vec<CalendarEvent>,
) {
    for step in 0..limits.daily_steps {
        let start = event.start + Duration::days(i64::from(step));
        if start > end {
            break;
        }
        if start >= window.start && !event.is_excluded_on(start.date()) {
            out.push(event.instance_at(start));
        }
    }
}

fn expand_monthly(
    event: &CalendarEvent,
    window: &ViewWindow,
    end: NaiveDateTime,
    limits: ExpansionLimits,
    out: &mut Vec<CalendarEvent>,
) {
    for step in 0..limits.monthly_steps {
        // Offsets are taken from the first meeting so a 31st clamps per month
        // without drifting.
        let Some(start) = event.start.checked_add_months(Months::new(step)) else {
            break;
        };
        if start > end {
            break;
        }
        if start >= window.start && !event.is_excluded_on(start.date()) {
            out.push(event.instance_at(start));
        }
    }
}
