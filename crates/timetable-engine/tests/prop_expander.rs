//! Property-based tests for expansion and conflict detection using proptest.
//!
//! These check invariants that must hold for *any* base event and window, not
//! just the worked examples in `expander_tests.rs`.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use proptest::prelude::*;
use timetable_engine::event::{epoch_millis, split_instance_id};
use timetable_engine::{
    expand, has_conflict, CalendarEvent, EventKind, RepeatPattern, ViewKind, ViewWindow,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// A local date-time in 2024-2025, days capped at 28.
fn arb_datetime() -> impl Strategy<Value = NaiveDateTime> {
    let minutes = prop_oneof![Just(0u32), Just(15), Just(30), Just(45)];
    (2024i32..=2025, 1u32..=12, 1u32..=28, 6u32..=20, minutes)
        .prop_map(|(y, m, d, h, min)| {
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, 0)
                .unwrap()
        })
}

fn arb_weekday() -> impl Strategy<Value = Weekday> {
    (0u32..7).prop_map(|i| Weekday::try_from(i as u8).unwrap())
}

fn arb_pattern() -> impl Strategy<Value = RepeatPattern> {
    prop_oneof![
        Just(RepeatPattern::None),
        Just(RepeatPattern::Daily),
        Just(RepeatPattern::Weekly),
        Just(RepeatPattern::Monthly),
    ]
}

fn arb_kind() -> impl Strategy<Value = EventKind> {
    prop_oneof![
        3 => Just(EventKind::Subject),
        1 => Just(EventKind::Exam),
        1 => Just(EventKind::Task),
    ]
}

fn arb_view() -> impl Strategy<Value = ViewKind> {
    prop_oneof![
        Just(ViewKind::Day),
        Just(ViewKind::Week),
        Just(ViewKind::Month),
        Just(ViewKind::Agenda),
    ]
}

prop_compose! {
    fn arb_event(id: &'static str)(
        kind in arb_kind(),
        start in arb_datetime(),
        minutes in 15i64..=180,
        pattern in arb_pattern(),
        days in prop::collection::vec(arb_weekday(), 0..4),
        until_days in prop::option::of(0i64..=200),
        excluded in prop::collection::vec(0i64..=120, 0..4),
    ) -> CalendarEvent {
        let mut event = CalendarEvent::new(id, id, kind, start, start + Duration::minutes(minutes));
        event.repeat_pattern = pattern;
        event.repeat_days = days;
        event.repeat_until = until_days.map(|d| start + Duration::days(d));
        event.exclude_dates = excluded.into_iter().map(|d| start + Duration::days(d)).collect();
        event
    }
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Property 1: Output is sorted by start
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn expansion_is_sorted(
        a in arb_event("a"),
        b in arb_event("b"),
        reference in arb_datetime(),
        view in arb_view(),
    ) {
        let result = expand(&[a, b], reference, view);
        for pair in result.windows(2) {
            prop_assert!(
                pair[0].start <= pair[1].start,
                "{:?} > {:?}",
                pair[0].start,
                pair[1].start
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Property 2: Every instance keeps the base duration exactly
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn duration_preserved(
        base in arb_event("c1"),
        reference in arb_datetime(),
        view in arb_view(),
    ) {
        let expected = base.duration();
        for instance in expand(&[base], reference, view) {
            prop_assert_eq!(instance.end - instance.start, expected);
        }
    }
}

// ---------------------------------------------------------------------------
// Property 3: Generated ids split back into base id and start millis;
//   one-off events are returned verbatim and touch the window
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn instance_ids_and_window_containment(
        base in arb_event("c1"),
        reference in arb_datetime(),
        view in arb_view(),
    ) {
        let window = ViewWindow::for_view(reference, view);
        for instance in expand(&[base.clone()], reference, view) {
            if base.is_recurring() {
                let (base_id, millis) = split_instance_id(&instance.id)
                    .expect("generated instance must carry a numeric suffix");
                prop_assert_eq!(base_id, "c1");
                prop_assert_eq!(millis, epoch_millis(instance.start));
            } else {
                prop_assert_eq!(&instance, &base);
                prop_assert!(instance.start <= window.end && instance.end >= window.start);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property 4: Recurring instances respect first meeting, until, exclusions
//   and (for weekly series) the repeat days
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn recurring_instances_respect_bounds(
        base in arb_event("c1"),
        reference in arb_datetime(),
        view in arb_view(),
    ) {
        prop_assume!(base.is_recurring());
        for instance in expand(&[base.clone()], reference, view) {
            let day = instance.start.date();
            prop_assert!(instance.start >= base.start);
            prop_assert_eq!(instance.start.time(), base.start.time());
            prop_assert!(!base.is_excluded_on(day));
            if let Some(until) = base.repeat_until {
                prop_assert!(day <= until.date());
            }
            if base.repeat_pattern == RepeatPattern::Weekly {
                prop_assert!(base.repeat_days.contains(&day.weekday()));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property 5: Clock ranges that do not overlap never conflict
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn disjoint_clock_ranges_never_conflict(
        existing in arb_event("existing"),
        candidate in arb_event("candidate"),
    ) {
        let minutes = |at: NaiveDateTime| {
            at.time().signed_duration_since(chrono::NaiveTime::MIN).num_minutes()
        };
        let (a0, a1) = (minutes(candidate.start), minutes(candidate.end));
        let (b0, b1) = (minutes(existing.start), minutes(existing.end));
        prop_assume!(!(a0 < b1 && a1 > b0));
        prop_assert!(!has_conflict(&candidate, &[existing]));
    }
}
