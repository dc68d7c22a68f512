//! WASM bindings for timetable-engine.
//!
//! Exposes calendar expansion, conflict detection and slot search to the web
//! client via `wasm-bindgen`. Events cross the boundary as JSON strings in the
//! row shape accepted by [`timetable_engine::record::EventRecord`]; results come
//! back as JSON strings in the camelCase shape of the engine types.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p timetable-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir web/src/wasm/ \
//!   target/wasm32-unknown-unknown/release/timetable_engine_wasm.wasm
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use timetable_engine::record::parse_datetime;
use timetable_engine::{
    base_id_of, parse_busy_records, parse_record, parse_records, SlotSearch, ViewKind,
};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Plain-Rust implementations (testable off-wasm; errors as strings)
// ---------------------------------------------------------------------------

fn parse_reference(s: &str) -> Result<NaiveDateTime, String> {
    parse_datetime(s).map_err(|e| e.to_string())
}

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    parse_reference(s).map(|dt| dt.date())
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn expand_impl(events_json: &str, reference: &str, view: &str) -> Result<String, String> {
    let events = parse_records(events_json).map_err(|e| e.to_string())?;
    let reference = parse_reference(reference)?;
    let view: ViewKind = view.parse().map_err(|e: timetable_engine::ScheduleError| e.to_string())?;

    to_json(&timetable_engine::expand(&events, reference, view))
}

fn list_conflicts_impl(candidate_json: &str, existing_json: &str) -> Result<String, String> {
    let candidate = parse_record(candidate_json).map_err(|e| e.to_string())?;
    let existing = parse_records(existing_json).map_err(|e| e.to_string())?;

    to_json(&timetable_engine::list_conflicts(&candidate, &existing))
}

fn has_conflict_impl(candidate_json: &str, existing_json: &str) -> Result<bool, String> {
    let candidate = parse_record(candidate_json).map_err(|e| e.to_string())?;
    let existing = parse_records(existing_json).map_err(|e| e.to_string())?;

    Ok(timetable_engine::has_conflict(&candidate, &existing))
}

fn find_slots_impl(busy_json: &str, options_json: &str, today: &str) -> Result<String, String> {
    let busy = parse_busy_records(busy_json).map_err(|e| e.to_string())?;
    let search: SlotSearch =
        serde_json::from_str(options_json).map_err(|e| format!("Invalid slot options: {}", e))?;
    let today = parse_day(today)?;

    to_json(&timetable_engine::find_slots(&busy, &search, today))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Expand base events into the instances visible in a calendar view.
///
/// - `events_json` -- JSON array of event rows
/// - `reference` -- date or local date-time the view is centred on (e.g. "2024-03-18")
/// - `view` -- "day", "week", "month" or "agenda"
///
/// Returns a JSON array of events sorted by start.
#[wasm_bindgen(js_name = "expand")]
pub fn expand(events_json: &str, reference: &str, view: &str) -> Result<String, JsValue> {
    expand_impl(events_json, reference, view).map_err(|e| JsValue::from_str(&e))
}

/// Whether the candidate event row collides with any of the existing rows.
#[wasm_bindgen(js_name = "hasConflict")]
pub fn has_conflict(candidate_json: &str, existing_json: &str) -> Result<bool, JsValue> {
    has_conflict_impl(candidate_json, existing_json).map_err(|e| JsValue::from_str(&e))
}

/// The existing events the candidate collides with, as a JSON array.
#[wasm_bindgen(js_name = "listConflicts")]
pub fn list_conflicts(candidate_json: &str, existing_json: &str) -> Result<String, JsValue> {
    list_conflicts_impl(candidate_json, existing_json).map_err(|e| JsValue::from_str(&e))
}

/// Suggest weekly meeting slots.
///
/// `options_json` is `{durationMinutes, candidateDays, sessionsPerWeek,
/// timePreference?, stepMinutes?, maxSuggestions?}` with days as 0 (Sunday) .. 6.
#[wasm_bindgen(js_name = "findSlots")]
pub fn find_slots(busy_json: &str, options_json: &str, today: &str) -> Result<String, JsValue> {
    find_slots_impl(busy_json, options_json, today).map_err(|e| JsValue::from_str(&e))
}

/// Map an instance id back to the id of the base event it came from.
#[wasm_bindgen(js_name = "baseIdOf")]
pub fn base_id(id: &str) -> String {
    base_id_of(id).to_string()
}
