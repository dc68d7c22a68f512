//! # timetable-engine
//!
//! Calendar math for a student/instructor class timetable.
//!
//! The engine is pure and synchronous: it reads base events held by the caller
//! and returns new values, with no I/O and no shared state.
//!
//! ## Modules
//!
//! - [`event`] — strict `CalendarEvent` model and instance-id helpers
//! - [`record`] — loosely typed persistence rows → `CalendarEvent`
//! - [`window`] — day / week / month / agenda view windows
//! - [`expander`] — expand recurring classes into instances for a window
//! - [`conflict`] — detect overlaps between a candidate and existing events
//! - [`slots`] — propose free weekly meeting slots
//! - [`error`] — Error types

pub mod conflict;
pub mod error;
pub mod event;
pub mod expander;
pub mod record;
pub mod slots;
pub mod window;

pub use conflict::{has_conflict, list_conflicts};
pub use error::ScheduleError;
pub use event::{base_id_of, split_instance_id, CalendarEvent, EventKind, RepeatPattern};
pub use expander::{expand, expand_in_window, ExpansionLimits};
pub use record::{parse_busy_records, parse_record, parse_records, EventRecord};
pub use slots::{find_slots, BusyEvent, SlotSearch, Suggestion, TimePreference};
pub use window::{ViewKind, ViewWindow};
