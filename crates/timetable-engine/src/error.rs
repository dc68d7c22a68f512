//! Error types for timetable-engine operations.
//!
//! Only the input boundary ([`crate::record`]) and the string parsers for view
//! and preference names can fail. Expansion, conflict detection and slot search
//! are total: malformed-but-typed events degrade to empty results instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid date-time: {0}")]
    InvalidDateTime(String),

    #[error("Invalid weekday index {0} (expected 0 = Sunday .. 6 = Saturday)")]
    InvalidWeekday(i64),

    #[error("Unknown event kind: {0}")]
    UnknownKind(String),

    #[error("Unknown repeat pattern: {0}")]
    UnknownRepeatPattern(String),

    #[error("Unknown calendar view: {0}")]
    UnknownView(String),

    #[error("Unknown time preference: {0}")]
    UnknownTimePreference(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
