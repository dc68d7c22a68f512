//! `timetable` CLI — expand class schedules, check conflicts and find free slots
//! from JSON event files.
//!
//! ## Usage
//!
//! ```sh
//! # Instances visible in the month around a date
//! timetable expand -i events.json --date 2024-03-18 --view month
//!
//! # Agenda grouped by day, from stdin
//! cat events.json | timetable expand --date 2024-03-18 --view agenda --group
//!
//! # Does a new exam collide with the existing timetable?
//! timetable conflicts -i events.json --candidate exam.json
//!
//! # Two 90-minute morning sessions on weekdays
//! timetable slots -i busy.json --duration 90 --days 1,2,3,4,5 --sessions 2 --prefer morning
//! ```
//!
//! Logging goes to stderr: `--debug` or `RUST_LOG=timetable_engine=trace`.

use std::io::{self, Read};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, Weekday};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

use timetable_engine::event::weekday_from_index;
use timetable_engine::expander::group_by_day;
use timetable_engine::record::parse_datetime;
use timetable_engine::{
    expand, find_slots, list_conflicts, parse_busy_records, parse_record, parse_records,
    SlotSearch, TimePreference, ViewKind,
};

#[derive(Parser)]
#[command(
    name = "timetable",
    version,
    about = "Expand class timetables, check conflicts and find free slots"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level (otherwise RUST_LOG, default warn)
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand base events into the instances visible in a calendar view
    Expand {
        /// Events file, a JSON array of rows (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Reference date or date-time, e.g. 2024-03-18
        #[arg(long, value_parser = parse_reference)]
        date: NaiveDateTime,
        /// Calendar view: day, week, month or agenda
        #[arg(long, default_value = "week")]
        view: ViewKind,
        /// Group instances by start date
        #[arg(long)]
        group: bool,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// List existing events a candidate event collides with
    Conflicts {
        /// Existing events file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// File holding the candidate event row
        #[arg(long)]
        candidate: String,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Suggest weekly meeting days and times free of busy events
    Slots {
        /// Busy events file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Session length in minutes
        #[arg(long)]
        duration: u32,
        /// Candidate weekdays, comma-separated, 0 = Sunday .. 6 = Saturday
        #[arg(long, value_delimiter = ',', value_parser = parse_weekday, required = true)]
        days: Vec<Weekday>,
        /// Sessions per week
        #[arg(long, default_value_t = 1)]
        sessions: usize,
        /// Time of day: any, morning or afternoon
        #[arg(long, default_value = "any")]
        prefer: TimePreference,
        /// First day of the search week (defaults to today)
        #[arg(long, value_parser = parse_day)]
        today: Option<NaiveDate>,
        /// Maximum number of suggestions
        #[arg(long, default_value_t = 5)]
        limit: usize,
        /// Minutes between candidate start times
        #[arg(long, default_value_t = 30)]
        step: u32,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(Level::WARN.to_string()))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Expand {
            input,
            date,
            view,
            group,
            pretty,
        } => {
            let events = parse_records(&read_input(input.as_deref())?)
                .context("Failed to parse events")?;
            debug!(events = events.len(), %view, %date, "expanding");

            let instances = expand(&events, date, view);
            let output = if group {
                serde_json::to_value(group_by_day(&instances))?
            } else {
                serde_json::to_value(&instances)?
            };
            print_json(&output, pretty)
        }
        Commands::Conflicts {
            input,
            candidate,
            pretty,
        } => {
            let existing = parse_records(&read_input(input.as_deref())?)
                .context("Failed to parse existing events")?;
            let candidate = parse_record(&read_input(Some(candidate.as_str()))?)
                .context("Failed to parse candidate event")?;

            let conflicts = list_conflicts(&candidate, &existing);
            let output = json!({
                "conflict": !conflicts.is_empty(),
                "conflicts": conflicts,
            });
            print_json(&output, pretty)
        }
        Commands::Slots {
            input,
            duration,
            days,
            sessions,
            prefer,
            today,
            limit,
            step,
            pretty,
        } => {
            let busy = parse_busy_records(&read_input(input.as_deref())?)
                .context("Failed to parse busy events")?;
            let today = today.unwrap_or_else(|| Local::now().date_naive());

            let mut search = SlotSearch::new(duration, days, sessions, prefer);
            search.max_suggestions = limit;
            search.step_minutes = step;

            let suggestions = find_slots(&busy, &search, today);
            print_json(&serde_json::to_value(&suggestions)?, pretty)
        }
    }
}

fn parse_reference(s: &str) -> Result<NaiveDateTime, String> {
    parse_datetime(s).map_err(|e| e.to_string())
}

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    parse_datetime(s)
        .map(|dt| dt.date())
        .map_err(|e| e.to_string())
}

fn parse_weekday(s: &str) -> Result<Weekday, String> {
    let index: i64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a weekday number (0 = Sunday .. 6 = Saturday)", s))?;
    weekday_from_index(index).map_err(|e| e.to_string())
}

fn print_json(value: &serde_json::Value, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
