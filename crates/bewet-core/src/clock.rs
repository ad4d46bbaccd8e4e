//! Calendar-day helpers.
//!
//! Every day-keyed query, streak comparison and "today/yesterday" check in
//! the engine goes through these functions. Day keys are `YYYY-MM-DD`
//! strings derived by LOCAL calendar-day truncation; lexicographic order of
//! the keys is chronological order, which is what the date-range queries
//! and streak comparisons rely on. Mixing in UTC-day derivation anywhere
//! would shift entries across midnight for non-UTC users.

use chrono::{DateTime, Days, Local, Timelike};

/// Day-key format shared with the persisted entries and the export document.
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Derive the local calendar-day key for an instant.
pub fn day_key(at: DateTime<Local>) -> String {
    at.format(DAY_KEY_FORMAT).to_string()
}

/// Today's day key (wall clock).
pub fn today() -> String {
    day_key(Local::now())
}

/// The day key `days_back` calendar days before `at`.
///
/// Uses calendar arithmetic on the local date, not a fixed 24h offset, so
/// DST transitions do not skip or duplicate a day.
pub fn day_key_back(at: DateTime<Local>, days_back: u64) -> String {
    let date = at
        .date_naive()
        .checked_sub_days(Days::new(days_back))
        .unwrap_or_else(|| at.date_naive());
    date.format(DAY_KEY_FORMAT).to_string()
}

/// Day keys for the trailing `n`-day window ending at `at`, oldest first.
///
/// `last_n_days(now, 7)` yields six days ago through today.
pub fn last_n_days(at: DateTime<Local>, n: u64) -> Vec<String> {
    (0..n).rev().map(|back| day_key_back(at, back)).collect()
}

/// Minutes elapsed since local midnight, 0..=1439.
pub fn minutes_of_day(at: DateTime<Local>) -> u32 {
    at.hour() * 60 + at.minute()
}
