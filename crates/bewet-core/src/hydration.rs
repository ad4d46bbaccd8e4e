//! Hydration ledger: append-only per-day water entries and the
//! derivations over them (today's total, progress, 7-day summaries).
//!
//! The ledger keeps an in-memory mirror of today's entries and the
//! trailing 7-day window. Mutations write to storage first and update the
//! mirror only after the write succeeds; derived values are recomputed on
//! read from the raw entries and never cached beyond that mirror.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::clock;
use crate::error::DatabaseError;
use crate::storage::Database;

/// Days covered by the rolling history window, today included.
pub const WEEK_WINDOW_DAYS: u64 = 7;

/// A single logged water intake. Immutable once created except deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydrationEntry {
    pub id: String,
    /// Volume in ml, always positive.
    pub amount: u32,
    /// Instant of logging; serialized as epoch milliseconds on the wire.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Local calendar-day key derived from `timestamp` at logging time.
    pub date: String,
}

/// Derived per-day summary. Recomputed on every read, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: String,
    pub total: u32,
    pub goal: u32,
    pub entries: u32,
    pub goal_reached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caffeine_entries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caffeine_penalty: Option<u32>,
}

/// Progress toward a goal as a percentage, capped at 100.
///
/// A non-positive goal yields 0 rather than dividing by zero.
pub fn progress_percentage(total: u32, goal: u32) -> f64 {
    if goal == 0 {
        return 0.0;
    }
    (total as f64 / goal as f64 * 100.0).min(100.0)
}

/// Hydration ledger over the persistent record store.
#[derive(Debug)]
pub struct HydrationLedger {
    today_key: String,
    today: Vec<HydrationEntry>,
    /// Trailing window entries grouped by day key; holds exactly
    /// `WEEK_WINDOW_DAYS` keys, empty days included.
    week: BTreeMap<String, Vec<HydrationEntry>>,
}

impl HydrationLedger {
    /// Load today's entries and the trailing week from storage.
    pub fn load(db: &Database) -> Result<Self, DatabaseError> {
        Self::load_at(db, Local::now())
    }

    pub fn load_at(db: &Database, now: DateTime<Local>) -> Result<Self, DatabaseError> {
        let today_key = clock::day_key(now);
        let window = clock::last_n_days(now, WEEK_WINDOW_DAYS);

        let mut week: BTreeMap<String, Vec<HydrationEntry>> =
            window.iter().map(|d| (d.clone(), Vec::new())).collect();
        let start = window.first().cloned().unwrap_or_else(|| today_key.clone());
        for entry in db.hydration_in_range(&start, &today_key)? {
            if let Some(day) = week.get_mut(&entry.date) {
                day.push(entry);
            }
        }
        let today = week.get(&today_key).cloned().unwrap_or_default();

        Ok(Self {
            today_key,
            today,
            week,
        })
    }

    /// Refresh the mirror when the local day has rolled over since load.
    pub(crate) fn roll_to(&mut self, db: &Database, now: DateTime<Local>) -> Result<(), DatabaseError> {
        if clock::day_key(now) != self.today_key {
            *self = Self::load_at(db, now)?;
        }
        Ok(())
    }

    /// Log a water intake of `amount` ml.
    ///
    /// A zero amount is a silent no-op returning `None`. Otherwise the
    /// entry is stamped with the current instant and its local day key,
    /// persisted, and the updated today-total is returned. Each call
    /// creates a distinct entry; duplicates from rapid double-taps are
    /// accepted by design.
    pub fn add_water(&mut self, db: &Database, amount: u32) -> Result<Option<u32>, DatabaseError> {
        self.add_water_at(db, amount, Local::now())
    }

    pub fn add_water_at(
        &mut self,
        db: &Database,
        amount: u32,
        now: DateTime<Local>,
    ) -> Result<Option<u32>, DatabaseError> {
        if amount == 0 {
            return Ok(None);
        }
        self.roll_to(db, now)?;

        let entry = HydrationEntry {
            id: Uuid::new_v4().to_string(),
            amount,
            timestamp: now.with_timezone(&Utc),
            date: self.today_key.clone(),
        };

        // Persist first; the mirror must not change if the write fails.
        db.put_hydration_entry(&entry)?;
        if let Some(day) = self.week.get_mut(&self.today_key) {
            day.push(entry.clone());
        }
        self.today.push(entry);

        Ok(Some(self.today_total()))
    }

    /// Delete an entry by id. Unknown ids are a silent no-op.
    pub fn delete_entry(&mut self, db: &Database, id: &str) -> Result<(), DatabaseError> {
        db.delete_hydration(id)?;
        self.today.retain(|e| e.id != id);
        for day in self.week.values_mut() {
            day.retain(|e| e.id != id);
        }
        Ok(())
    }

    /// Entries logged today, oldest first.
    pub fn today_entries(&self) -> &[HydrationEntry] {
        &self.today
    }

    /// Sum of today's logged volumes in ml.
    pub fn today_total(&self) -> u32 {
        self.today.iter().map(|e| e.amount).sum()
    }

    /// Today's progress toward `goal`, capped at 100.
    pub fn progress(&self, goal: u32) -> f64 {
        progress_percentage(self.today_total(), goal)
    }

    /// Whether today's total has reached `goal`.
    pub fn goal_reached(&self, goal: u32) -> bool {
        self.today_total() >= goal
    }

    /// One summary per trailing-window day, oldest first.
    ///
    /// Always exactly `WEEK_WINDOW_DAYS` summaries; days without entries
    /// yield zero totals, which only count as reached when `goal` is 0.
    pub fn week_summary(&self, goal: u32) -> Vec<DailySummary> {
        self.week
            .iter()
            .map(|(date, entries)| {
                let total = entries.iter().map(|e| e.amount).sum::<u32>();
                DailySummary {
                    date: date.clone(),
                    total,
                    goal,
                    entries: entries.len() as u32,
                    goal_reached: total >= goal,
                    caffeine_entries: None,
                    caffeine_penalty: None,
                }
            })
            .collect()
    }

    /// Arithmetic mean of the window's daily totals, rounded to nearest ml.
    pub fn weekly_average(&self) -> u32 {
        if self.week.is_empty() {
            return 0;
        }
        let sum: u32 = self
            .week
            .values()
            .map(|entries| entries.iter().map(|e| e.amount).sum::<u32>())
            .sum();
        (sum as f64 / self.week.len() as f64).round() as u32
    }

    /// Number of window days whose total reached `goal`.
    pub fn days_at_goal(&self, goal: u32) -> usize {
        self.week
            .values()
            .filter(|entries| entries.iter().map(|e| e.amount).sum::<u32>() >= goal)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn add_water_accumulates_today_total() {
        let db = Database::open_memory().unwrap();
        let now = local(2024, 5, 10, 9, 0);
        let mut ledger = HydrationLedger::load_at(&db, now).unwrap();

        assert_eq!(ledger.add_water_at(&db, 200, now).unwrap(), Some(200));
        assert_eq!(ledger.add_water_at(&db, 300, now).unwrap(), Some(500));
        assert_eq!(ledger.today_total(), 500);
        assert_eq!(ledger.today_entries().len(), 2);
    }

    #[test]
    fn zero_amount_is_a_silent_noop() {
        let db = Database::open_memory().unwrap();
        let now = local(2024, 5, 10, 9, 0);
        let mut ledger = HydrationLedger::load_at(&db, now).unwrap();

        assert_eq!(ledger.add_water_at(&db, 0, now).unwrap(), None);
        assert_eq!(ledger.today_total(), 0);
        assert!(db.all_hydration().unwrap().is_empty());
    }

    #[test]
    fn entries_persist_across_reload() {
        let db = Database::open_memory().unwrap();
        let now = local(2024, 5, 10, 9, 0);
        let mut ledger = HydrationLedger::load_at(&db, now).unwrap();
        ledger.add_water_at(&db, 250, now).unwrap();

        let reloaded = HydrationLedger::load_at(&db, now).unwrap();
        assert_eq!(reloaded.today_total(), 250);
    }

    #[test]
    fn week_summary_always_seven_days_oldest_first() {
        let db = Database::open_memory().unwrap();
        let now = local(2024, 5, 10, 9, 0);
        let ledger = HydrationLedger::load_at(&db, now).unwrap();

        let week = ledger.week_summary(2000);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, "2024-05-04");
        assert_eq!(week[6].date, "2024-05-10");
        assert!(week.iter().all(|d| d.total == 0 && d.entries == 0));
        assert!(week.iter().all(|d| !d.goal_reached));
    }

    #[test]
    fn week_summary_groups_prior_days() {
        let db = Database::open_memory().unwrap();
        // Log on two different days.
        let day1 = local(2024, 5, 8, 12, 0);
        let day2 = local(2024, 5, 10, 9, 0);
        let mut ledger = HydrationLedger::load_at(&db, day1).unwrap();
        ledger.add_water_at(&db, 2000, day1).unwrap();
        let mut ledger = HydrationLedger::load_at(&db, day2).unwrap();
        ledger.add_water_at(&db, 500, day2).unwrap();

        let week = ledger.week_summary(2000);
        let day8 = week.iter().find(|d| d.date == "2024-05-08").unwrap();
        assert_eq!(day8.total, 2000);
        assert!(day8.goal_reached);
        let day10 = week.iter().find(|d| d.date == "2024-05-10").unwrap();
        assert_eq!(day10.total, 500);
        assert!(!day10.goal_reached);

        assert_eq!(ledger.weekly_average(), ((2500.0_f64) / 7.0).round() as u32);
        assert_eq!(ledger.days_at_goal(2000), 1);
    }

    #[test]
    fn day_rollover_refreshes_today() {
        let db = Database::open_memory().unwrap();
        let evening = local(2024, 5, 9, 23, 50);
        let mut ledger = HydrationLedger::load_at(&db, evening).unwrap();
        ledger.add_water_at(&db, 400, evening).unwrap();
        assert_eq!(ledger.today_total(), 400);

        // Next add happens after midnight: yesterday's total must not leak.
        let morning = local(2024, 5, 10, 0, 10);
        assert_eq!(ledger.add_water_at(&db, 100, morning).unwrap(), Some(100));
        assert_eq!(ledger.today_total(), 100);
    }

    #[test]
    fn delete_entry_is_idempotent() {
        let db = Database::open_memory().unwrap();
        let now = local(2024, 5, 10, 9, 0);
        let mut ledger = HydrationLedger::load_at(&db, now).unwrap();
        ledger.add_water_at(&db, 250, now).unwrap();
        let id = ledger.today_entries()[0].id.clone();

        ledger.delete_entry(&db, &id).unwrap();
        ledger.delete_entry(&db, &id).unwrap();
        assert_eq!(ledger.today_total(), 0);
    }

    #[test]
    fn progress_exact_goal_is_exactly_100() {
        assert_eq!(progress_percentage(2000, 2000), 100.0);
        assert_eq!(progress_percentage(0, 2000), 0.0);
        assert_eq!(progress_percentage(3000, 2000), 100.0);
        assert_eq!(progress_percentage(500, 0), 0.0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn progress_is_min_of_ratio_and_cap(total in 0u32..1_000_000, goal in 1u32..1_000_000) {
                let pct = progress_percentage(total, goal);
                let expected = (total as f64 / goal as f64 * 100.0).min(100.0);
                prop_assert!((pct - expected).abs() < 1e-9);
                prop_assert!(pct >= 0.0 && pct <= 100.0);
            }

            #[test]
            fn progress_monotone_in_total(total in 0u32..500_000, extra in 0u32..500_000, goal in 1u32..1_000_000) {
                prop_assert!(progress_percentage(total + extra, goal) >= progress_percentage(total, goal));
            }
        }
    }
}
