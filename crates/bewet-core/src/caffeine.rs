//! Caffeine ledger: tea/coffee servings and the goal penalty they derive.
//!
//! Each serving adds a configured volume to the effective daily goal;
//! nothing is ever subtracted from logged progress. Entries are editable
//! (note) and deletable, unlike hydration entries.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::clock;
use crate::error::DatabaseError;
use crate::hydration::WEEK_WINDOW_DAYS;
use crate::settings::CaffeineSettings;
use crate::storage::Database;

/// Kind of caffeinated drink; determines which penalty applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaffeineKind {
    Tea,
    Coffee,
}

/// A logged caffeine serving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaffeineEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: CaffeineKind,
    /// Serving count, always positive. New entries start at 1.
    pub servings: u32,
    /// Optional free-text note ("green tea", "espresso").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub date: String,
}

impl CaffeineEntry {
    /// Penalty volume this entry contributes under `settings`.
    pub fn penalty(&self, settings: &CaffeineSettings) -> u32 {
        let per_serving = match self.kind {
            CaffeineKind::Tea => settings.tea_penalty_ml,
            CaffeineKind::Coffee => settings.coffee_penalty_ml,
        };
        self.servings * per_serving
    }
}

/// The goal every progress judgement uses: the configured daily goal plus
/// today's caffeine penalty while tracking is enabled. Derived, never
/// persisted.
pub fn effective_goal(daily_goal: u32, settings: &CaffeineSettings, today_penalty: u32) -> u32 {
    if settings.enabled {
        daily_goal + today_penalty
    } else {
        daily_goal
    }
}

/// Caffeine ledger over the persistent record store.
#[derive(Debug)]
pub struct CaffeineLedger {
    today_key: String,
    today: Vec<CaffeineEntry>,
    week: Vec<CaffeineEntry>,
}

impl CaffeineLedger {
    pub fn load(db: &Database) -> Result<Self, DatabaseError> {
        Self::load_at(db, Local::now())
    }

    pub fn load_at(db: &Database, now: DateTime<Local>) -> Result<Self, DatabaseError> {
        let today_key = clock::day_key(now);
        let start = clock::day_key_back(now, WEEK_WINDOW_DAYS - 1);
        let week = db.caffeine_in_range(&start, &today_key)?;
        let today = week.iter().filter(|e| e.date == today_key).cloned().collect();
        Ok(Self {
            today_key,
            today,
            week,
        })
    }

    pub(crate) fn roll_to(&mut self, db: &Database, now: DateTime<Local>) -> Result<(), DatabaseError> {
        if clock::day_key(now) != self.today_key {
            *self = Self::load_at(db, now)?;
        }
        Ok(())
    }

    /// Log one serving of `kind` with an optional note.
    ///
    /// A silent no-op returning `None` while caffeine tracking is
    /// disabled. Otherwise persists the entry (servings = 1, stamped with
    /// the current instant and day key) and returns a copy of it.
    pub fn add_serving(
        &mut self,
        db: &Database,
        settings: &CaffeineSettings,
        kind: CaffeineKind,
        note: Option<String>,
    ) -> Result<Option<CaffeineEntry>, DatabaseError> {
        self.add_serving_at(db, settings, kind, note, Local::now())
    }

    pub fn add_serving_at(
        &mut self,
        db: &Database,
        settings: &CaffeineSettings,
        kind: CaffeineKind,
        note: Option<String>,
        now: DateTime<Local>,
    ) -> Result<Option<CaffeineEntry>, DatabaseError> {
        if !settings.enabled {
            return Ok(None);
        }
        self.roll_to(db, now)?;

        let entry = CaffeineEntry {
            id: Uuid::new_v4().to_string(),
            kind,
            servings: 1,
            note,
            timestamp: now.with_timezone(&Utc),
            date: self.today_key.clone(),
        };

        db.put_caffeine_entry(&entry)?;
        self.today.push(entry.clone());
        self.week.push(entry.clone());

        Ok(Some(entry))
    }

    /// Remove a serving by id. Unknown ids are a silent no-op.
    pub fn delete_serving(&mut self, db: &Database, id: &str) -> Result<(), DatabaseError> {
        db.delete_caffeine(id)?;
        self.today.retain(|e| e.id != id);
        self.week.retain(|e| e.id != id);
        Ok(())
    }

    /// Replace the note of an existing entry. Unknown ids are a no-op.
    pub fn update_note(
        &mut self,
        db: &Database,
        id: &str,
        note: &str,
    ) -> Result<(), DatabaseError> {
        let Some(entry) = self.week.iter().find(|e| e.id == id) else {
            return Ok(());
        };
        let mut updated = entry.clone();
        updated.note = Some(note.to_string());

        db.put_caffeine_entry(&updated)?;
        for slot in self.today.iter_mut().chain(self.week.iter_mut()) {
            if slot.id == id {
                slot.note = updated.note.clone();
            }
        }
        Ok(())
    }

    /// Today's servings, oldest first.
    pub fn today_entries(&self) -> &[CaffeineEntry] {
        &self.today
    }

    /// Total ml added to today's effective goal under `settings`.
    pub fn today_penalty(&self, settings: &CaffeineSettings) -> u32 {
        self.today.iter().map(|e| e.penalty(settings)).sum()
    }

    /// Today's tea servings.
    pub fn today_tea_count(&self) -> u32 {
        self.today
            .iter()
            .filter(|e| e.kind == CaffeineKind::Tea)
            .map(|e| e.servings)
            .sum()
    }

    /// Today's coffee servings.
    pub fn today_coffee_count(&self) -> u32 {
        self.today
            .iter()
            .filter(|e| e.kind == CaffeineKind::Coffee)
            .map(|e| e.servings)
            .sum()
    }

    /// Penalty per day key over the trailing window, zero-filled so every
    /// window day is present.
    pub fn week_penalties(&self, settings: &CaffeineSettings) -> BTreeMap<String, u32> {
        self.week_penalties_at(settings, Local::now())
    }

    pub fn week_penalties_at(
        &self,
        settings: &CaffeineSettings,
        now: DateTime<Local>,
    ) -> BTreeMap<String, u32> {
        let mut penalties: BTreeMap<String, u32> = clock::last_n_days(now, WEEK_WINDOW_DAYS)
            .into_iter()
            .map(|d| (d, 0))
            .collect();
        for entry in &self.week {
            if let Some(total) = penalties.get_mut(&entry.date) {
                *total += entry.penalty(settings);
            }
        }
        penalties
    }

    /// Entry counts per day key over the trailing window.
    pub fn week_entry_counts(&self) -> BTreeMap<String, u32> {
        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        for entry in &self.week {
            *counts.entry(entry.date.clone()).or_default() += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn settings(tea: u32, coffee: u32) -> CaffeineSettings {
        CaffeineSettings {
            enabled: true,
            tea_penalty_ml: tea,
            coffee_penalty_ml: coffee,
        }
    }

    #[test]
    fn disabled_tracking_is_a_noop() {
        let db = Database::open_memory().unwrap();
        let now = local(2024, 5, 10, 9, 0);
        let mut ledger = CaffeineLedger::load_at(&db, now).unwrap();
        let off = CaffeineSettings {
            enabled: false,
            ..settings(250, 250)
        };

        assert!(ledger
            .add_serving_at(&db, &off, CaffeineKind::Coffee, None, now)
            .unwrap()
            .is_none());
        assert!(db.all_caffeine().unwrap().is_empty());
    }

    #[test]
    fn penalty_uses_per_kind_rates() {
        let db = Database::open_memory().unwrap();
        let now = local(2024, 5, 10, 9, 0);
        let cfg = settings(125, 250);
        let mut ledger = CaffeineLedger::load_at(&db, now).unwrap();

        ledger
            .add_serving_at(&db, &cfg, CaffeineKind::Tea, None, now)
            .unwrap();
        ledger
            .add_serving_at(&db, &cfg, CaffeineKind::Coffee, None, now)
            .unwrap();
        ledger
            .add_serving_at(&db, &cfg, CaffeineKind::Coffee, Some("latte".into()), now)
            .unwrap();

        assert_eq!(ledger.today_penalty(&cfg), 125 + 250 + 250);
        assert_eq!(ledger.today_tea_count(), 1);
        assert_eq!(ledger.today_coffee_count(), 2);
    }

    #[test]
    fn effective_goal_only_applies_when_enabled() {
        let cfg = settings(250, 250);
        assert_eq!(effective_goal(2000, &cfg, 500), 2500);

        let off = CaffeineSettings {
            enabled: false,
            ..cfg
        };
        assert_eq!(effective_goal(2000, &off, 500), 2000);
    }

    #[test]
    fn delete_and_unknown_note_update_are_noops() {
        let db = Database::open_memory().unwrap();
        let now = local(2024, 5, 10, 9, 0);
        let cfg = settings(250, 250);
        let mut ledger = CaffeineLedger::load_at(&db, now).unwrap();

        let entry = ledger
            .add_serving_at(&db, &cfg, CaffeineKind::Tea, None, now)
            .unwrap()
            .unwrap();

        ledger.update_note(&db, "missing-id", "ignored").unwrap();
        assert!(ledger.today_entries()[0].note.is_none());

        ledger.delete_serving(&db, &entry.id).unwrap();
        ledger.delete_serving(&db, &entry.id).unwrap();
        assert!(ledger.today_entries().is_empty());
        assert!(db.all_caffeine().unwrap().is_empty());
    }

    #[test]
    fn note_edit_persists() {
        let db = Database::open_memory().unwrap();
        let now = local(2024, 5, 10, 9, 0);
        let cfg = settings(250, 250);
        let mut ledger = CaffeineLedger::load_at(&db, now).unwrap();

        let entry = ledger
            .add_serving_at(&db, &cfg, CaffeineKind::Tea, None, now)
            .unwrap()
            .unwrap();
        ledger.update_note(&db, &entry.id, "green tea").unwrap();

        let reloaded = CaffeineLedger::load_at(&db, now).unwrap();
        assert_eq!(
            reloaded.today_entries()[0].note.as_deref(),
            Some("green tea")
        );
    }

    #[test]
    fn week_penalties_cover_every_window_day() {
        let db = Database::open_memory().unwrap();
        let cfg = settings(100, 200);
        let day1 = local(2024, 5, 8, 10, 0);
        let day2 = local(2024, 5, 10, 10, 0);

        let mut ledger = CaffeineLedger::load_at(&db, day1).unwrap();
        ledger
            .add_serving_at(&db, &cfg, CaffeineKind::Coffee, None, day1)
            .unwrap();
        let ledger = CaffeineLedger::load_at(&db, day2).unwrap();

        let penalties = ledger.week_penalties_at(&cfg, day2);
        assert_eq!(penalties.len(), 7);
        assert_eq!(penalties["2024-05-08"], 200);
        assert_eq!(penalties["2024-05-10"], 0);
        assert_eq!(penalties["2024-05-04"], 0);
    }

    #[test]
    fn entry_serializes_with_wire_field_names() {
        let entry = CaffeineEntry {
            id: "c1".into(),
            kind: CaffeineKind::Coffee,
            servings: 1,
            note: None,
            timestamp: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
            date: "2023-11-14".into(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "coffee");
        assert_eq!(json["timestamp"], 1_700_000_000_000_i64);
        assert!(json.get("note").is_none());
    }
}
