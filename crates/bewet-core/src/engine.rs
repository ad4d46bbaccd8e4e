//! The composition root: one `Engine` owning the database, the two
//! ledgers and the three trackers, wired explicitly with no globals.
//!
//! Every mutation entry point follows the same strict order: validate,
//! persist, update the in-memory mirror, then evaluate gamification
//! triggers. Trigger evaluation happens only after the write succeeded,
//! so a storage failure can never celebrate progress that was not saved.

use chrono::{DateTime, Local, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::achievements::{
    water_trigger_candidates, AchievementState, AchievementTracker, WaterTriggerContext,
};
use crate::caffeine::{effective_goal, CaffeineEntry, CaffeineKind, CaffeineLedger};
use crate::clock;
use crate::error::{CoreError, ImportError, Result};
use crate::events::Event;
use crate::hydration::{progress_percentage, DailySummary, HydrationEntry, HydrationLedger};
use crate::milestones::{check_milestone_crossed, milestone_message};
use crate::reminders::{ReminderCheck, ReminderScheduler};
use crate::settings::{AppSettings, SettingsStore, SettingsUpdate};
use crate::storage::Database;
use crate::streak::{StreakLevel, StreakState, StreakTracker};

/// Export document version this build reads and writes.
pub const EXPORT_VERSION: &str = "1.0.0";

/// Full backup of persisted state, shaped for JSON interchange.
///
/// `caffeine_entries` defaults to empty so documents exported before
/// caffeine tracking existed still import cleanly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub settings: AppSettings,
    pub entries: Vec<HydrationEntry>,
    #[serde(default)]
    pub caffeine_entries: Vec<CaffeineEntry>,
    pub export_date: DateTime<Utc>,
    pub version: String,
}

pub struct Engine {
    db: Database,
    settings: SettingsStore,
    hydration: HydrationLedger,
    caffeine: CaffeineLedger,
    streak: StreakTracker,
    achievements: AchievementTracker,
    reminders: ReminderScheduler,
}

impl Engine {
    /// Open the engine over the default data directory.
    pub fn open() -> Result<Self> {
        Self::with_database(Database::open()?)
    }

    /// Open the engine over a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        Self::with_database(Database::open_at(path)?)
    }

    /// Open the engine over an in-memory database.
    pub fn open_memory() -> Result<Self> {
        Self::with_database(Database::open_memory()?)
    }

    pub fn with_database(db: Database) -> Result<Self> {
        Self::with_database_at(db, Local::now())
    }

    /// Wire all components over `db` and run the startup streak check.
    pub fn with_database_at(db: Database, now: DateTime<Local>) -> Result<Self> {
        let settings = SettingsStore::load(&db)?;
        let hydration = HydrationLedger::load_at(&db, now)?;
        let caffeine = CaffeineLedger::load_at(&db, now)?;
        let mut streak = StreakTracker::load(&db)?;
        let achievements = AchievementTracker::load(&db)?;
        let reminders = ReminderScheduler::load(&db)?;

        streak.check_and_update_at(&db, now)?;

        Ok(Self {
            db,
            settings,
            hydration,
            caffeine,
            streak,
            achievements,
            reminders,
        })
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub fn settings(&self) -> &AppSettings {
        self.settings.current()
    }

    /// Merge a partial settings update, validate, persist.
    ///
    /// A reminder-schedule change drops the cached next-due instant so
    /// the new window and interval take effect on the next check.
    pub fn update_settings(&mut self, update: &SettingsUpdate) -> Result<AppSettings> {
        let schedule_before = self.settings.current().reminder_schedule.clone();
        let updated = self.settings.update(&self.db, update)?.clone();
        if updated.reminder_schedule != schedule_before {
            self.reminders.invalidate_next_due(&self.db)?;
        }
        Ok(updated)
    }

    /// The goal every progress judgement uses today.
    pub fn effective_goal(&self) -> u32 {
        let settings = self.settings.current();
        let penalty = self.caffeine.today_penalty(&settings.caffeine_settings);
        effective_goal(settings.daily_goal, &settings.caffeine_settings, penalty)
    }

    // ── Water ────────────────────────────────────────────────────────

    /// Log a water intake and evaluate everything downstream of it.
    ///
    /// Returns the emitted events in order: the logged entry, then goal
    /// completion, then a crossed milestone, then fresh achievement
    /// unlocks. A zero amount emits nothing.
    pub fn add_water(&mut self, amount: u32) -> Result<Vec<Event>> {
        self.add_water_at(amount, Local::now())
    }

    pub fn add_water_at(&mut self, amount: u32, now: DateTime<Local>) -> Result<Vec<Event>> {
        self.hydration.roll_to(&self.db, now)?;
        self.caffeine.roll_to(&self.db, now)?;

        let settings = self.settings.current().clone();
        let penalty = self.caffeine.today_penalty(&settings.caffeine_settings);
        let goal = effective_goal(settings.daily_goal, &settings.caffeine_settings, penalty);

        let old_total = self.hydration.today_total();
        let entries_before = self.hydration.today_entries().len();
        let old_pct = progress_percentage(old_total, goal);

        let Some(new_total) = self.hydration.add_water_at(&self.db, amount, now)? else {
            return Ok(Vec::new());
        };
        let new_pct = progress_percentage(new_total, goal);
        let entry_id = self
            .hydration
            .today_entries()
            .last()
            .map(|e| e.id.clone())
            .unwrap_or_default();

        let at = now.with_timezone(&Utc);
        let mut events = vec![Event::WaterLogged {
            entry_id,
            amount,
            today_total: new_total,
            effective_goal: goal,
            progress: new_pct,
            at,
        }];

        if old_total < goal && new_total >= goal {
            self.streak.record_goal_completed_at(&self.db, now)?;
            events.push(Event::GoalReached {
                today_total: new_total,
                effective_goal: goal,
                current_streak: self.streak.current(),
                at,
            });
        }

        if let Some(milestone) = check_milestone_crossed(old_pct, new_pct) {
            let message =
                milestone_message(milestone, settings.language, &mut rand::thread_rng())
                    .to_string();
            events.push(Event::MilestoneCrossed {
                milestone,
                message,
                at,
            });
        }

        let ctx = WaterTriggerContext {
            entry_hour: now.hour(),
            entries_before,
            old_pct,
            new_pct,
            current_streak: self.streak.current(),
        };
        for id in water_trigger_candidates(&ctx) {
            if self.achievements.unlock(&self.db, id)? {
                events.push(Event::AchievementUnlocked { id, at });
            }
        }

        Ok(events)
    }

    /// Delete a water entry by id. Unknown ids are a silent no-op.
    pub fn delete_water(&mut self, id: &str) -> Result<()> {
        self.hydration.delete_entry(&self.db, id)?;
        Ok(())
    }

    pub fn today_entries(&self) -> &[HydrationEntry] {
        self.hydration.today_entries()
    }

    /// Today's summary including the caffeine columns.
    pub fn today_summary(&mut self) -> Result<DailySummary> {
        self.today_summary_at(Local::now())
    }

    pub fn today_summary_at(&mut self, now: DateTime<Local>) -> Result<DailySummary> {
        self.hydration.roll_to(&self.db, now)?;
        self.caffeine.roll_to(&self.db, now)?;

        let settings = self.settings.current();
        let penalty = self.caffeine.today_penalty(&settings.caffeine_settings);
        let goal = effective_goal(settings.daily_goal, &settings.caffeine_settings, penalty);
        let total = self.hydration.today_total();

        Ok(DailySummary {
            date: clock::day_key(now),
            total,
            goal,
            entries: self.hydration.today_entries().len() as u32,
            goal_reached: total >= goal,
            caffeine_entries: Some(self.caffeine.today_entries().len() as u32),
            caffeine_penalty: Some(penalty),
        })
    }

    /// Seven summaries, oldest first, each judged against that day's
    /// effective goal.
    pub fn week_overview(&mut self) -> Result<Vec<DailySummary>> {
        self.week_overview_at(Local::now())
    }

    pub fn week_overview_at(&mut self, now: DateTime<Local>) -> Result<Vec<DailySummary>> {
        self.hydration.roll_to(&self.db, now)?;
        self.caffeine.roll_to(&self.db, now)?;

        let settings = self.settings.current();
        let caffeine_cfg = &settings.caffeine_settings;
        let penalties = self.caffeine.week_penalties_at(caffeine_cfg, now);
        let counts = self.caffeine.week_entry_counts();

        let mut week = self.hydration.week_summary(settings.daily_goal);
        for day in &mut week {
            let penalty = penalties.get(&day.date).copied().unwrap_or(0);
            day.goal = effective_goal(settings.daily_goal, caffeine_cfg, penalty);
            day.goal_reached = day.total >= day.goal;
            day.caffeine_entries = Some(counts.get(&day.date).copied().unwrap_or(0));
            day.caffeine_penalty = Some(if caffeine_cfg.enabled { penalty } else { 0 });
        }
        Ok(week)
    }

    pub fn weekly_average(&self) -> u32 {
        self.hydration.weekly_average()
    }

    /// Window days whose total reached the configured daily goal.
    pub fn days_at_goal(&self) -> usize {
        self.hydration.days_at_goal(self.settings.current().daily_goal)
    }

    // ── Caffeine ─────────────────────────────────────────────────────

    /// Log one caffeine serving. No-op while tracking is disabled.
    pub fn add_caffeine(&mut self, kind: CaffeineKind, note: Option<String>) -> Result<Vec<Event>> {
        self.add_caffeine_at(kind, note, Local::now())
    }

    pub fn add_caffeine_at(
        &mut self,
        kind: CaffeineKind,
        note: Option<String>,
        now: DateTime<Local>,
    ) -> Result<Vec<Event>> {
        let settings = self.settings.current().clone();
        let Some(entry) =
            self.caffeine
                .add_serving_at(&self.db, &settings.caffeine_settings, kind, note, now)?
        else {
            return Ok(Vec::new());
        };

        let penalty = self.caffeine.today_penalty(&settings.caffeine_settings);
        Ok(vec![Event::CaffeineLogged {
            entry_id: entry.id,
            kind,
            today_penalty: penalty,
            effective_goal: effective_goal(settings.daily_goal, &settings.caffeine_settings, penalty),
            at: now.with_timezone(&Utc),
        }])
    }

    pub fn delete_caffeine(&mut self, id: &str) -> Result<()> {
        self.caffeine.delete_serving(&self.db, id)?;
        Ok(())
    }

    pub fn update_caffeine_note(&mut self, id: &str, note: &str) -> Result<()> {
        self.caffeine.update_note(&self.db, id, note)?;
        Ok(())
    }

    pub fn caffeine_entries(&self) -> &[CaffeineEntry] {
        self.caffeine.today_entries()
    }

    pub fn today_caffeine_penalty(&self) -> u32 {
        self.caffeine
            .today_penalty(&self.settings.current().caffeine_settings)
    }

    // ── Streak / achievements ────────────────────────────────────────

    pub fn streak(&self) -> &StreakState {
        self.streak.state()
    }

    pub fn streak_level(&self) -> StreakLevel {
        self.streak.level()
    }

    pub fn achievements(&self) -> &AchievementState {
        self.achievements.state()
    }

    pub fn acknowledge_achievement(&mut self) -> Result<()> {
        self.achievements.clear_newly_unlocked(&self.db)?;
        Ok(())
    }

    // ── Reminders ────────────────────────────────────────────────────

    pub fn check_reminder(&mut self) -> Result<ReminderCheck> {
        self.check_reminder_at(Local::now())
    }

    pub fn check_reminder_at(&mut self, now: DateTime<Local>) -> Result<ReminderCheck> {
        let schedule = self.settings.current().reminder_schedule.clone();
        Ok(self.reminders.check_at(&self.db, &schedule, now)?)
    }

    pub fn snooze_reminder(&mut self, minutes: Option<u32>) -> Result<()> {
        self.snooze_reminder_at(minutes, Local::now())
    }

    pub fn snooze_reminder_at(
        &mut self,
        minutes: Option<u32>,
        now: DateTime<Local>,
    ) -> Result<()> {
        self.reminders.snooze_at(&self.db, minutes, now)?;
        Ok(())
    }

    pub fn dismiss_reminder(&mut self) -> Result<()> {
        self.dismiss_reminder_at(Local::now())
    }

    pub fn dismiss_reminder_at(&mut self, now: DateTime<Local>) -> Result<()> {
        let schedule = self.settings.current().reminder_schedule.clone();
        self.reminders.dismiss_at(&self.db, &schedule, now)?;
        Ok(())
    }

    // ── Export / import / reset ──────────────────────────────────────

    /// Snapshot everything persisted into one JSON-ready document.
    pub fn export_data(&self) -> Result<ExportDocument> {
        self.export_data_at(Utc::now())
    }

    pub fn export_data_at(&self, at: DateTime<Utc>) -> Result<ExportDocument> {
        Ok(ExportDocument {
            settings: self.settings.current().clone(),
            entries: self.db.all_hydration()?,
            caffeine_entries: self.db.all_caffeine()?,
            export_date: at,
            version: EXPORT_VERSION.to_string(),
        })
    }

    /// Replace all entry collections and settings with a parsed document.
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        self.import_json_at(json, Local::now())
    }

    pub fn import_json_at(&mut self, json: &str, now: DateTime<Local>) -> Result<()> {
        let doc: ExportDocument = serde_json::from_str(json)
            .map_err(|e| ImportError::ParseFailed(e.to_string()))?;
        self.import_document_at(doc, now)
    }

    pub fn import_document_at(&mut self, doc: ExportDocument, now: DateTime<Local>) -> Result<()> {
        if !doc.version.starts_with("1.") {
            return Err(CoreError::Import(ImportError::UnsupportedVersion(
                doc.version,
            )));
        }

        self.db.clear_hydration()?;
        self.db.clear_caffeine()?;
        self.settings.replace(&self.db, doc.settings)?;
        for entry in &doc.entries {
            self.db.put_hydration_entry(entry)?;
        }
        for entry in &doc.caffeine_entries {
            self.db.put_caffeine_entry(entry)?;
        }

        self.hydration = HydrationLedger::load_at(&self.db, now)?;
        self.caffeine = CaffeineLedger::load_at(&self.db, now)?;
        Ok(())
    }

    /// Wipe every collection and singleton; memory drops to defaults.
    ///
    /// Storage stays empty afterwards: defaults are reseeded lazily on
    /// the next write, exactly like a first run.
    pub fn reset_all_data(&mut self) -> Result<()> {
        self.reset_all_data_at(Local::now())
    }

    pub fn reset_all_data_at(&mut self, now: DateTime<Local>) -> Result<()> {
        self.db.clear_hydration()?;
        self.db.clear_caffeine()?;
        self.db.kv_clear()?;

        self.settings.reset_to_defaults();
        self.streak.reset_to_defaults();
        self.achievements.reset_to_defaults();
        self.reminders.reset_to_defaults();
        self.hydration = HydrationLedger::load_at(&self.db, now)?;
        self.caffeine = CaffeineLedger::load_at(&self.db, now)?;
        Ok(())
    }
}
