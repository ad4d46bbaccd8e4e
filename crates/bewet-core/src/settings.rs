//! Application settings: daily goal, language, reminder schedule and
//! caffeine penalty configuration.
//!
//! Exactly one settings record exists. It is stored as a JSON blob under
//! the `settings` kv key, default-initialized on first run, and mutated
//! only through partial updates merged over the current values. Field
//! names serialize in camelCase so the export document stays compatible
//! with documents produced by earlier builds of the app.

use serde::{Deserialize, Serialize};

use crate::error::{DatabaseError, ValidationError};
use crate::storage::Database;

const SETTINGS_KEY: &str = "settings";

/// Display language for the gamification labels the engine itself carries
/// (streak titles, achievement names, milestone messages).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ru,
}

/// Daily reminder window and prompt spacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSchedule {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_start_hour")]
    pub start_hour: u32,
    #[serde(default)]
    pub start_minute: u32,
    #[serde(default = "default_end_hour")]
    pub end_hour: u32,
    #[serde(default)]
    pub end_minute: u32,
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,
}

impl ReminderSchedule {
    /// Window start as minutes since local midnight.
    pub fn start_minutes(&self) -> u32 {
        self.start_hour * 60 + self.start_minute
    }

    /// Window end as minutes since local midnight.
    pub fn end_minutes(&self) -> u32 {
        self.end_hour * 60 + self.end_minute
    }

    /// Window bounds must be expressible in minutes 0-1439 and the
    /// interval must be positive while reminders are enabled.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.start_hour > 23 {
            return Err(ValidationError::WindowOutOfRange {
                field: "startHour",
                value: self.start_hour,
            });
        }
        if self.end_hour > 23 {
            return Err(ValidationError::WindowOutOfRange {
                field: "endHour",
                value: self.end_hour,
            });
        }
        if self.start_minute > 59 {
            return Err(ValidationError::WindowOutOfRange {
                field: "startMinute",
                value: self.start_minute,
            });
        }
        if self.end_minute > 59 {
            return Err(ValidationError::WindowOutOfRange {
                field: "endMinute",
                value: self.end_minute,
            });
        }
        if self.enabled && self.interval_minutes == 0 {
            return Err(ValidationError::NonPositiveInterval);
        }
        Ok(())
    }
}

impl Default for ReminderSchedule {
    fn default() -> Self {
        Self {
            enabled: false,
            start_hour: default_start_hour(),
            start_minute: 0,
            end_hour: default_end_hour(),
            end_minute: 0,
            interval_minutes: default_interval_minutes(),
        }
    }
}

/// How many ml each caffeine serving adds to the effective daily goal.
///
/// A penalty raises the goal; it never subtracts from logged progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaffeineSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_penalty_ml")]
    pub tea_penalty_ml: u32,
    #[serde(default = "default_penalty_ml")]
    pub coffee_penalty_ml: u32,
}

impl Default for CaffeineSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            tea_penalty_ml: default_penalty_ml(),
            coffee_penalty_ml: default_penalty_ml(),
        }
    }
}

/// Application settings singleton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default = "default_daily_goal")]
    pub daily_goal: u32,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub onboarding_complete: bool,
    #[serde(default)]
    pub reminder_schedule: ReminderSchedule,
    /// Older stores predate caffeine tracking; absent config falls back
    /// to the defaults.
    #[serde(default)]
    pub caffeine_settings: CaffeineSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            daily_goal: default_daily_goal(),
            language: Language::En,
            onboarding_complete: false,
            reminder_schedule: ReminderSchedule::default(),
            caffeine_settings: CaffeineSettings::default(),
        }
    }
}

impl AppSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.daily_goal == 0 {
            return Err(ValidationError::NonPositiveGoal(self.daily_goal));
        }
        self.reminder_schedule.validate()
    }
}

// Default functions
fn default_daily_goal() -> u32 {
    2000
}
fn default_start_hour() -> u32 {
    9
}
fn default_end_hour() -> u32 {
    22
}
fn default_interval_minutes() -> u32 {
    120
}
fn default_penalty_ml() -> u32 {
    250
}
fn default_true() -> bool {
    true
}

/// Partial settings update. `None` fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub daily_goal: Option<u32>,
    pub language: Option<Language>,
    pub onboarding_complete: Option<bool>,
    pub reminder_schedule: Option<ReminderSchedule>,
    pub caffeine_settings: Option<CaffeineSettings>,
}

impl SettingsUpdate {
    fn apply(&self, current: &AppSettings) -> AppSettings {
        AppSettings {
            daily_goal: self.daily_goal.unwrap_or(current.daily_goal),
            language: self.language.unwrap_or(current.language),
            onboarding_complete: self
                .onboarding_complete
                .unwrap_or(current.onboarding_complete),
            reminder_schedule: self
                .reminder_schedule
                .clone()
                .unwrap_or_else(|| current.reminder_schedule.clone()),
            caffeine_settings: self
                .caffeine_settings
                .clone()
                .unwrap_or_else(|| current.caffeine_settings.clone()),
        }
    }
}

/// In-memory view over the persisted settings singleton.
///
/// Loaded once at startup; writes go to storage first and only then
/// replace the in-memory value, so a failed write never leaves the two
/// out of sync.
#[derive(Debug)]
pub struct SettingsStore {
    current: AppSettings,
}

impl SettingsStore {
    /// Load settings from storage, default-initializing if absent.
    pub fn load(db: &Database) -> Result<Self, DatabaseError> {
        let current = match db.kv_get(SETTINGS_KEY)? {
            Some(json) => serde_json::from_str(&json).map_err(|e| {
                DatabaseError::CorruptRecord {
                    key: SETTINGS_KEY.to_string(),
                    message: e.to_string(),
                }
            })?,
            None => AppSettings::default(),
        };
        Ok(Self { current })
    }

    pub fn current(&self) -> &AppSettings {
        &self.current
    }

    /// Merge a partial update over the current settings, validate the
    /// result, persist it and return the new value.
    pub fn update(
        &mut self,
        db: &Database,
        update: &SettingsUpdate,
    ) -> Result<&AppSettings, crate::error::CoreError> {
        let merged = update.apply(&self.current);
        merged.validate()?;
        self.save_value(db, &merged)?;
        self.current = merged;
        Ok(&self.current)
    }

    /// Drop back to defaults in memory without reseeding storage.
    ///
    /// Used after a data reset: storage stays empty until the next update.
    pub fn reset_to_defaults(&mut self) {
        self.current = AppSettings::default();
    }

    /// Persist an explicit settings value (import path).
    pub fn replace(
        &mut self,
        db: &Database,
        settings: AppSettings,
    ) -> Result<(), DatabaseError> {
        self.save_value(db, &settings)?;
        self.current = settings;
        Ok(())
    }

    fn save_value(&self, db: &Database, value: &AppSettings) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(value).map_err(|e| DatabaseError::CorruptRecord {
            key: SETTINGS_KEY.to_string(),
            message: e.to_string(),
        })?;
        db.kv_set(SETTINGS_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_first_run() {
        let s = AppSettings::default();
        assert_eq!(s.daily_goal, 2000);
        assert_eq!(s.language, Language::En);
        assert!(!s.onboarding_complete);
        assert!(!s.reminder_schedule.enabled);
        assert_eq!(s.reminder_schedule.start_minutes(), 9 * 60);
        assert_eq!(s.reminder_schedule.end_minutes(), 22 * 60);
        assert_eq!(s.reminder_schedule.interval_minutes, 120);
        assert!(s.caffeine_settings.enabled);
        assert_eq!(s.caffeine_settings.tea_penalty_ml, 250);
        assert_eq!(s.caffeine_settings.coffee_penalty_ml, 250);
    }

    #[test]
    fn load_absent_returns_defaults() {
        let db = Database::open_memory().unwrap();
        let store = SettingsStore::load(&db).unwrap();
        assert_eq!(*store.current(), AppSettings::default());
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let db = Database::open_memory().unwrap();
        let mut store = SettingsStore::load(&db).unwrap();
        let update = SettingsUpdate {
            daily_goal: Some(2500),
            ..Default::default()
        };
        store.update(&db, &update).unwrap();
        assert_eq!(store.current().daily_goal, 2500);
        assert_eq!(store.current().language, Language::En);

        // Survives a reload.
        let reloaded = SettingsStore::load(&db).unwrap();
        assert_eq!(reloaded.current().daily_goal, 2500);
    }

    #[test]
    fn zero_goal_rejected_without_partial_write() {
        let db = Database::open_memory().unwrap();
        let mut store = SettingsStore::load(&db).unwrap();
        let update = SettingsUpdate {
            daily_goal: Some(0),
            language: Some(Language::Ru),
            ..Default::default()
        };
        assert!(store.update(&db, &update).is_err());
        // Neither field changed.
        assert_eq!(store.current().daily_goal, 2000);
        assert_eq!(store.current().language, Language::En);
        assert!(db.kv_get("settings").unwrap().is_none());
    }

    #[test]
    fn schedule_bounds_validated() {
        let mut schedule = ReminderSchedule::default();
        schedule.start_hour = 24;
        assert!(schedule.validate().is_err());

        let mut schedule = ReminderSchedule::default();
        schedule.enabled = true;
        schedule.interval_minutes = 0;
        assert!(schedule.validate().is_err());

        let mut schedule = ReminderSchedule::default();
        schedule.end_hour = 23;
        schedule.end_minute = 59;
        assert!(schedule.validate().is_ok());
    }

    #[test]
    fn settings_missing_caffeine_block_deserializes() {
        // Document written before caffeine tracking existed.
        let json = r#"{"dailyGoal":1800,"language":"ru","onboardingComplete":true,
            "reminderSchedule":{"enabled":true,"startHour":8,"startMinute":30,
            "endHour":21,"endMinute":0,"intervalMinutes":90}}"#;
        let s: AppSettings = serde_json::from_str(json).unwrap();
        assert_eq!(s.daily_goal, 1800);
        assert_eq!(s.language, Language::Ru);
        assert!(s.caffeine_settings.enabled);
        assert_eq!(s.caffeine_settings.coffee_penalty_ml, 250);
    }
}
