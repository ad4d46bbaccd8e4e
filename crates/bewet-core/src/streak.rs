//! Consecutive-day goal-completion streak.
//!
//! The whole state machine pivots on a single `lastCompletedDate` cursor.
//! Day keys compare lexicographically in chronological order, so
//! "yesterday" and "before yesterday" checks are plain string compares.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::clock;
use crate::error::DatabaseError;
use crate::settings::Language;
use crate::storage::Database;

const STREAK_KEY: &str = "streak";

/// Persisted streak state.
///
/// Invariants: `longest_streak >= current_streak` after every mutation,
/// and `longest_streak` never decreases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_completed_date: Option<String>,
}

/// Display tier for the current streak. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakLevel {
    None,
    Sprout,
    Growing,
    Thriving,
    Master,
}

/// Classify a streak length into its display tier.
pub fn streak_level(streak: u32) -> StreakLevel {
    match streak {
        0 => StreakLevel::None,
        1..=6 => StreakLevel::Sprout,
        7..=13 => StreakLevel::Growing,
        14..=29 => StreakLevel::Thriving,
        _ => StreakLevel::Master,
    }
}

impl StreakLevel {
    pub fn emoji(&self) -> &'static str {
        match self {
            StreakLevel::None => "🌰",
            StreakLevel::Sprout => "🌱",
            StreakLevel::Growing => "🌿",
            StreakLevel::Thriving => "🌳",
            StreakLevel::Master => "💎",
        }
    }

    pub fn title(&self, language: Language) -> &'static str {
        match (self, language) {
            (StreakLevel::None, Language::En) => "Start your streak!",
            (StreakLevel::None, Language::Ru) => "Начни серию!",
            (StreakLevel::Sprout, Language::En) => "Sprout",
            (StreakLevel::Sprout, Language::Ru) => "Росток",
            (StreakLevel::Growing, Language::En) => "Growing",
            (StreakLevel::Growing, Language::Ru) => "Растёт",
            (StreakLevel::Thriving, Language::En) => "Thriving",
            (StreakLevel::Thriving, Language::Ru) => "Цветёт",
            (StreakLevel::Master, Language::En) => "Hydration Master",
            (StreakLevel::Master, Language::Ru) => "Мастер гидратации",
        }
    }
}

/// Streak tracker over the persisted cursor.
#[derive(Debug)]
pub struct StreakTracker {
    state: StreakState,
}

impl StreakTracker {
    /// Load streak state from storage, default-initializing if absent.
    pub fn load(db: &Database) -> Result<Self, DatabaseError> {
        let state = match db.kv_get(STREAK_KEY)? {
            Some(json) => {
                serde_json::from_str(&json).map_err(|e| DatabaseError::CorruptRecord {
                    key: STREAK_KEY.to_string(),
                    message: e.to_string(),
                })?
            }
            None => StreakState::default(),
        };
        Ok(Self { state })
    }

    pub fn state(&self) -> &StreakState {
        &self.state
    }

    pub fn current(&self) -> u32 {
        self.state.current_streak
    }

    pub fn level(&self) -> StreakLevel {
        streak_level(self.state.current_streak)
    }

    /// Record that the effective goal was reached today.
    ///
    /// Called by the orchestrator on the below-to-at-goal crossing.
    /// Re-entry on the same day is a no-op. A completion the day after the
    /// previous one extends the streak; any gap starts over at 1. The
    /// longest streak only ever ratchets upward.
    pub fn record_goal_completed(&mut self, db: &Database) -> Result<(), DatabaseError> {
        self.record_goal_completed_at(db, Local::now())
    }

    pub fn record_goal_completed_at(
        &mut self,
        db: &Database,
        now: DateTime<Local>,
    ) -> Result<(), DatabaseError> {
        let today = clock::day_key(now);
        if self.state.last_completed_date.as_deref() == Some(today.as_str()) {
            return Ok(());
        }
        let yesterday = clock::day_key_back(now, 1);

        let new_current = match self.state.last_completed_date.as_deref() {
            Some(last) if last == yesterday => self.state.current_streak + 1,
            _ => 1,
        };

        let new_state = StreakState {
            current_streak: new_current,
            longest_streak: self.state.longest_streak.max(new_current),
            last_completed_date: Some(today),
        };
        self.save(db, new_state)
    }

    /// Reset the running streak if a day was missed.
    ///
    /// Called on startup/resume. A cursor strictly before yesterday means
    /// the chain broke: the running count drops to 0 while the cursor and
    /// the longest streak stay untouched, so the next completion starts a
    /// fresh streak of 1.
    pub fn check_and_update(&mut self, db: &Database) -> Result<(), DatabaseError> {
        self.check_and_update_at(db, Local::now())
    }

    pub fn check_and_update_at(
        &mut self,
        db: &Database,
        now: DateTime<Local>,
    ) -> Result<(), DatabaseError> {
        let yesterday = clock::day_key_back(now, 1);
        match self.state.last_completed_date.as_deref() {
            Some(last) if last < yesterday.as_str() && self.state.current_streak != 0 => {
                let new_state = StreakState {
                    current_streak: 0,
                    ..self.state.clone()
                };
                self.save(db, new_state)
            }
            _ => Ok(()),
        }
    }

    /// Clear all streak state (data reset).
    pub fn reset(&mut self, db: &Database) -> Result<(), DatabaseError> {
        self.save(db, StreakState::default())
    }

    /// Drop to defaults in memory only (storage already cleared).
    pub fn reset_to_defaults(&mut self) {
        self.state = StreakState::default();
    }

    fn save(&mut self, db: &Database, new_state: StreakState) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(&new_state).map_err(|e| DatabaseError::CorruptRecord {
            key: STREAK_KEY.to_string(),
            message: e.to_string(),
        })?;
        db.kv_set(STREAK_KEY, &json)?;
        self.state = new_state;
        Ok(())
    }
}
