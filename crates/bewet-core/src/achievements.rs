//! One-shot unlockable achievements.
//!
//! Unlocking is idempotent and permanent. Trigger conditions are evaluated
//! by the engine after each water add, never inside the ledger's write
//! path, so the ledger and the trigger logic stay independently testable.

use serde::{Deserialize, Serialize};

use crate::error::DatabaseError;
use crate::settings::Language;
use crate::storage::Database;

const ACHIEVEMENTS_KEY: &str = "achievements";

/// Percentage band around 100 that counts as "exactly" hitting the goal.
const PERFECTIONIST_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    FirstGlass,
    FirstGoal,
    Streak3,
    Streak7,
    Streak14,
    Streak30,
    EarlyBird,
    NightOwl,
    Perfectionist,
}

/// Static catalog entry: emoji plus localized labels.
#[derive(Debug, Clone, Copy)]
pub struct Achievement {
    pub id: AchievementId,
    pub emoji: &'static str,
    name_en: &'static str,
    name_ru: &'static str,
    description_en: &'static str,
    description_ru: &'static str,
}

impl Achievement {
    pub fn name(&self, language: Language) -> &'static str {
        match language {
            Language::En => self.name_en,
            Language::Ru => self.name_ru,
        }
    }

    pub fn description(&self, language: Language) -> &'static str {
        match language {
            Language::En => self.description_en,
            Language::Ru => self.description_ru,
        }
    }
}

pub const ACHIEVEMENTS: [Achievement; 9] = [
    Achievement {
        id: AchievementId::FirstGlass,
        emoji: "💧",
        name_en: "First Drop",
        name_ru: "Первая капля",
        description_en: "Log your first glass of water",
        description_ru: "Запиши первый стакан воды",
    },
    Achievement {
        id: AchievementId::FirstGoal,
        emoji: "🎯",
        name_en: "Goal Getter",
        name_ru: "Цель достигнута",
        description_en: "Reach your daily goal for the first time",
        description_ru: "Достигни дневную цель впервые",
    },
    Achievement {
        id: AchievementId::Streak3,
        emoji: "🔥",
        name_en: "Getting Started",
        name_ru: "Начало пути",
        description_en: "Reach a 3-day streak",
        description_ru: "Серия 3 дня",
    },
    Achievement {
        id: AchievementId::Streak7,
        emoji: "⭐",
        name_en: "Week Warrior",
        name_ru: "Недельный воин",
        description_en: "Reach a 7-day streak",
        description_ru: "Серия 7 дней",
    },
    Achievement {
        id: AchievementId::Streak14,
        emoji: "🌟",
        name_en: "Hydration Hero",
        name_ru: "Герой гидратации",
        description_en: "Reach a 14-day streak",
        description_ru: "Серия 14 дней",
    },
    Achievement {
        id: AchievementId::Streak30,
        emoji: "💎",
        name_en: "Hydration Master",
        name_ru: "Мастер гидратации",
        description_en: "Reach a 30-day streak",
        description_ru: "Серия 30 дней",
    },
    Achievement {
        id: AchievementId::EarlyBird,
        emoji: "🌅",
        name_en: "Early Bird",
        name_ru: "Ранняя пташка",
        description_en: "Log water before 7 AM",
        description_ru: "Запиши воду до 7 утра",
    },
    Achievement {
        id: AchievementId::NightOwl,
        emoji: "🌙",
        name_en: "Night Owl",
        name_ru: "Ночная сова",
        description_en: "Log water after 10 PM",
        description_ru: "Запиши воду после 22:00",
    },
    Achievement {
        id: AchievementId::Perfectionist,
        emoji: "💯",
        name_en: "Perfectionist",
        name_ru: "Перфекционист",
        description_en: "Hit exactly 100% of your goal",
        description_ru: "Достигни ровно 100% цели",
    },
];

/// Look up a catalog entry by id.
pub fn achievement(id: AchievementId) -> &'static Achievement {
    ACHIEVEMENTS
        .iter()
        .find(|a| a.id == id)
        .expect("catalog covers every id")
}

/// Persisted tracker state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementState {
    /// Unlocked ids in unlock order; uniqueness enforced by `unlock`.
    pub unlocked_ids: Vec<AchievementId>,
    /// At most one unlock awaiting UI acknowledgment.
    pub newly_unlocked: Option<AchievementId>,
}

/// Achievement tracker over the persisted flag set.
#[derive(Debug)]
pub struct AchievementTracker {
    state: AchievementState,
}

impl AchievementTracker {
    pub fn load(db: &Database) -> Result<Self, DatabaseError> {
        let state = match db.kv_get(ACHIEVEMENTS_KEY)? {
            Some(json) => {
                serde_json::from_str(&json).map_err(|e| DatabaseError::CorruptRecord {
                    key: ACHIEVEMENTS_KEY.to_string(),
                    message: e.to_string(),
                })?
            }
            None => AchievementState::default(),
        };
        Ok(Self { state })
    }

    pub fn state(&self) -> &AchievementState {
        &self.state
    }

    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.state.unlocked_ids.contains(&id)
    }

    pub fn newly_unlocked(&self) -> Option<AchievementId> {
        self.state.newly_unlocked
    }

    /// Unlock an achievement.
    ///
    /// Returns `false` without touching `newly_unlocked` when the id is
    /// already unlocked; re-triggering a condition is never an error.
    pub fn unlock(&mut self, db: &Database, id: AchievementId) -> Result<bool, DatabaseError> {
        if self.is_unlocked(id) {
            return Ok(false);
        }
        let mut new_state = self.state.clone();
        new_state.unlocked_ids.push(id);
        new_state.newly_unlocked = Some(id);
        self.save(db, new_state)?;
        Ok(true)
    }

    /// Acknowledge the pending unlock notification.
    pub fn clear_newly_unlocked(&mut self, db: &Database) -> Result<(), DatabaseError> {
        if self.state.newly_unlocked.is_none() {
            return Ok(());
        }
        let mut new_state = self.state.clone();
        new_state.newly_unlocked = None;
        self.save(db, new_state)
    }

    /// Clear all achievement state (data reset).
    pub fn reset(&mut self, db: &Database) -> Result<(), DatabaseError> {
        self.save(db, AchievementState::default())
    }

    /// Drop to defaults in memory only (storage already cleared).
    pub fn reset_to_defaults(&mut self) {
        self.state = AchievementState::default();
    }

    fn save(&mut self, db: &Database, new_state: AchievementState) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(&new_state).map_err(|e| DatabaseError::CorruptRecord {
            key: ACHIEVEMENTS_KEY.to_string(),
            message: e.to_string(),
        })?;
        db.kv_set(ACHIEVEMENTS_KEY, &json)?;
        self.state = new_state;
        Ok(())
    }
}

/// Snapshot of one water add, as seen by the trigger conditions.
#[derive(Debug, Clone, Copy)]
pub struct WaterTriggerContext {
    /// Local hour (0-23) of the entry being added.
    pub entry_hour: u32,
    /// Today's entry count before this add.
    pub entries_before: usize,
    /// Progress against the effective goal before this add, capped at 100.
    pub old_pct: f64,
    /// Progress after this add, capped at 100.
    pub new_pct: f64,
    /// Current streak after any completion recorded for this add.
    pub current_streak: u32,
}

/// Which achievements this water add qualifies for.
///
/// Pure candidate evaluation; the engine feeds each candidate through
/// `unlock`, whose idempotence makes redundant candidates harmless.
/// `FirstGlass` means the first entry logged today at evaluation time --
/// only the unlock's one-shot semantics keep it from re-firing daily.
pub fn water_trigger_candidates(ctx: &WaterTriggerContext) -> Vec<AchievementId> {
    let mut candidates = Vec::new();

    if ctx.entries_before == 0 {
        candidates.push(AchievementId::FirstGlass);
    }
    if ctx.old_pct < 100.0 && ctx.new_pct >= 100.0 {
        candidates.push(AchievementId::FirstGoal);
    }
    if ctx.entry_hour < 7 {
        candidates.push(AchievementId::EarlyBird);
    }
    if ctx.entry_hour >= 22 {
        candidates.push(AchievementId::NightOwl);
    }
    if (ctx.new_pct - 100.0).abs() <= PERFECTIONIST_TOLERANCE {
        candidates.push(AchievementId::Perfectionist);
    }
    for (threshold, id) in [
        (3, AchievementId::Streak3),
        (7, AchievementId::Streak7),
        (14, AchievementId::Streak14),
        (30, AchievementId::Streak30),
    ] {
        if ctx.current_streak >= threshold {
            candidates.push(id);
        }
    }

    candidates
}
