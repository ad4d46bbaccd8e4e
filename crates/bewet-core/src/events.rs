use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::achievements::AchievementId;
use crate::caffeine::CaffeineKind;
use crate::milestones::Milestone;

/// Every mutation the engine performs produces Events.
/// Hosts render them (toast, CLI line) in the order emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    WaterLogged {
        entry_id: String,
        amount: u32,
        today_total: u32,
        effective_goal: u32,
        progress: f64,
        at: DateTime<Utc>,
    },
    /// Today's effective goal was crossed for the first time.
    GoalReached {
        today_total: u32,
        effective_goal: u32,
        current_streak: u32,
        at: DateTime<Utc>,
    },
    MilestoneCrossed {
        milestone: Milestone,
        message: String,
        at: DateTime<Utc>,
    },
    AchievementUnlocked {
        id: AchievementId,
        at: DateTime<Utc>,
    },
    CaffeineLogged {
        entry_id: String,
        kind: CaffeineKind,
        today_penalty: u32,
        effective_goal: u32,
        at: DateTime<Utc>,
    },
}
