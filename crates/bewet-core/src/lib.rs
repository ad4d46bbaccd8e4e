//! # BeWet Core Library
//!
//! This library provides the state and derivation engine behind the BeWet
//! hydration tracker. It implements a CLI-first philosophy where every
//! operation is available via a standalone CLI binary, with any GUI being
//! a thin presentation layer over the same core library.
//!
//! ## Architecture
//!
//! - **Ledgers**: Day-keyed water and caffeine entry collections with
//!   in-memory mirrors of today and the trailing week
//! - **Trackers**: Streak, achievement and reminder state machines over
//!   persisted kv singletons
//! - **Storage**: SQLite-backed record store with versioned migrations
//! - **Engine**: The composition root wiring everything together and
//!   emitting [`Event`]s for each mutation
//!
//! All calendar-day judgements use LOCAL day keys; persisted instants are
//! UTC epoch milliseconds. Temporal entry points come in pairs: a wall
//! clock convenience and an `*_at(now)` form that tests drive directly.
//!
//! ## Key Components
//!
//! - [`Engine`]: Mutation entry points and derived views
//! - [`Database`]: Entry collections and kv singleton persistence
//! - [`AppSettings`]: The settings singleton with partial updates
//! - [`Event`]: Outcome stream rendered by hosts

pub mod achievements;
pub mod caffeine;
pub mod clock;
pub mod engine;
pub mod error;
pub mod events;
pub mod hydration;
pub mod milestones;
pub mod reminders;
pub mod settings;
pub mod storage;
pub mod streak;

pub use achievements::{Achievement, AchievementId, AchievementState, ACHIEVEMENTS};
pub use caffeine::{effective_goal, CaffeineEntry, CaffeineKind};
pub use engine::{Engine, ExportDocument, EXPORT_VERSION};
pub use error::{CoreError, DatabaseError, ImportError, Result, ValidationError};
pub use events::Event;
pub use hydration::{progress_percentage, DailySummary, HydrationEntry};
pub use milestones::{check_milestone_crossed, next_milestone, Milestone};
pub use reminders::{schedule_times, ReminderCheck, ReminderRuntimeState};
pub use settings::{AppSettings, CaffeineSettings, Language, ReminderSchedule, SettingsUpdate};
pub use storage::Database;
pub use streak::{streak_level, StreakLevel, StreakState};
