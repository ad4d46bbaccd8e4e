//! Pull-based hydration reminders.
//!
//! No background timer runs anywhere. The host calls `check` whenever it
//! wakes up and acts on the returned due flag; the scheduler only keeps
//! enough state (`next_due_time`, `snoozed_until`, `last_shown_time`) to
//! answer that question consistently across restarts.
//!
//! One deliberate departure from the obvious "step from window start"
//! rule: when no prompt was ever shown and the check lands inside the
//! window, the next due time is the window start itself, so the first
//! prompt of a fresh install fires immediately instead of one interval
//! into the window.

use chrono::{DateTime, Days, Duration, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::clock;
use crate::error::DatabaseError;
use crate::settings::{Language, ReminderSchedule};
use crate::storage::Database;

const REMINDER_STATE_KEY: &str = "reminder_state";

const DEFAULT_SNOOZE_MINUTES: u32 = 30;

/// Persisted scheduler state, separate from the schedule in settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRuntimeState {
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub next_due_time: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub snoozed_until: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_shown_time: Option<DateTime<Utc>>,
}

/// Outcome of a reminder check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderCheck {
    pub due: bool,
    pub next_due: Option<DateTime<Local>>,
}

impl ReminderCheck {
    fn not_due() -> Self {
        Self {
            due: false,
            next_due: None,
        }
    }
}

/// Prompt text shown when a reminder is due.
pub fn reminder_message(language: Language) -> &'static str {
    match language {
        Language::En => "Time for water! 💧",
        Language::Ru => "Время пить воду! 💧",
    }
}

/// An instant on `day` at the given minutes since local midnight.
///
/// `None` when the wall time does not exist locally (DST gap).
fn local_time(day: chrono::NaiveDate, minutes: u32) -> Option<DateTime<Local>> {
    let naive = day.and_hms_opt(minutes / 60, minutes % 60, 0)?;
    Local.from_local_datetime(&naive).earliest()
}

/// Compute the next prompt instant.
///
/// Before the window start the answer is the window start. With a prior
/// prompt the answer steps one interval at a time from it until it passes
/// `now`; a step past the window end lands on tomorrow's window start.
/// With no prior prompt inside the window the answer is the window start,
/// already due.
pub fn compute_next_due(
    schedule: &ReminderSchedule,
    last_shown: Option<DateTime<Utc>>,
    now: DateTime<Local>,
) -> DateTime<Local> {
    let today = now.date_naive();
    let window_start = local_time(today, schedule.start_minutes()).unwrap_or(now);
    let window_end = local_time(today, schedule.end_minutes()).unwrap_or(now);

    if now < window_start {
        return window_start;
    }
    let base = match last_shown {
        Some(t) => t.with_timezone(&Local),
        None => return window_start,
    };

    let interval = Duration::minutes(i64::from(schedule.interval_minutes.max(1)));
    let mut next = base + interval;
    while next <= now {
        next += interval;
    }
    if next > window_end {
        local_time(today + Days::new(1), schedule.start_minutes()).unwrap_or(next)
    } else {
        next
    }
}

/// Prompt times of one day, `HH:MM`, for schedule display.
pub fn schedule_times(schedule: &ReminderSchedule) -> Vec<String> {
    if schedule.interval_minutes == 0 {
        return Vec::new();
    }
    let mut times = Vec::new();
    let mut minutes = schedule.start_minutes();
    while minutes <= schedule.end_minutes() {
        times.push(format!("{:02}:{:02}", minutes / 60, minutes % 60));
        minutes += schedule.interval_minutes;
    }
    times
}

/// Reminder scheduler over the persisted runtime state.
#[derive(Debug)]
pub struct ReminderScheduler {
    state: ReminderRuntimeState,
}

impl ReminderScheduler {
    pub fn load(db: &Database) -> Result<Self, DatabaseError> {
        let state = match db.kv_get(REMINDER_STATE_KEY)? {
            Some(json) => {
                serde_json::from_str(&json).map_err(|e| DatabaseError::CorruptRecord {
                    key: REMINDER_STATE_KEY.to_string(),
                    message: e.to_string(),
                })?
            }
            None => ReminderRuntimeState::default(),
        };
        Ok(Self { state })
    }

    pub fn state(&self) -> &ReminderRuntimeState {
        &self.state
    }

    /// Decide whether a prompt is due right now.
    ///
    /// Disabled, snoozed or out-of-window checks return not-due without
    /// touching storage. Inside the window a missing `next_due_time` is
    /// computed lazily and persisted before the due comparison.
    pub fn check(
        &mut self,
        db: &Database,
        schedule: &ReminderSchedule,
    ) -> Result<ReminderCheck, DatabaseError> {
        self.check_at(db, schedule, Local::now())
    }

    pub fn check_at(
        &mut self,
        db: &Database,
        schedule: &ReminderSchedule,
        now: DateTime<Local>,
    ) -> Result<ReminderCheck, DatabaseError> {
        if !schedule.enabled {
            return Ok(ReminderCheck::not_due());
        }
        let now_utc = now.with_timezone(&Utc);
        if let Some(snoozed_until) = self.state.snoozed_until {
            if now_utc < snoozed_until {
                return Ok(ReminderCheck::not_due());
            }
        }
        let minutes = clock::minutes_of_day(now);
        if minutes < schedule.start_minutes() || minutes > schedule.end_minutes() {
            return Ok(ReminderCheck::not_due());
        }

        let next_due = match self.state.next_due_time {
            Some(t) => t,
            None => {
                let computed = compute_next_due(schedule, self.state.last_shown_time, now)
                    .with_timezone(&Utc);
                let new_state = ReminderRuntimeState {
                    next_due_time: Some(computed),
                    ..self.state.clone()
                };
                self.save(db, new_state)?;
                computed
            }
        };

        Ok(ReminderCheck {
            due: now_utc >= next_due,
            next_due: Some(next_due.with_timezone(&Local)),
        })
    }

    /// Push the prompt back without counting it as acted upon.
    ///
    /// Keeps `next_due_time` as-is: once the snooze lapses the original
    /// due instant is still in the past and the prompt fires again.
    pub fn snooze(
        &mut self,
        db: &Database,
        minutes: Option<u32>,
    ) -> Result<(), DatabaseError> {
        self.snooze_at(db, minutes, Local::now())
    }

    pub fn snooze_at(
        &mut self,
        db: &Database,
        minutes: Option<u32>,
        now: DateTime<Local>,
    ) -> Result<(), DatabaseError> {
        let minutes = minutes.unwrap_or(DEFAULT_SNOOZE_MINUTES);
        let now_utc = now.with_timezone(&Utc);
        let new_state = ReminderRuntimeState {
            snoozed_until: Some(now_utc + Duration::minutes(i64::from(minutes))),
            last_shown_time: Some(now_utc),
            ..self.state.clone()
        };
        self.save(db, new_state)
    }

    /// Acknowledge the prompt and schedule the next one from now.
    pub fn dismiss(
        &mut self,
        db: &Database,
        schedule: &ReminderSchedule,
    ) -> Result<(), DatabaseError> {
        self.dismiss_at(db, schedule, Local::now())
    }

    pub fn dismiss_at(
        &mut self,
        db: &Database,
        schedule: &ReminderSchedule,
        now: DateTime<Local>,
    ) -> Result<(), DatabaseError> {
        let now_utc = now.with_timezone(&Utc);
        let next_due = compute_next_due(schedule, Some(now_utc), now).with_timezone(&Utc);
        let new_state = ReminderRuntimeState {
            last_shown_time: Some(now_utc),
            next_due_time: Some(next_due),
            snoozed_until: None,
        };
        self.save(db, new_state)
    }

    /// Forget the cached due instant after a schedule change.
    pub fn invalidate_next_due(&mut self, db: &Database) -> Result<(), DatabaseError> {
        if self.state.next_due_time.is_none() {
            return Ok(());
        }
        let new_state = ReminderRuntimeState {
            next_due_time: None,
            ..self.state.clone()
        };
        self.save(db, new_state)
    }

    /// Clear all runtime state (data reset).
    pub fn reset(&mut self, db: &Database) -> Result<(), DatabaseError> {
        self.save(db, ReminderRuntimeState::default())
    }

    /// Drop to defaults in memory only (storage already cleared).
    pub fn reset_to_defaults(&mut self) {
        self.state = ReminderRuntimeState::default();
    }

    fn save(&mut self, db: &Database, new_state: ReminderRuntimeState) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(&new_state).map_err(|e| DatabaseError::CorruptRecord {
            key: REMINDER_STATE_KEY.to_string(),
            message: e.to_string(),
        })?;
        db.kv_set(REMINDER_STATE_KEY, &json)?;
        self.state = new_state;
        Ok(())
    }
}
