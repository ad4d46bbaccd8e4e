use bewet_core::Engine;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum StreakAction {
    /// Current streak state and level
    Show,
    /// Run the missed-day check and print the resulting state
    Check,
}

pub fn run(action: StreakAction) -> Result<(), Box<dyn std::error::Error>> {
    // Opening the engine runs the startup check, so a stale streak is
    // already broken by the time we read it.
    let engine = Engine::open()?;

    match action {
        StreakAction::Show | StreakAction::Check => {
            let state = engine.streak();
            let level = engine.streak_level();
            let view = serde_json::json!({
                "currentStreak": state.current_streak,
                "longestStreak": state.longest_streak,
                "lastCompletedDate": state.last_completed_date,
                "level": level,
                "emoji": level.emoji(),
                "title": level.title(engine.settings().language),
            });
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }
    Ok(())
}
