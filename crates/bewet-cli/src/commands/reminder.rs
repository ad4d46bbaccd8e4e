use bewet_core::{schedule_times, Engine};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ReminderAction {
    /// Is a prompt due right now?
    Check,
    /// Push the current prompt back
    Snooze {
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// Acknowledge the prompt and schedule the next one
    Dismiss,
    /// Prompt times of one day under the current schedule
    Times,
}

pub fn run(action: ReminderAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = Engine::open()?;

    match action {
        ReminderAction::Check => {
            let check = engine.check_reminder()?;
            let view = serde_json::json!({
                "due": check.due,
                "nextDue": check.next_due.map(|t| t.to_rfc3339()),
            });
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        ReminderAction::Snooze { minutes } => {
            engine.snooze_reminder(minutes)?;
            println!("ok");
        }
        ReminderAction::Dismiss => {
            engine.dismiss_reminder()?;
            println!("ok");
        }
        ReminderAction::Times => {
            let times = schedule_times(&engine.settings().reminder_schedule);
            println!("{}", serde_json::to_string_pretty(&times)?);
        }
    }
    Ok(())
}
