use bewet_core::{Engine, Language, SettingsUpdate};
use clap::{Args, Subcommand, ValueEnum};

#[derive(Clone, Copy, ValueEnum)]
pub enum LanguageArg {
    En,
    Ru,
}

impl From<LanguageArg> for Language {
    fn from(lang: LanguageArg) -> Self {
        match lang {
            LanguageArg::En => Language::En,
            LanguageArg::Ru => Language::Ru,
        }
    }
}

#[derive(Args)]
pub struct SetArgs {
    /// Daily goal in ml
    #[arg(long)]
    goal: Option<u32>,
    #[arg(long)]
    language: Option<LanguageArg>,
    #[arg(long)]
    onboarded: Option<bool>,
    #[arg(long)]
    reminders: Option<bool>,
    #[arg(long)]
    start_hour: Option<u32>,
    #[arg(long)]
    start_minute: Option<u32>,
    #[arg(long)]
    end_hour: Option<u32>,
    #[arg(long)]
    end_minute: Option<u32>,
    /// Minutes between reminder prompts
    #[arg(long)]
    interval: Option<u32>,
    #[arg(long)]
    caffeine: Option<bool>,
    /// ml added to the goal per tea serving
    #[arg(long)]
    tea_penalty: Option<u32>,
    /// ml added to the goal per coffee serving
    #[arg(long)]
    coffee_penalty: Option<u32>,
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Current settings
    Show,
    /// Update one or more settings fields
    Set(SetArgs),
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = Engine::open()?;

    match action {
        SettingsAction::Show => {
            println!("{}", serde_json::to_string_pretty(engine.settings())?);
        }
        SettingsAction::Set(args) => {
            let current = engine.settings().clone();

            let schedule_touched = args.reminders.is_some()
                || args.start_hour.is_some()
                || args.start_minute.is_some()
                || args.end_hour.is_some()
                || args.end_minute.is_some()
                || args.interval.is_some();
            let reminder_schedule = schedule_touched.then(|| {
                let mut s = current.reminder_schedule.clone();
                if let Some(v) = args.reminders {
                    s.enabled = v;
                }
                if let Some(v) = args.start_hour {
                    s.start_hour = v;
                }
                if let Some(v) = args.start_minute {
                    s.start_minute = v;
                }
                if let Some(v) = args.end_hour {
                    s.end_hour = v;
                }
                if let Some(v) = args.end_minute {
                    s.end_minute = v;
                }
                if let Some(v) = args.interval {
                    s.interval_minutes = v;
                }
                s
            });

            let caffeine_touched = args.caffeine.is_some()
                || args.tea_penalty.is_some()
                || args.coffee_penalty.is_some();
            let caffeine_settings = caffeine_touched.then(|| {
                let mut c = current.caffeine_settings.clone();
                if let Some(v) = args.caffeine {
                    c.enabled = v;
                }
                if let Some(v) = args.tea_penalty {
                    c.tea_penalty_ml = v;
                }
                if let Some(v) = args.coffee_penalty {
                    c.coffee_penalty_ml = v;
                }
                c
            });

            let updated = engine.update_settings(&SettingsUpdate {
                daily_goal: args.goal,
                language: args.language.map(Into::into),
                onboarding_complete: args.onboarded,
                reminder_schedule,
                caffeine_settings,
            })?;
            println!("{}", serde_json::to_string_pretty(&updated)?);
        }
    }
    Ok(())
}
