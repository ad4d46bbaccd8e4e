use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bewet-cli", version, about = "BeWet hydration tracker CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Water logging and summaries
    Water {
        #[command(subcommand)]
        action: commands::water::WaterAction,
    },
    /// Caffeine logging
    Caffeine {
        #[command(subcommand)]
        action: commands::caffeine::CaffeineAction,
    },
    /// Settings management
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Streak state
    Streak {
        #[command(subcommand)]
        action: commands::streak::StreakAction,
    },
    /// Achievement catalog and unlocks
    Achievements {
        #[command(subcommand)]
        action: commands::achievements::AchievementsAction,
    },
    /// Reminder checks
    Reminder {
        #[command(subcommand)]
        action: commands::reminder::ReminderAction,
    },
    /// Export, import and reset
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Water { action } => commands::water::run(action),
        Commands::Caffeine { action } => commands::caffeine::run(action),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Streak { action } => commands::streak::run(action),
        Commands::Achievements { action } => commands::achievements::run(action),
        Commands::Reminder { action } => commands::reminder::run(action),
        Commands::Data { action } => commands::data::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
