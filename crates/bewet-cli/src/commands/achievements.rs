use bewet_core::{Engine, ACHIEVEMENTS};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum AchievementsAction {
    /// Full catalog with unlock flags
    List,
    /// Acknowledge the pending unlock notification
    Ack,
}

pub fn run(action: AchievementsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = Engine::open()?;

    match action {
        AchievementsAction::List => {
            let language = engine.settings().language;
            let state = engine.achievements();
            let list: Vec<_> = ACHIEVEMENTS
                .iter()
                .map(|a| {
                    serde_json::json!({
                        "id": a.id,
                        "emoji": a.emoji,
                        "name": a.name(language),
                        "description": a.description(language),
                        "unlocked": state.unlocked_ids.contains(&a.id),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
        AchievementsAction::Ack => {
            engine.acknowledge_achievement()?;
            println!("ok");
        }
    }
    Ok(())
}
