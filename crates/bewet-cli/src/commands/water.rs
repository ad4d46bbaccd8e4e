use bewet_core::Engine;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum WaterAction {
    /// Log a water intake in ml
    Add { amount: u32 },
    /// Today's summary
    Today,
    /// Trailing 7-day overview
    Week,
    /// Today's individual entries
    List,
    /// Delete an entry by id
    Delete { id: String },
}

pub fn run(action: WaterAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = Engine::open()?;

    match action {
        WaterAction::Add { amount } => {
            let events = engine.add_water(amount)?;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        WaterAction::Today => {
            let summary = engine.today_summary()?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        WaterAction::Week => {
            let week = engine.week_overview()?;
            println!("{}", serde_json::to_string_pretty(&week)?);
        }
        WaterAction::List => {
            println!("{}", serde_json::to_string_pretty(engine.today_entries())?);
        }
        WaterAction::Delete { id } => {
            engine.delete_water(&id)?;
            println!("ok");
        }
    }
    Ok(())
}
