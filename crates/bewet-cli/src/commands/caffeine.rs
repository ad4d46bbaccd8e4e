use bewet_core::{CaffeineKind, Engine};
use clap::{Subcommand, ValueEnum};

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    Tea,
    Coffee,
}

impl From<KindArg> for CaffeineKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Tea => CaffeineKind::Tea,
            KindArg::Coffee => CaffeineKind::Coffee,
        }
    }
}

#[derive(Subcommand)]
pub enum CaffeineAction {
    /// Log one serving
    Add {
        kind: KindArg,
        #[arg(long)]
        note: Option<String>,
    },
    /// Today's servings
    List,
    /// Delete a serving by id
    Delete { id: String },
    /// Replace the note of a serving
    Note { id: String, note: String },
}

pub fn run(action: CaffeineAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = Engine::open()?;

    match action {
        CaffeineAction::Add { kind, note } => {
            let events = engine.add_caffeine(kind.into(), note)?;
            if events.is_empty() {
                println!("caffeine tracking is disabled");
            } else {
                println!("{}", serde_json::to_string_pretty(&events)?);
            }
        }
        CaffeineAction::List => {
            println!(
                "{}",
                serde_json::to_string_pretty(engine.caffeine_entries())?
            );
        }
        CaffeineAction::Delete { id } => {
            engine.delete_caffeine(&id)?;
            println!("ok");
        }
        CaffeineAction::Note { id, note } => {
            engine.update_caffeine_note(&id, &note)?;
            println!("ok");
        }
    }
    Ok(())
}
