use std::fs;
use std::path::PathBuf;

use bewet_core::Engine;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum DataAction {
    /// Write a full backup document
    Export {
        /// File to write; stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replace all data with a backup document
    Import { file: PathBuf },
    /// Wipe everything and return to first-run defaults
    Reset,
}

pub fn run(action: DataAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = Engine::open()?;

    match action {
        DataAction::Export { output } => {
            let doc = engine.export_data()?;
            let json = serde_json::to_string_pretty(&doc)?;
            match output {
                Some(path) => {
                    fs::write(&path, json)?;
                    println!("exported to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        DataAction::Import { file } => {
            let json = fs::read_to_string(&file)?;
            engine.import_json(&json)?;
            println!("imported {}", file.display());
        }
        DataAction::Reset => {
            engine.reset_all_data()?;
            println!("ok");
        }
    }
    Ok(())
}
