//! `huntr-notion count` command - Count entries in the database

use console::style;
use miette::Result;
use serde_json::json;

use crate::cli::helpers::{connect, load_config};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::notion::count_entries;

#[derive(clap::Args, Debug)]
pub struct CountArgs {}

pub fn run(_args: CountArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let (credentials, client) = connect(&config)?;

    let total = count_entries(&client)?;

    match global.format {
        OutputFormat::Json => println!(
            "{}",
            json!({"database_id": credentials.database_id, "entries": total})
        ),
        OutputFormat::Tsv => println!("{total}"),
        OutputFormat::Auto => {
            if global.quiet {
                println!("{total}");
            } else {
                println!(
                    "{} {} entries in database {}",
                    style("✓").green(),
                    style(total).cyan(),
                    style(&credentials.database_id).dim()
                );
            }
        }
    }

    Ok(())
}
