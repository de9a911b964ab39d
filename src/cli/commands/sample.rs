//! `huntr-notion sample` command - Create one sample entry

use console::style;
use miette::Result;

use crate::cli::helpers::{connect, load_config, retry_policy};
use crate::cli::GlobalOpts;
use crate::entities::MappedRecord;
use crate::notion::UploadDriver;

#[derive(clap::Args, Debug)]
pub struct SampleArgs {
    /// Company of the sample entry
    #[arg(long, default_value = "Zed")]
    pub company: String,

    /// Position of the sample entry
    #[arg(long, default_value = "Master of Shadows")]
    pub position: String,

    /// Status option of the sample entry
    #[arg(long, default_value = "Wishlist")]
    pub status: String,
}

pub fn run(args: SampleArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let (credentials, client) = connect(&config)?;

    let record = MappedRecord {
        company: args.company,
        position: args.position,
        status: args.status,
        icon: None,
    };

    UploadDriver::new(&client, credentials.database_id, retry_policy(&config))
        .upload(std::slice::from_ref(&record))?;

    if !global.quiet {
        println!(
            "{} Sample entry added: {} - {} [{}]",
            style("✓").green(),
            style(&record.company).cyan(),
            record.position,
            record.status
        );
    }

    Ok(())
}
