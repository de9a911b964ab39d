//! `huntr-notion schema` command - Show the database property schema

use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{connect, load_config};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::notion::describe_schema;
use crate::notion::payload::{COMPANY_PROPERTY, POSITION_PROPERTY, STATUS_PROPERTY};

#[derive(clap::Args, Debug)]
pub struct SchemaArgs {}

pub fn run(_args: SchemaArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let (_, client) = connect(&config)?;

    let schema = describe_schema(&client)?;

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&schema).into_diagnostic()?);
        }
        OutputFormat::Tsv => {
            for (name, kind) in &schema {
                println!("{name}\t{kind}");
            }
        }
        OutputFormat::Auto => {
            let mut builder = Builder::default();
            builder.push_record(["Property", "Type"]);
            for (name, kind) in &schema {
                builder.push_record([name.as_str(), kind.as_str()]);
            }
            println!("{}", builder.build().with(Style::markdown()));

            let expected = [
                (COMPANY_PROPERTY, "title"),
                (POSITION_PROPERTY, "rich_text"),
                (STATUS_PROPERTY, "status"),
            ];
            for (name, kind) in expected {
                if schema.get(name).map(String::as_str) != Some(kind) {
                    eprintln!(
                        "warning: uploads expect a '{name}' property of type '{kind}'"
                    );
                }
            }
        }
    }

    Ok(())
}
