//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, config::ConfigCommands, count::CountArgs, sample::SampleArgs,
    schema::SchemaArgs, upload::UploadArgs,
};

#[derive(Parser)]
#[command(name = "huntr-notion")]
#[command(author, version, about = "Upload a Huntr job-application export into a Notion database")]
#[command(long_about = "Reads a Huntr CSV export and creates one Notion database page per application, with bounded retries and optional page icons.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Config file to layer over the global one
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create one Notion page per row of a Huntr CSV export
    Upload(UploadArgs),

    /// Count the entries already in the database
    Count(CountArgs),

    /// Show the database property schema
    Schema(SchemaArgs),

    /// Create a single sample entry to check credentials and schema
    Sample(SampleArgs),

    /// Show configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Auto,
    /// JSON format (for programming)
    Json,
    /// Tab-separated values (for piping)
    Tsv,
}
