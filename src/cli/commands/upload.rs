//! `huntr-notion upload` command - Create Notion pages from a Huntr CSV export

use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::json;
use std::path::PathBuf;

use crate::cli::helpers::{connect, load_config, retry_policy, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::{Decoration, Icon, MappedRecord};
use crate::import::{read_export, FixedIconUrl, MapOptions, RecordMapper};
use crate::notion::diagnostics::{drop_existing, existing_entries};
use crate::notion::{PageRequest, UploadDriver, UploadResult};

#[derive(clap::Args, Debug)]
pub struct UploadArgs {
    /// Huntr CSV export to upload
    pub file: PathBuf,

    /// Give every page a random emoji icon
    #[arg(long)]
    pub emoji: bool,

    /// Give every page an external icon (requires --icon-url; --emoji wins if both are set)
    #[arg(long)]
    pub external: bool,

    /// Icon URL used by --external
    #[arg(long, value_name = "URL")]
    pub icon_url: Option<String>,

    /// Only upload rows from this board (repeatable)
    #[arg(long = "board", value_name = "NAME")]
    pub boards: Vec<String>,

    /// Base delay in seconds before a retry (grows linearly per attempt)
    #[arg(long, value_name = "SECS")]
    pub delay: Option<f64>,

    /// Attempts per record before the batch is aborted
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Map rows and print the request bodies without calling the API
    #[arg(long)]
    pub dry_run: bool,

    /// Skip applications whose company and position already exist in the database
    #[arg(long)]
    pub skip_existing: bool,
}

pub fn run(args: UploadArgs, global: &GlobalOpts) -> Result<()> {
    let mut config = load_config(global)?;
    if args.delay.is_some() {
        config.delay_secs = args.delay;
    }
    if args.max_retries.is_some() {
        config.max_retries = args.max_retries;
    }
    config.validate()?;

    let rows = read_export(&args.file)?;

    let options = MapOptions {
        decoration: Decoration::from_flags(args.emoji, args.external),
        boards: (!args.boards.is_empty()).then(|| args.boards.clone()),
    };
    if args.emoji && args.external {
        tracing::warn!("both --emoji and --external given; using emoji icons");
    }
    let mut mapper = RecordMapper::new(options);
    if let Some(url) = &args.icon_url {
        mapper = mapper.with_resolver(FixedIconUrl(url.clone()));
    }
    let records = mapper.map_rows(&rows)?;

    let human = global.format == OutputFormat::Auto && !global.quiet;
    if human {
        println!(
            "{} Uploading {} of {} row(s) from {}{}",
            style("→").blue(),
            style(records.len()).cyan(),
            rows.len(),
            style(args.file.display()).yellow(),
            if args.dry_run {
                style(" (dry run)").dim().to_string()
            } else {
                String::new()
            }
        );
        println!();
    }

    if args.dry_run {
        return print_dry_run(&records, config.database_id.as_deref(), global.format);
    }

    let (credentials, client) = connect(&config)?;

    let mut skipped_existing = 0;
    let records = if args.skip_existing {
        let existing = existing_entries(&client)?;
        let (kept, dropped) = drop_existing(records, &existing);
        skipped_existing = dropped;
        if human && dropped > 0 {
            println!(
                "{} Skipping {} application(s) already in the database",
                style("○").dim(),
                dropped
            );
        }
        kept
    } else {
        records
    };

    let total = records.len();
    let mut driver = UploadDriver::new(&client, credentials.database_id.clone(), retry_policy(&config));
    let outcome = driver.upload_with(&records, |index, record, result| {
        if human {
            print_progress(index, total, record, result);
        }
    });

    match outcome {
        Ok(report) => {
            match global.format {
                OutputFormat::Json => {
                    let summary = json!({
                        "rows": rows.len(),
                        "created": report.created(),
                        "retried": report.retried(),
                        "attempts": report.total_attempts(),
                        "skipped_existing": skipped_existing,
                    });
                    println!("{}", serde_json::to_string_pretty(&summary).into_diagnostic()?);
                }
                OutputFormat::Tsv => {
                    println!(
                        "{}\t{}\t{}\t{}",
                        rows.len(),
                        report.created(),
                        report.retried(),
                        skipped_existing
                    );
                }
                OutputFormat::Auto if !global.quiet => {
                    println!();
                    println!("{}", style("─".repeat(50)).dim());
                    println!("{}", style("Upload Summary").bold());
                    println!("{}", style("─".repeat(50)).dim());
                    println!("  Rows read:        {}", style(rows.len()).cyan());
                    println!("  Pages created:    {}", style(report.created()).green());
                    if report.retried() > 0 {
                        println!("  Needed retries:   {}", style(report.retried()).yellow());
                    }
                    if skipped_existing > 0 {
                        println!("  Already present:  {}", style(skipped_existing).dim());
                    }
                }
                OutputFormat::Auto => {}
            }
            Ok(())
        }
        Err(failure) => {
            if human {
                println!();
                println!(
                    "{} {} page(s) created before the failure",
                    style("!").red(),
                    failure.completed.len()
                );
            }
            Err(failure.into())
        }
    }
}

fn print_progress(index: usize, total: usize, record: &MappedRecord, result: &UploadResult) {
    let label = format!(
        "{} - {}",
        truncate_str(&record.company, 30),
        truncate_str(&record.position, 40)
    );
    match result {
        UploadResult::Succeeded { attempts } => {
            let retries = if *attempts > 1 {
                style(format!(" ({attempts} attempts)")).yellow().to_string()
            } else {
                String::new()
            };
            println!(
                "{} [{}/{}] Created {} [{}]{}",
                style("✓").green(),
                index + 1,
                total,
                style(label).cyan(),
                record.status,
                retries
            );
        }
        UploadResult::Failed { attempts } => {
            eprintln!(
                "{} [{}/{}] Failed {} after {} attempt(s)",
                style("✗").red(),
                index + 1,
                total,
                style(label).cyan(),
                attempts
            );
        }
    }
}

fn print_dry_run(
    records: &[MappedRecord],
    database_id: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let database_id = database_id.unwrap_or("<database_id>");

    match format {
        OutputFormat::Json => {
            let pages: Vec<PageRequest> = records
                .iter()
                .map(|r| PageRequest::new(database_id, r))
                .collect();
            println!("{}", serde_json::to_string_pretty(&pages).into_diagnostic()?);
        }
        OutputFormat::Tsv => {
            for record in records {
                println!("{}\t{}\t{}", record.company, record.position, record.status);
            }
        }
        OutputFormat::Auto => {
            for (index, record) in records.iter().enumerate() {
                let icon = match &record.icon {
                    Some(Icon::Emoji { emoji }) => format!(" {emoji}"),
                    Some(Icon::External { external }) => {
                        format!(" <{}>", external.url)
                    }
                    None => String::new(),
                };
                println!(
                    "{} [{}/{}] Would create {} - {} [{}]{}",
                    style("○").dim(),
                    index + 1,
                    records.len(),
                    style(truncate_str(&record.company, 30)).cyan(),
                    truncate_str(&record.position, 40),
                    record.status,
                    icon
                );
            }
            println!();
            println!(
                "{}",
                style("Dry run complete. No pages were created.").yellow()
            );
        }
    }

    Ok(())
}
