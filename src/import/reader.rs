//! Huntr CSV export reader

use csv::{ReaderBuilder, StringRecord};
use miette::Diagnostic;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::entities::SourceRow;

/// Columns every export must carry, as they appear in the Huntr header
pub const REQUIRED_COLUMNS: [&str; 5] = ["title", "url", "companyName", "listName", "boardName"];

/// Errors raised while reading an export file
#[derive(Debug, Error, Diagnostic)]
pub enum InputError {
    #[error("File not found: {}", path.display())]
    #[diagnostic(code(huntr_notion::input::not_found))]
    NotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    #[diagnostic(code(huntr_notion::input::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error at line {line}: {source}")]
    #[diagnostic(code(huntr_notion::input::csv))]
    Csv {
        line: usize,
        #[source]
        source: csv::Error,
    },

    #[error("Missing required column(s): {}", missing.join(", "))]
    #[diagnostic(
        code(huntr_notion::input::columns),
        help("a Huntr export needs the columns: title, url, companyName, listName, boardName")
    )]
    MissingColumns { missing: Vec<String> },
}

/// Read every row of the export at `path`, in file order
pub fn read_export(path: &Path) -> Result<Vec<SourceRow>, InputError> {
    if !path.exists() {
        return Err(InputError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    read_rows(BufReader::new(file))
}

/// Parse export rows from any reader
pub fn read_rows<R: Read>(input: R) -> Result<Vec<SourceRow>, InputError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = rdr
        .headers()
        .map_err(|source| InputError::Csv { line: 1, source })?
        .clone();
    let header_map = build_header_map(&headers);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !header_map.contains_key(&col.to_lowercase()))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(InputError::MissingColumns { missing });
    }

    let mut rows = Vec::new();
    for (row_idx, result) in rdr.records().enumerate() {
        let line = row_idx + 2; // +2 for 1-indexed and header row
        let record = result.map_err(|source| InputError::Csv { line, source })?;

        rows.push(SourceRow {
            line,
            title: get_field(&record, &header_map, "title").unwrap_or_default(),
            url: get_field(&record, &header_map, "url").unwrap_or_default(),
            company_name: get_field(&record, &header_map, "companyname").unwrap_or_default(),
            list_name: get_field(&record, &header_map, "listname").unwrap_or_default(),
            board_name: get_field(&record, &header_map, "boardname"),
        });
    }

    Ok(rows)
}

/// Build a map from lower-cased header name to column index
pub fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_lowercase().trim().to_string(), i))
        .collect()
}

/// Get a non-empty field value from a CSV record
pub fn get_field(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    field: &str,
) -> Option<String> {
    header_map
        .get(field)
        .and_then(|&idx| record.get(idx))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
