//! Map export rows onto Notion records

use miette::Diagnostic;
use rand::Rng;
use thiserror::Error;
use tracing::debug;

use crate::entities::{Decoration, Icon, MappedRecord, SourceRow};
use crate::import::icon::{IconGenerationError, IconSelector};

#[derive(Debug, Error, Diagnostic)]
pub enum MappingError {
    #[error("cannot capitalize an empty value")]
    #[diagnostic(code(huntr_notion::mapping::empty_value))]
    EmptyValue,

    #[error("Row {line}: listName is empty, cannot derive a status")]
    #[diagnostic(
        code(huntr_notion::mapping::empty_status),
        help("every exported application must sit in a Huntr list")
    )]
    EmptyStatus { line: usize },

    #[error("Row {line}: icon URL resolver returned no URL")]
    #[diagnostic(code(huntr_notion::mapping::no_icon_url))]
    NoIconUrl { line: usize },

    #[error("External icons are not supported without an icon URL resolver")]
    #[diagnostic(
        code(huntr_notion::mapping::not_supported),
        help("pass --icon-url <URL>, or use --emoji instead")
    )]
    NotSupported,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Icon(#[from] IconGenerationError),
}

/// Supplies external icon URLs for rows
pub trait IconUrlResolver {
    fn icon_url(&self, row: &SourceRow) -> Option<String>;
}

/// Resolver that hands every row the same URL
#[derive(Debug, Clone)]
pub struct FixedIconUrl(pub String);

impl IconUrlResolver for FixedIconUrl {
    fn icon_url(&self, _row: &SourceRow) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Mapping options
#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    pub decoration: Decoration,
    /// Only rows on these boards are kept; `None` keeps every row
    pub boards: Option<Vec<String>>,
}

/// Turns [`SourceRow`]s into [`MappedRecord`]s
pub struct RecordMapper<R> {
    options: MapOptions,
    selector: IconSelector<R>,
    resolver: Option<Box<dyn IconUrlResolver>>,
}

impl RecordMapper<rand::rngs::ThreadRng> {
    pub fn new(options: MapOptions) -> Self {
        Self::with_selector(options, IconSelector::from_thread_rng())
    }
}

impl<R: Rng> RecordMapper<R> {
    pub fn with_selector(options: MapOptions, selector: IconSelector<R>) -> Self {
        Self {
            options,
            selector,
            resolver: None,
        }
    }

    /// Set the resolver used for [`Decoration::External`]
    pub fn with_resolver(mut self, resolver: impl IconUrlResolver + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Map one row; `Ok(None)` means the row was filtered out by board
    pub fn map_row(&mut self, row: &SourceRow) -> Result<Option<MappedRecord>, MappingError> {
        if let Some(boards) = &self.options.boards {
            if !row.on_board(boards) {
                debug!(line = row.line, board = ?row.board_name, "row skipped by board filter");
                return Ok(None);
            }
        }

        let status = capitalize_first_letter(&row.list_name)
            .map_err(|_| MappingError::EmptyStatus { line: row.line })?;

        let icon = match self.options.decoration {
            Decoration::None => None,
            Decoration::Emoji => Some(Icon::emoji(self.selector.next_glyph()?)),
            Decoration::External => {
                let resolver = self.resolver.as_ref().ok_or(MappingError::NotSupported)?;
                let url = resolver
                    .icon_url(row)
                    .ok_or(MappingError::NoIconUrl { line: row.line })?;
                Some(Icon::external(url))
            }
        };

        Ok(Some(MappedRecord {
            company: row.company_name.clone(),
            position: row.title.clone(),
            status,
            icon,
        }))
    }

    /// Map all rows in order, dropping rows filtered by board
    pub fn map_rows(&mut self, rows: &[SourceRow]) -> Result<Vec<MappedRecord>, MappingError> {
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(record) = self.map_row(row)? {
                records.push(record);
            }
        }
        debug!(
            rows = rows.len(),
            records = records.len(),
            decoration = %self.options.decoration,
            "rows mapped"
        );
        Ok(records)
    }
}

/// Upper-case the first character, leaving the rest untouched
pub fn capitalize_first_letter(value: &str) -> Result<String, MappingError> {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => Ok(first.to_uppercase().chain(chars).collect()),
        None => Err(MappingError::EmptyValue),
    }
}
