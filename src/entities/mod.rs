//! Entity type definitions
//!
//! - [`SourceRow`] - One line of a Huntr job-application export
//! - [`MappedRecord`] - A row mapped onto the Notion database schema
//! - [`Icon`] / [`Decoration`] - Optional page icon and how to pick it

pub mod application;
pub mod record;

pub use application::SourceRow;
pub use record::{Decoration, ExternalFile, Icon, MappedRecord};
