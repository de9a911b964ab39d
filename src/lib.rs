//! huntr-notion
//!
//! Uploads a Huntr job-application export (CSV) into a Notion database, one
//! page per application, with optional emoji or external icons.

pub mod cli;
pub mod core;
pub mod entities;
pub mod import;
pub mod notion;
