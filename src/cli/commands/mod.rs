//! Command implementations

pub mod completions;
pub mod config;
pub mod count;
pub mod sample;
pub mod schema;
pub mod upload;
