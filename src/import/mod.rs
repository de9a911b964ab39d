//! Huntr export ingestion: read the CSV, pick icons, map rows to records

pub mod icon;
pub mod mapper;
pub mod reader;

pub use icon::{IconGenerationError, IconSelector};
pub use mapper::{
    capitalize_first_letter, FixedIconUrl, IconUrlResolver, MapOptions, MappingError,
    RecordMapper,
};
pub use reader::{read_export, InputError, REQUIRED_COLUMNS};
