//! Notion side of the pipeline: API client, request bodies, uploads, inspection

pub mod client;
pub mod diagnostics;
pub mod payload;
pub mod upload;

pub use client::{ApiError, DatabaseInfo, NotionApi, NotionClient, QueryPage};
pub use diagnostics::{count_entries, describe_schema, existing_entries, DiagnosticsError};
pub use payload::PageRequest;
pub use upload::{BatchFailure, BatchReport, RetryPolicy, UploadDriver, UploadResult};
