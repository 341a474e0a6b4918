pub mod adf;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod extractor;
pub mod models;
pub mod report;
pub mod window;
pub mod worklogs;

pub use client::{Auth, JiraClient, JiraConfig, RetryPolicy};
pub use error::{Error, Result};
pub use models::*;

// Config re-exports
pub use cli::Args;
pub use config::{AppConfig, DEFAULT_MAX_WORKERS, DEFAULT_SOW_FIELD_ID};

// Extraction re-exports
pub use extractor::{IssueOutcome, run_extraction};
pub use window::{DateWindow, month_bounds, parse_config_date};
pub use worklogs::fetch_worklogs_for_issue;

// Normalization re-exports
pub use adf::{adf_to_text, numeric_only, sow_code, stringify_sow};

// Report re-exports
pub use report::{CsvReportWriter, ReportPaths, ReportRow, ReportWriter, default_out_name};
