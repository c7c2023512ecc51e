//! Recurring MongoDB report
//!
//! Reads the documents of one collection that match a fixed filter, writes them to an
//! `.xlsx` workbook, uploads the workbook to S3 and announces its download link on an
//! SNS topic. See [`report::run`].

pub mod backends;
pub mod config;
pub mod error;
pub mod logger;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod spreadsheet;

pub use config::{ReportConfig, ReportConfigBuilder};
pub use error::{ReportError, ReportResult};
pub use report::{run, run_with};
