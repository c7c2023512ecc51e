//! Stages of the report pipeline
//!
//! 1. FetchStage - Read the matching records from the document source
//! 2. BuildStage - Turn the records into an in-memory `.xlsx` workbook
//! 3. UploadStage - Write the workbook to object storage and derive its URL
//! 4. NotifyStage - Publish the download link to the notification topic

pub mod build;
pub mod fetch;
pub mod notify;
pub mod upload;

// Re-export stages
pub use build::BuildStage;
pub use fetch::FetchStage;
pub use notify::NotifyStage;
pub use upload::{report_url, UploadStage};
