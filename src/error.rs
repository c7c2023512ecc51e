use thiserror::Error;

/// Central error type for the report pipeline
#[derive(Error, Debug)]
pub enum ReportError {
    // ============================================================================
    // Pipeline Stage Errors
    // ============================================================================
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("No records fetched from source")]
    EmptyInput,

    #[error("Failed to build spreadsheet: {0}")]
    SpreadsheetFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Notification failed: {0}")]
    NotificationFailed(String),

    // ============================================================================
    // Generic/System Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Pipeline error: {0}")]
    PipelineError(String),

    /// Builder pattern validation error
    #[error("Builder error: {0}")]
    BuilderError(String),
}

impl ReportError {
    /// Short machine-friendly name of the error kind, used in run summaries
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::SourceUnavailable(_) => "source_unavailable",
            ReportError::EmptyInput => "empty_input",
            ReportError::SpreadsheetFailed(_) => "spreadsheet_failed",
            ReportError::UploadFailed(_) => "upload_failed",
            ReportError::NotificationFailed(_) => "notification_failed",
            ReportError::Io(_) => "io",
            ReportError::Json(_) => "json",
            ReportError::ConfigError(_) => "config",
            ReportError::PipelineError(_) => "pipeline",
            ReportError::BuilderError(_) => "builder",
        }
    }
}

// Every driver error (connect, auth, query) is the same failure from the pipeline's point of view
impl From<mongodb::error::Error> for ReportError {
    fn from(err: mongodb::error::Error) -> Self {
        ReportError::SourceUnavailable(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ReportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ReportError::SpreadsheetFailed(err.to_string())
    }
}

// Helper type alias for Results
pub type ReportResult<T> = Result<T, ReportError>;
