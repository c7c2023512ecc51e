use crate::error::{ReportError, ReportResult};
use crate::record::RecordSet;
use crate::spreadsheet::SpreadsheetBuffer;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Pipeline context that holds the values passed between stages
///
/// Every hand-off has its own typed slot. A consuming stage takes the value out of its
/// slot, so each intermediate value is owned by exactly one stage at a time.
///
/// # Example
/// ```
/// use mongo_report::pipeline::PipelineContext;
///
/// let mut context = PipelineContext::new("run-123");
/// context.set_report_url("https://reports.s3.amazonaws.com/data.xlsx");
///
/// assert_eq!(
///     context.report_url(),
///     Some("https://reports.s3.amazonaws.com/data.xlsx")
/// );
/// ```
#[derive(Debug)]
pub struct PipelineContext {
    /// Identifier of this pipeline execution
    run_id: String,

    started_at: DateTime<Utc>,

    /// Output of the fetch stage
    records: Option<RecordSet>,

    /// Output of the build stage
    buffer: Option<SpreadsheetBuffer>,

    /// Output of the upload stage
    report_url: Option<String>,

    /// Metadata about the pipeline execution
    metadata: HashMap<String, String>,
}

impl PipelineContext {
    /// Create a new pipeline context
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: Utc::now(),
            records: None,
            buffer: None,
            report_url: None,
            metadata: HashMap::new(),
        }
    }

    /// Create a context with a random v4 run id
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn set_records(&mut self, records: RecordSet) {
        self.records = Some(records);
    }

    pub fn records(&self) -> Option<&RecordSet> {
        self.records.as_ref()
    }

    /// Move the record set out of the context
    pub fn take_records(&mut self) -> ReportResult<RecordSet> {
        self.records.take().ok_or_else(|| missing("records"))
    }

    pub fn set_buffer(&mut self, buffer: SpreadsheetBuffer) {
        self.buffer = Some(buffer);
    }

    pub fn buffer(&self) -> Option<&SpreadsheetBuffer> {
        self.buffer.as_ref()
    }

    /// Move the spreadsheet buffer out of the context
    pub fn take_buffer(&mut self) -> ReportResult<SpreadsheetBuffer> {
        self.buffer.take().ok_or_else(|| missing("buffer"))
    }

    pub fn set_report_url(&mut self, url: impl Into<String>) {
        self.report_url = Some(url.into());
    }

    pub fn report_url(&self) -> Option<&str> {
        self.report_url.as_deref()
    }

    /// The report URL, or an error if no stage has produced one
    pub fn require_report_url(&self) -> ReportResult<&str> {
        self.report_url().ok_or_else(|| missing("report_url"))
    }

    /// Set metadata
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Get metadata
    pub fn get_metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(|s| s.as_str())
    }

    /// Get all metadata
    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }
}

fn missing(slot: &str) -> ReportError {
    ReportError::PipelineError(format!("Required context value not found: {}", slot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_context_creation() {
        let context = PipelineContext::new("run-123");
        assert_eq!(context.run_id(), "run-123");
        assert!(context.records().is_none());
        assert!(context.buffer().is_none());
        assert!(context.report_url().is_none());
    }

    #[test]
    fn test_generated_run_id_is_uuid() {
        let context = PipelineContext::generate();
        assert!(uuid::Uuid::parse_str(context.run_id()).is_ok());
    }

    #[test]
    fn test_take_records_moves_value() {
        let mut context = PipelineContext::new("run-123");
        context.set_records(RecordSet::from(vec![doc! { "title": "A" }]));

        let records = context.take_records().unwrap();
        assert_eq!(records.len(), 1);

        // Second take finds the slot empty
        assert!(matches!(
            context.take_records(),
            Err(ReportError::PipelineError(_))
        ));
    }

    #[test]
    fn test_take_buffer() {
        let mut context = PipelineContext::new("run-123");
        assert!(context.take_buffer().is_err());

        context.set_buffer(SpreadsheetBuffer::new(vec![1, 2, 3]));
        assert_eq!(context.buffer().unwrap().len(), 3);
        assert_eq!(context.take_buffer().unwrap().len(), 3);
        assert!(context.buffer().is_none());
    }

    #[test]
    fn test_require_report_url() {
        let mut context = PipelineContext::new("run-123");
        assert!(context.require_report_url().is_err());

        context.set_report_url("https://reports.s3.amazonaws.com/data.xlsx");
        assert_eq!(
            context.require_report_url().unwrap(),
            "https://reports.s3.amazonaws.com/data.xlsx"
        );
    }

    #[test]
    fn test_metadata() {
        let mut context = PipelineContext::new("run-123");
        context.set_metadata("pipeline_name", "test-pipeline");
        context.set_metadata("record_count", "2");

        assert_eq!(context.get_metadata("pipeline_name"), Some("test-pipeline"));
        assert_eq!(context.metadata().len(), 2);
    }
}
