use crate::error::{ReportError, ReportResult};
use crate::pipeline::{PipelineContext, PipelineStage};
use crate::spreadsheet::Table;
use async_trait::async_trait;
use tracing::{error, info};

/// Stage that turns the fetched records into an in-memory `.xlsx` workbook
///
/// # Context Requirements
/// - Input: `records` - non-empty record set, taken out of the context
///
/// # Context Outputs
/// - `buffer` - serialized workbook, positioned at its start
/// - metadata `column_count`, `spreadsheet_bytes`
pub struct BuildStage;

impl BuildStage {
    /// Create a new build stage
    pub fn new() -> Self {
        Self
    }
}

impl Default for BuildStage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PipelineStage for BuildStage {
    async fn execute(&self, context: &mut PipelineContext) -> ReportResult<()> {
        let records = context.take_records()?;

        let table = Table::from_records(&records).map_err(|e| {
            error!(target: "pipeline::build", "Error tabulating records: {}", e);
            e
        })?;
        let buffer = table.to_xlsx().map_err(|e| {
            error!(target: "pipeline::build", "Error creating spreadsheet: {}", e);
            e
        })?;

        info!(
            target: "pipeline::build",
            "Spreadsheet created: {} rows, {} columns, {} bytes (run: {})",
            table.row_count(),
            table.columns().len(),
            buffer.len(),
            context.run_id()
        );

        context.set_metadata("column_count", table.columns().len().to_string());
        context.set_metadata("spreadsheet_bytes", buffer.len().to_string());
        context.set_buffer(buffer);
        Ok(())
    }

    fn name(&self) -> &str {
        "Build Spreadsheet"
    }

    fn pre_execute(&self, context: &PipelineContext) -> ReportResult<()> {
        match context.records() {
            Some(records) if records.is_empty() => {
                error!(target: "pipeline::build", "No data fetched from source");
                Err(ReportError::EmptyInput)
            }
            Some(_) => Ok(()),
            None => Err(ReportError::PipelineError(
                "Required context value not found: records".to_string(),
            )),
        }
    }
}
