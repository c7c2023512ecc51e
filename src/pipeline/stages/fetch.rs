use crate::backends::DocumentSource;
use crate::error::ReportResult;
use crate::pipeline::{PipelineContext, PipelineStage};
use crate::record::RecordFilter;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

/// Stage that reads the matching records from the document source
///
/// # Context Outputs
/// - `records` - every record matching the filter, in source order
/// - metadata `record_count`
pub struct FetchStage {
    source: Arc<dyn DocumentSource>,
    filter: RecordFilter,
}

impl FetchStage {
    pub fn new(source: Arc<dyn DocumentSource>, filter: RecordFilter) -> Self {
        Self { source, filter }
    }

    pub fn filter(&self) -> &RecordFilter {
        &self.filter
    }
}

#[async_trait]
impl PipelineStage for FetchStage {
    async fn execute(&self, context: &mut PipelineContext) -> ReportResult<()> {
        info!(
            target: "pipeline::fetch",
            "Fetching records from {} where {} = {:?} (run: {})",
            self.source.describe(),
            self.filter.field,
            self.filter.value,
            context.run_id()
        );

        let records = self.source.fetch(&self.filter).await.map_err(|e| {
            error!(target: "pipeline::fetch", "Error fetching data from source: {}", e);
            e
        })?;

        info!(
            target: "pipeline::fetch",
            "Fetched {} records (run: {})",
            records.len(),
            context.run_id()
        );

        context.set_metadata("record_count", records.len().to_string());
        context.set_records(records);
        Ok(())
    }

    fn name(&self) -> &str {
        "Fetch Records"
    }
}
