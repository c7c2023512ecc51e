use crate::backends::{ObjectStore, ObjectUpload};
use crate::error::{ReportError, ReportResult};
use crate::pipeline::{PipelineContext, PipelineStage};
use crate::spreadsheet::XLSX_CONTENT_TYPE;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};
use url::Url;

/// Public address of an object in a virtual-hosted S3 bucket.
///
/// Depends only on the bucket and the key, so every run over the same configuration
/// yields the same URL.
pub fn report_url(bucket: &str, key: &str) -> ReportResult<String> {
    if bucket.trim().is_empty() {
        return Err(ReportError::UploadFailed("bucket name is empty".to_string()));
    }

    let mut url = Url::parse(&format!("https://{}.s3.amazonaws.com/", bucket))
        .map_err(|e| ReportError::UploadFailed(format!("invalid bucket '{}': {}", bucket, e)))?;

    // Each key part is a path segment, so `?` and `#` stay in the path
    url.path_segments_mut()
        .map_err(|_| ReportError::UploadFailed(format!("invalid bucket '{}'", bucket)))?
        .pop_if_empty()
        .extend(key.split('/'));

    Ok(url.to_string())
}

/// Stage that writes the workbook to object storage
///
/// # Context Requirements
/// - Input: `buffer` - serialized workbook, taken out of the context
///
/// # Context Outputs
/// - `report_url` - public address of the uploaded object
/// - metadata `sha256`
pub struct UploadStage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    key: String,
}

impl UploadStage {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

#[async_trait]
impl PipelineStage for UploadStage {
    async fn execute(&self, context: &mut PipelineContext) -> ReportResult<()> {
        let mut buffer = context.take_buffer()?;
        let url = report_url(&self.bucket, &self.key)?;

        let sha256 = buffer.sha256_hex();
        let body = buffer.read_all()?;

        info!(
            target: "pipeline::upload",
            "Uploading {} bytes to {}/{} (run: {})",
            body.len(),
            self.bucket,
            self.key,
            context.run_id()
        );

        self.store
            .put_object(ObjectUpload {
                bucket: self.bucket.clone(),
                key: self.key.clone(),
                body,
                content_type: XLSX_CONTENT_TYPE.to_string(),
                sha256: Some(sha256.clone()),
            })
            .await
            .map_err(|e| {
                error!(target: "pipeline::upload", "Error uploading file to storage: {}", e);
                e
            })?;

        info!(
            target: "pipeline::upload",
            "File uploaded successfully, {} (run: {})",
            url,
            context.run_id()
        );

        context.set_metadata("sha256", sha256);
        context.set_report_url(url);
        Ok(())
    }

    fn name(&self) -> &str {
        "Upload Report"
    }

    fn pre_execute(&self, context: &PipelineContext) -> ReportResult<()> {
        match context.buffer() {
            Some(buffer) if buffer.is_empty() => Err(ReportError::UploadFailed(
                "spreadsheet buffer is empty".to_string(),
            )),
            Some(_) => Ok(()),
            None => Err(ReportError::PipelineError(
                "Required context value not found: buffer".to_string(),
            )),
        }
    }
}
