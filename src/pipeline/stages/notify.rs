use crate::backends::NotificationPublisher;
use crate::error::{ReportError, ReportResult};
use crate::pipeline::{PipelineContext, PipelineStage};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

/// Message announcing the report; the URL is appended verbatim
pub fn format_message(prefix: &str, url: &str) -> String {
    format!("{} {}", prefix, url)
}

/// Stage that publishes the download link to the notification topic
///
/// # Context Requirements
/// - Input: `report_url` - non-empty URL left by the upload stage
///
/// # Context Outputs
/// - metadata `message_id` when the service returns one
pub struct NotifyStage {
    publisher: Arc<dyn NotificationPublisher>,
    topic_arn: String,
    message_prefix: String,
}

impl NotifyStage {
    pub fn new(
        publisher: Arc<dyn NotificationPublisher>,
        topic_arn: impl Into<String>,
        message_prefix: impl Into<String>,
    ) -> Self {
        Self {
            publisher,
            topic_arn: topic_arn.into(),
            message_prefix: message_prefix.into(),
        }
    }
}

#[async_trait]
impl PipelineStage for NotifyStage {
    async fn execute(&self, context: &mut PipelineContext) -> ReportResult<()> {
        let url = context.require_report_url()?.to_string();
        let message = format_message(&self.message_prefix, &url);

        info!(
            target: "pipeline::notify",
            "Publishing notification with report URL: {} (run: {})",
            url,
            context.run_id()
        );

        let message_id = self
            .publisher
            .publish(&self.topic_arn, &message)
            .await
            .map_err(|e| {
                error!(target: "pipeline::notify", "Error publishing notification: {}", e);
                e
            })?;

        info!(
            target: "pipeline::notify",
            "Notification published successfully (message id: {}, run: {})",
            message_id.as_deref().unwrap_or("none"),
            context.run_id()
        );

        if let Some(id) = message_id {
            context.set_metadata("message_id", id);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Publish Notification"
    }

    fn pre_execute(&self, context: &PipelineContext) -> ReportResult<()> {
        if context.require_report_url()?.trim().is_empty() {
            return Err(ReportError::NotificationFailed(
                "report URL is empty".to_string(),
            ));
        }
        Ok(())
    }
}
