use super::NotificationPublisher;
use crate::error::{ReportError, ReportResult};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sns::error::DisplayErrorContext;
use aws_sdk_sns::Client;

/// Amazon SNS topic publisher
pub struct SnsPublisher {
    client: Client,
}

impl SnsPublisher {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationPublisher for SnsPublisher {
    async fn publish(&self, topic: &str, message: &str) -> ReportResult<Option<String>> {
        if topic.trim().is_empty() {
            return Err(ReportError::NotificationFailed(
                "topic ARN is empty".to_string(),
            ));
        }

        let output = self
            .client
            .publish()
            .topic_arn(topic)
            .message(message)
            .send()
            .await
            .map_err(|e| {
                ReportError::NotificationFailed(format!("{}: {}", topic, DisplayErrorContext(&e)))
            })?;

        Ok(output.message_id().map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_sns::config::{BehaviorVersion, Region};

    #[tokio::test]
    async fn test_empty_topic_is_notification_failed() {
        let config = aws_sdk_sns::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();
        let publisher = SnsPublisher::from_client(Client::from_conf(config));

        let result = publisher.publish("", "hello").await;
        assert!(matches!(result, Err(ReportError::NotificationFailed(_))));
    }
}
