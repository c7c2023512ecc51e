use super::{NotificationConfig, ReportConfig, SourceConfig, StorageConfig};
use crate::error::{ReportError, ReportResult};
use crate::logger::LogLevel;
use crate::record::RecordFilter;

/// Builder for constructing ReportConfig instances with a fluent API
///
/// Unset fields keep the same defaults [`ReportConfig::default`] uses.
///
/// # Example
/// ```
/// use mongo_report::config::ReportConfigBuilder;
///
/// let config = ReportConfigBuilder::new()
///     .mongo_uri("mongodb://localhost:27017")
///     .bucket("reports")
///     .region("us-east-1")
///     .topic_arn("arn:aws:sns:us-east-1:123456789012:reports")
///     .build()
///     .unwrap();
///
/// assert_eq!(config.storage.object_key, "data.xlsx");
/// ```
#[derive(Debug, Default)]
pub struct ReportConfigBuilder {
    source: SourceConfig,
    storage: StorageConfig,
    notification: NotificationConfig,
    log_level: LogLevel,
}

impl ReportConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration, e.g. one read from the environment
    pub fn from_config(config: ReportConfig) -> Self {
        Self {
            source: config.source,
            storage: config.storage,
            notification: config.notification,
            log_level: config.log_level,
        }
    }

    pub fn mongo_uri(mut self, uri: impl Into<String>) -> Self {
        self.source.uri = uri.into();
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.source.database = database.into();
        self
    }

    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.source.collection = collection.into();
        self
    }

    /// Set the equality filter applied to the collection
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.source.filter = RecordFilter::new(field, value);
        self
    }

    pub fn tls_allow_invalid_certificates(mut self, allow: bool) -> Self {
        self.source.tls_allow_invalid_certificates = allow;
        self
    }

    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.storage.bucket = bucket.into();
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.storage.region = region.into();
        self
    }

    /// Set static storage credentials
    pub fn credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.storage.access_key_id = access_key_id.into();
        self.storage.secret_access_key = secret_access_key.into();
        self
    }

    pub fn object_key(mut self, key: impl Into<String>) -> Self {
        self.storage.object_key = key.into();
        self
    }

    pub fn topic_arn(mut self, topic_arn: impl Into<String>) -> Self {
        self.notification.topic_arn = topic_arn.into();
        self
    }

    pub fn message_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.notification.message_prefix = prefix.into();
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Build the ReportConfig instance
    ///
    /// Credentials and endpoints are not checked; a missing one fails the stage that uses it.
    ///
    /// # Errors
    /// Returns `ReportError::BuilderError` if a fixed part of the run is blank or malformed
    pub fn build(self) -> ReportResult<ReportConfig> {
        if self.source.database.trim().is_empty() {
            return Err(ReportError::BuilderError(
                "database name must not be empty".to_string(),
            ));
        }

        if self.source.collection.trim().is_empty() {
            return Err(ReportError::BuilderError(
                "collection name must not be empty".to_string(),
            ));
        }

        if self.source.filter.field.trim().is_empty() {
            return Err(ReportError::BuilderError(
                "filter field must not be empty".to_string(),
            ));
        }

        let key = self.storage.object_key.as_str();
        if key.trim().is_empty() {
            return Err(ReportError::BuilderError(
                "object key must not be empty".to_string(),
            ));
        }
        if key.starts_with('/') {
            return Err(ReportError::BuilderError(format!(
                "object key must be relative to the bucket: {}",
                key
            )));
        }

        Ok(ReportConfig {
            source: self.source,
            storage: self.storage,
            notification: self.notification,
            log_level: self.log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = ReportConfigBuilder::new().build().unwrap();
        assert_eq!(config.source.database, "demo");
        assert_eq!(config.source.filter, RecordFilter::default());
        assert_eq!(config.storage.object_key, "data.xlsx");
        assert!(config
            .notification
            .message_prefix
            .starts_with("Reporte generado"));
    }

    #[test]
    fn test_builder_overrides() {
        let config = ReportConfigBuilder::new()
            .mongo_uri("mongodb://localhost")
            .collection("inventory")
            .filter("category", "Music")
            .bucket("reports")
            .credentials("AKIAEXAMPLE", "secret")
            .object_key("weekly/music.xlsx")
            .log_level(LogLevel::Warn)
            .build()
            .unwrap();

        assert_eq!(config.source.collection, "inventory");
        assert_eq!(config.source.filter, RecordFilter::new("category", "Music"));
        assert_eq!(config.storage.access_key_id, "AKIAEXAMPLE");
        assert_eq!(config.storage.object_key, "weekly/music.xlsx");
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_builder_rejects_blank_object_key() {
        let result = ReportConfigBuilder::new().object_key("  ").build();
        assert!(matches!(result, Err(ReportError::BuilderError(_))));
    }

    #[test]
    fn test_builder_rejects_absolute_object_key() {
        let result = ReportConfigBuilder::new().object_key("/data.xlsx").build();
        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("relative"));
        }
    }

    #[test]
    fn test_builder_rejects_blank_filter_field() {
        let result = ReportConfigBuilder::new().filter("", "Books").build();
        assert!(matches!(result, Err(ReportError::BuilderError(_))));
    }

    #[test]
    fn test_builder_from_config() {
        let mut base = ReportConfig::default();
        base.storage.bucket = "from-env".to_string();

        let config = ReportConfigBuilder::from_config(base)
            .region("eu-west-1")
            .build()
            .unwrap();
        assert_eq!(config.storage.bucket, "from-env");
        assert_eq!(config.storage.region, "eu-west-1");
    }
}
