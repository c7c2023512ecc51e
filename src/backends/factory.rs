use super::{
    DocumentSource, MemoryStore, MockPublisher, MockSource, MongoSource, NotificationPublisher,
    ObjectStore, S3Store, SnsPublisher,
};
use crate::config::{ReportConfig, StorageConfig};
use crate::record::RecordSet;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::config::Credentials;
use std::sync::Arc;

/// Provider name attached to credentials read from the environment
const CREDENTIALS_PROVIDER: &str = "report-environment";

/// The three collaborators one run needs
#[derive(Clone)]
pub struct Backends {
    pub source: Arc<dyn DocumentSource>,
    pub store: Arc<dyn ObjectStore>,
    pub publisher: Arc<dyn NotificationPublisher>,
}

/// Factory for creating backend instances
///
/// Keeps the choice of live versus in-memory collaborators in one place, so the
/// pipeline itself never names a concrete client.
pub struct BackendFactory;

impl BackendFactory {
    /// Create the live MongoDB, S3 and SNS backends
    ///
    /// Nothing is contacted here; connection and credential problems show up when a stage
    /// first uses its backend.
    pub async fn create(config: &ReportConfig) -> Backends {
        let sdk_config = Self::load_aws_config(&config.storage).await;

        Backends {
            source: Arc::new(MongoSource::new(config.source.clone())),
            store: Arc::new(S3Store::new(&sdk_config)),
            publisher: Arc::new(SnsPublisher::new(&sdk_config)),
        }
    }

    /// Create in-memory backends serving `records`
    pub fn in_memory(records: impl Into<RecordSet>) -> Backends {
        Backends {
            source: Arc::new(MockSource::new(records)),
            store: Arc::new(MemoryStore::new()),
            publisher: Arc::new(MockPublisher::new()),
        }
    }

    /// Shared AWS configuration for the storage and notification clients
    ///
    /// Explicit region and static keys win; whatever is left blank falls back to the
    /// SDK's default provider chain.
    pub async fn load_aws_config(storage: &StorageConfig) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if !storage.region.trim().is_empty() {
            loader = loader.region(Region::new(storage.region.clone()));
        }

        if !storage.access_key_id.is_empty() || !storage.secret_access_key.is_empty() {
            loader = loader.credentials_provider(Credentials::new(
                storage.access_key_id.clone(),
                storage.secret_access_key.clone(),
                None,
                None,
                CREDENTIALS_PROVIDER,
            ));
        }

        loader.load().await
    }
}
