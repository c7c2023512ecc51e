//! External collaborators of the pipeline
//!
//! Each stage talks to the outside world through one of these traits, so the pipeline
//! can run against the live services or against the in-memory fakes in [`mock`].

pub mod factory;
pub mod mock;
pub mod mongo;
pub mod s3;
pub mod sns;

pub use factory::{BackendFactory, Backends};
pub use mock::{MemoryStore, MockPublisher, MockSource};
pub use mongo::MongoSource;
pub use s3::S3Store;
pub use sns::SnsPublisher;

use crate::error::ReportResult;
use crate::record::{RecordFilter, RecordSet};
use async_trait::async_trait;

/// Document database the records are read from
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch every document matching `filter`, in the order the source returns them
    async fn fetch(&self, filter: &RecordFilter) -> ReportResult<RecordSet>;

    /// Human readable location, for logs
    fn describe(&self) -> String;
}

/// A single object write
#[derive(Debug, Clone)]
pub struct ObjectUpload {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
    /// Hex SHA-256 of `body`, stored alongside the object
    pub sha256: Option<String>,
}

/// Key-addressed blob storage
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write the object, replacing whatever is stored under the same key
    async fn put_object(&self, upload: ObjectUpload) -> ReportResult<()>;
}

/// Pub/sub topic that accepts short text messages
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    /// Publish `message` to `topic`, returning the service's message id when it gives one
    async fn publish(&self, topic: &str, message: &str) -> ReportResult<Option<String>>;
}
