//! In-memory backends for development and testing
//!
//! None of these make network calls. Each can be told to fail, which is how the
//! pipeline's abort paths are exercised without a database or an AWS account.

use super::{DocumentSource, NotificationPublisher, ObjectStore, ObjectUpload};
use crate::error::{ReportError, ReportResult};
use crate::record::{Record, RecordFilter, RecordSet};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Document source serving a fixed list of records
///
/// The filter is honored, so records outside it are never returned.
pub struct MockSource {
    records: Vec<Record>,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl MockSource {
    pub fn new(records: impl Into<RecordSet>) -> Self {
        let records: RecordSet = records.into();
        Self {
            records: records.iter().cloned().collect(),
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A source whose every fetch fails with `SourceUnavailable`
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            failure: Some(reason.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of fetches served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentSource for MockSource {
    async fn fetch(&self, filter: &RecordFilter) -> ReportResult<RecordSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(reason) = &self.failure {
            return Err(ReportError::SourceUnavailable(reason.clone()));
        }

        Ok(RecordSet::new(
            self.records
                .iter()
                .filter(|record| filter.matches(record))
                .cloned()
                .collect(),
        ))
    }

    fn describe(&self) -> String {
        format!("in-memory source ({} records)", self.records.len())
    }
}

/// An object as it was last written
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
    pub sha256: Option<String>,
}

/// Object store keeping everything in a map keyed by `(bucket, key)`
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    failure: Option<String>,
    puts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every write fails with `UploadFailed`
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        lock(&self.objects)
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn object_count(&self) -> usize {
        lock(&self.objects).len()
    }

    /// Number of write attempts, failed ones included
    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(&self, upload: ObjectUpload) -> ReportResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);

        if let Some(reason) = &self.failure {
            return Err(ReportError::UploadFailed(reason.clone()));
        }

        lock(&self.objects).insert(
            (upload.bucket, upload.key),
            StoredObject {
                body: upload.body,
                content_type: upload.content_type,
                sha256: upload.sha256,
            },
        );
        Ok(())
    }
}

/// A message as it was published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub message: String,
}

/// Publisher that records messages instead of sending them
#[derive(Default)]
pub struct MockPublisher {
    messages: Mutex<Vec<PublishedMessage>>,
    failure: Option<String>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A publisher whose every publish fails with `NotificationFailed`
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<PublishedMessage> {
        lock(&self.messages).clone()
    }
}

#[async_trait]
impl NotificationPublisher for MockPublisher {
    async fn publish(&self, topic: &str, message: &str) -> ReportResult<Option<String>> {
        if let Some(reason) = &self.failure {
            return Err(ReportError::NotificationFailed(reason.clone()));
        }

        let mut messages = lock(&self.messages);
        messages.push(PublishedMessage {
            topic: topic.to_string(),
            message: message.to_string(),
        });
        Ok(Some(format!("mock-{}", messages.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[tokio::test]
    async fn test_mock_source_applies_filter() {
        let source = MockSource::new(vec![
            doc! { "department": "Books", "title": "A" },
            doc! { "department": "Music", "title": "B" },
            doc! { "department": "Books", "title": "C" },
        ]);

        let records = source.fetch(&RecordFilter::default()).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_source_failure() {
        let source = MockSource::failing("authentication failed");
        let result = source.fetch(&RecordFilter::default()).await;

        assert!(matches!(result, Err(ReportError::SourceUnavailable(_))));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_overwrites() {
        let store = MemoryStore::new();
        for body in [b"first".to_vec(), b"second".to_vec()] {
            store
                .put_object(ObjectUpload {
                    bucket: "reports".to_string(),
                    key: "data.xlsx".to_string(),
                    body,
                    content_type: "text/plain".to_string(),
                    sha256: None,
                })
                .await
                .unwrap();
        }

        assert_eq!(store.object_count(), 1);
        assert_eq!(store.puts(), 2);
        assert_eq!(store.get("reports", "data.xlsx").unwrap().body, b"second");
    }

    #[tokio::test]
    async fn test_memory_store_failure() {
        let store = MemoryStore::failing("connection refused");
        let result = store
            .put_object(ObjectUpload {
                bucket: "reports".to_string(),
                key: "data.xlsx".to_string(),
                body: Vec::new(),
                content_type: "text/plain".to_string(),
                sha256: None,
            })
            .await;

        assert!(matches!(result, Err(ReportError::UploadFailed(_))));
        assert_eq!(store.object_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_publisher_records_messages() {
        let publisher = MockPublisher::new();
        let id = publisher.publish("topic", "hello").await.unwrap();

        assert_eq!(id.as_deref(), Some("mock-1"));
        assert_eq!(
            publisher.messages(),
            vec![PublishedMessage {
                topic: "topic".to_string(),
                message: "hello".to_string(),
            }]
        );
    }
}
