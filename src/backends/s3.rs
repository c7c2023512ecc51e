use super::{ObjectStore, ObjectUpload};
use crate::error::{ReportError, ReportResult};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

/// Metadata key the body checksum is stored under
pub const CHECKSUM_METADATA_KEY: &str = "sha256";

/// Amazon S3 object store
pub struct S3Store {
    client: Client,
}

impl S3Store {
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
impl ObjectStore for S3Store {
    async fn put_object(&self, upload: ObjectUpload) -> ReportResult<()> {
        if upload.bucket.trim().is_empty() {
            return Err(ReportError::UploadFailed("bucket name is empty".to_string()));
        }

        let mut request = self
            .client
            .put_object()
            .bucket(&upload.bucket)
            .key(&upload.key)
            .content_type(&upload.content_type)
            .body(ByteStream::from(upload.body));

        if let Some(sha256) = upload.sha256 {
            request = request.metadata(CHECKSUM_METADATA_KEY, sha256);
        }

        request.send().await.map_err(|e| {
            ReportError::UploadFailed(format!(
                "s3://{}/{}: {}",
                upload.bucket,
                upload.key,
                DisplayErrorContext(&e)
            ))
        })?;

        Ok(())
    }
}
