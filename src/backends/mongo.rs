use super::DocumentSource;
use crate::config::SourceConfig;
use crate::error::{ReportError, ReportResult};
use crate::record::{RecordFilter, RecordSet};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::Document;
use mongodb::options::{ClientOptions, Tls, TlsOptions};
use mongodb::Client;

const APP_NAME: &str = "mongo-report";

/// MongoDB-backed document source
///
/// A fresh client is opened for every fetch and shut down once the cursor is drained.
pub struct MongoSource {
    config: SourceConfig,
}

impl MongoSource {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    async fn connect(&self) -> ReportResult<Client> {
        if self.config.uri.trim().is_empty() {
            return Err(ReportError::SourceUnavailable(
                "connection string is empty".to_string(),
            ));
        }

        let mut options = ClientOptions::parse(self.config.uri.as_str()).await?;
        options.app_name = Some(APP_NAME.to_string());
        options.tls = Some(Tls::Enabled(
            TlsOptions::builder()
                .allow_invalid_certificates(self.config.tls_allow_invalid_certificates)
                .build(),
        ));

        Ok(Client::with_options(options)?)
    }
}

#[async_trait]
impl DocumentSource for MongoSource {
    async fn fetch(&self, filter: &RecordFilter) -> ReportResult<RecordSet> {
        let client = self.connect().await?;

        let documents = {
            let collection = client
                .database(&self.config.database)
                .collection::<Document>(&self.config.collection);
            read_all(&collection, filter).await
        };

        // Cursor and collection handles are gone by now, so shutdown does not wait on them
        client.shutdown().await;

        Ok(RecordSet::from(documents?))
    }

    fn describe(&self) -> String {
        format!(
            "mongodb {}.{}",
            self.config.database, self.config.collection
        )
    }
}

async fn read_all(
    collection: &mongodb::Collection<Document>,
    filter: &RecordFilter,
) -> ReportResult<Vec<Document>> {
    let cursor = collection.find(filter.to_document()).await?;
    let documents: Vec<Document> = cursor.try_collect().await?;
    Ok(documents)
}
