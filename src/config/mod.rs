//! Run configuration, read once from the process environment

pub mod builder;

pub use builder::ReportConfigBuilder;

use crate::error::{ReportError, ReportResult};
use crate::logger::LogLevel;
use crate::record::RecordFilter;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable names
pub const ENV_MONGO_URI: &str = "MONGO_URI";
pub const ENV_MONGO_DATABASE: &str = "MONGO_DATABASE";
pub const ENV_MONGO_COLLECTION: &str = "MONGO_COLLECTION";
pub const ENV_MONGO_TLS_ALLOW_INVALID_CERTIFICATES: &str = "MONGO_TLS_ALLOW_INVALID_CERTIFICATES";
pub const ENV_S3_BUCKET_NAME: &str = "S3_BUCKET_NAME";
pub const ENV_AWS_REGION: &str = "AWS_REGION";
pub const ENV_AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const ENV_AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const ENV_SNS_TOPIC_ARN: &str = "SNS_TOPIC_ARN";
pub const ENV_LOG_LEVEL: &str = "REPORT_LOG_LEVEL";

/// Object key the report is written under; every run overwrites it
pub const DEFAULT_OBJECT_KEY: &str = "data.xlsx";

/// Sentence the report URL is appended to
pub const DEFAULT_MESSAGE_PREFIX: &str =
    "Reporte generado, haga clic en el siguiente link para descargarlo:";

/// Complete configuration for one report run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    pub source: SourceConfig,
    pub storage: StorageConfig,
    pub notification: NotificationConfig,
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Document database settings
#[derive(Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Connection string; may embed credentials so it is never serialized
    #[serde(skip_serializing, default)]
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub filter: RecordFilter,
    pub tls_allow_invalid_certificates: bool,
}

/// Object storage settings
#[derive(Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    #[serde(skip_serializing, default)]
    pub access_key_id: String,
    #[serde(skip_serializing, default)]
    pub secret_access_key: String,
    pub object_key: String,
}

/// Notification topic settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub topic_arn: String,
    pub message_prefix: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            database: "demo".to_string(),
            collection: "products".to_string(),
            filter: RecordFilter::default(),
            tls_allow_invalid_certificates: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            object_key: DEFAULT_OBJECT_KEY.to_string(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            topic_arn: String::new(),
            message_prefix: DEFAULT_MESSAGE_PREFIX.to_string(),
        }
    }
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("uri", &redact(&self.uri))
            .field("database", &self.database)
            .field("collection", &self.collection)
            .field("filter", &self.filter)
            .field(
                "tls_allow_invalid_certificates",
                &self.tls_allow_invalid_certificates,
            )
            .finish()
    }
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key_id", &redact(&self.access_key_id))
            .field("secret_access_key", &redact(&self.secret_access_key))
            .field("object_key", &self.object_key)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl ReportConfig {
    /// Read configuration from the process environment.
    ///
    /// Missing variables are left empty and surface later as connection or credential
    /// failures. Only malformed values are rejected here.
    pub fn from_env() -> ReportResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ReportConfig::from_env`] with an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> ReportResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).unwrap_or_default();

        let tls_allow_invalid_certificates =
            match lookup(ENV_MONGO_TLS_ALLOW_INVALID_CERTIFICATES) {
                Some(raw) => parse_bool(ENV_MONGO_TLS_ALLOW_INVALID_CERTIFICATES, &raw)?,
                None => defaults.source.tls_allow_invalid_certificates,
            };

        let log_level = match lookup(ENV_LOG_LEVEL) {
            Some(raw) => LogLevel::from_str(&raw).ok_or_else(|| {
                ReportError::ConfigError(format!("{} has unknown level '{}'", ENV_LOG_LEVEL, raw))
            })?,
            None => defaults.log_level,
        };

        Ok(Self {
            source: SourceConfig {
                uri: var(ENV_MONGO_URI),
                database: lookup(ENV_MONGO_DATABASE).unwrap_or(defaults.source.database),
                collection: lookup(ENV_MONGO_COLLECTION).unwrap_or(defaults.source.collection),
                filter: defaults.source.filter,
                tls_allow_invalid_certificates,
            },
            storage: StorageConfig {
                bucket: var(ENV_S3_BUCKET_NAME),
                region: var(ENV_AWS_REGION),
                access_key_id: var(ENV_AWS_ACCESS_KEY_ID),
                secret_access_key: var(ENV_AWS_SECRET_ACCESS_KEY),
                object_key: defaults.storage.object_key,
            },
            notification: NotificationConfig {
                topic_arn: var(ENV_SNS_TOPIC_ARN),
                message_prefix: defaults.notification.message_prefix,
            },
            log_level,
        })
    }
}

fn parse_bool(key: &str, raw: &str) -> ReportResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ReportError::ConfigError(format!(
            "{} must be a boolean, got '{}'",
            key, raw
        ))),
    }
}
