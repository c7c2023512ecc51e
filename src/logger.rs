use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Log level enum for type-safe logging configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug = 0,
    #[default]
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Filter directive for this level.
    ///
    /// The AWS SDK and the MongoDB driver are noisy at debug, so they are pinned to `warn`
    /// unless the level is already stricter than that.
    pub fn directive(&self) -> String {
        let level = self.as_str();
        if *self >= LogLevel::Warn {
            level.to_string()
        } else {
            format!("{level},aws_config=warn,aws_smithy_runtime=warn,mongodb=warn")
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` decides. Calling this twice is harmless,
/// the second install is ignored.
pub fn init(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
