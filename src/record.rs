use crate::level::Level;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::error::Error;

/// Structured context attached to a record, keyed by field name.
pub type Fields = BTreeMap<String, serde_json::Value>;

/// One log event as seen by the hook.
///
/// Records are built once by the caller (or by [`LogstashLayer`] from a
/// `tracing` event) and only borrowed afterwards; formatting never mutates
/// them.
///
/// [`LogstashLayer`]: crate::layer::LogstashLayer
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    pub fields: Fields,
}

impl LogRecord {
    /// A record stamped with the current time and no fields.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            fields: Fields::new(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_fields<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.fields
            .extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Attach an error under the `error` key, rendered with its `Display` text.
    pub fn with_error(self, err: &dyn Error) -> Self {
        self.with_field("error", err.to_string())
    }
}
