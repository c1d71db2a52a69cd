use crate::record::{Fields, LogRecord};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::error::Error;

/// Error type used at the formatter seam so custom formatters can fail with
/// anything.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Turns a [`LogRecord`] into the bytes written to a sink.
///
/// Implemented by [`LogstashFormatter`] and by any
/// `Fn(&LogRecord) -> Result<Vec<u8>, BoxError>` closure.
pub trait Formatter {
    fn format(&self, record: &LogRecord) -> Result<Vec<u8>, BoxError>;
}

impl<F> Formatter for F
where
    F: Fn(&LogRecord) -> Result<Vec<u8>, BoxError>,
{
    fn format(&self, record: &LogRecord) -> Result<Vec<u8>, BoxError> {
        self(record)
    }
}

/// Error returned by [`LogstashFormatter::format_record`].
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("failed to encode log record as JSON: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// How `@timestamp` is rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TimestampFormat {
    /// `2025-01-08T10:30:45Z`
    #[default]
    Rfc3339,
    /// `2025-01-08T10:30:45.123Z`
    Rfc3339Millis,
    /// `2025-01-08T10:30:45.123456Z`
    Rfc3339Micros,
    /// Any strftime pattern understood by chrono.
    Custom(String),
}

impl TimestampFormat {
    pub fn format(&self, timestamp: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Rfc3339 => timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            TimestampFormat::Rfc3339Millis => timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            TimestampFormat::Rfc3339Micros => timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            TimestampFormat::Custom(pattern) => timestamp.format(pattern).to_string(),
        }
    }
}

const KEY_MESSAGE: &str = "message";
const KEY_LEVEL: &str = "level";
const KEY_TIMESTAMP: &str = "@timestamp";
const KEY_VERSION: &str = "@version";
const KEY_TYPE: &str = "type";

const METADATA_KEYS: [&str; 5] = [KEY_MESSAGE, KEY_LEVEL, KEY_TIMESTAMP, KEY_VERSION, KEY_TYPE];

/// Renders records as single-line JSON documents in the Logstash event
/// layout (`@version`, `@timestamp`, `type`, `message`, `level`).
///
/// Extra fields are fixed at construction and merged under every record's
/// own fields. A record field with the same key wins for that record only;
/// the formatter's copy is never touched. User keys that collide with one of
/// the metadata keys are kept under `fields.<key>`.
#[derive(Debug, Clone)]
pub struct LogstashFormatter {
    extra_fields: Fields,
    timestamp_format: TimestampFormat,
    log_type: String,
}

impl Default for LogstashFormatter {
    fn default() -> Self {
        Self::new(Fields::new())
    }
}

impl LogstashFormatter {
    pub fn new(extra_fields: Fields) -> Self {
        Self {
            extra_fields,
            timestamp_format: TimestampFormat::default(),
            log_type: "log".to_string(),
        }
    }

    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Override the value of the `type` key (defaults to `"log"`).
    pub fn with_type(mut self, log_type: impl Into<String>) -> Self {
        self.log_type = log_type.into();
        self
    }

    pub fn extra_fields(&self) -> &Fields {
        &self.extra_fields
    }

    /// Encode `record` as one newline-terminated JSON object.
    pub fn format_record(&self, record: &LogRecord) -> Result<Vec<u8>, FormatError> {
        let mut doc = Map::new();

        let merged = self
            .extra_fields
            .iter()
            .filter(|(key, _)| !record.fields.contains_key(*key))
            .chain(record.fields.iter());

        for (key, value) in merged {
            if METADATA_KEYS.contains(&key.as_str()) {
                doc.insert(format!("fields.{key}"), value.clone());
            } else {
                doc.insert(key.clone(), value.clone());
            }
        }

        doc.insert(KEY_MESSAGE.to_string(), Value::from(record.message.as_str()));
        doc.insert(KEY_LEVEL.to_string(), Value::from(record.level.as_str()));
        doc.insert(
            KEY_TIMESTAMP.to_string(),
            Value::from(self.timestamp_format.format(&record.timestamp)),
        );
        doc.insert(KEY_VERSION.to_string(), Value::from("1"));
        doc.insert(KEY_TYPE.to_string(), Value::from(self.log_type.as_str()));

        let mut bytes = serde_json::to_vec(&doc)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

impl Formatter for LogstashFormatter {
    fn format(&self, record: &LogRecord) -> Result<Vec<u8>, BoxError> {
        Ok(self.format_record(record)?)
    }
}
