use crate::formatter::{BoxError, Formatter, LogstashFormatter};
use crate::level::Level;
use crate::record::LogRecord;
use crate::sink::Sink;
use std::collections::BTreeSet;
use std::io;

/// Error returned by [`Hook::fire`].
#[derive(thiserror::Error, Debug)]
pub enum HookError {
    #[error("failed to format log record: {0}")]
    Encoding(#[source] BoxError),

    #[error("failed to write log record: {0}")]
    Write(#[source] io::Error),
}

/// Formats records and writes them to a sink, for the levels it is
/// interested in.
///
/// The host logging framework is expected to ask [`Hook::levels`] (or
/// [`Hook::is_enabled`]) before calling [`Hook::fire`]. `fire` checks the
/// level again, so records outside the set are never written even when
/// the hook is driven by hand.
///
/// The hook does no locking of its own; mutating the level set needs
/// `&mut self`. Callers sharing a hook across threads wrap it, as
/// [`LogstashLayer`](crate::layer::LogstashLayer) does.
#[derive(Debug)]
pub struct Hook<W, F = LogstashFormatter> {
    writer: W,
    formatter: F,
    levels: BTreeSet<Level>,
}

impl<W: Sink> Hook<W> {
    /// Hook with a [`LogstashFormatter`] without extra fields and every
    /// level enabled.
    pub fn new(writer: W) -> Self {
        Self::with_formatter(writer, LogstashFormatter::default())
    }
}

impl<W: Sink, F: Formatter> Hook<W, F> {
    pub fn with_formatter(writer: W, formatter: F) -> Self {
        Self {
            writer,
            formatter,
            levels: Level::ALL.into_iter().collect(),
        }
    }

    /// Replace the level set.
    pub fn with_levels(mut self, levels: impl IntoIterator<Item = Level>) -> Self {
        self.levels = levels.into_iter().collect();
        self
    }

    /// Format `record` and write it to the sink in a single call.
    ///
    /// **Returns**
    /// - `Ok(())` once the sink accepted the entry, or when the record's
    ///   level is not enabled (nothing is formatted or written then).
    /// - `Err(HookError::Encoding)` if the formatter failed; nothing was
    ///   written.
    /// - `Err(HookError::Write)` if the sink failed. There is no retry; the
    ///   entry is lost unless the caller does something about it.
    pub fn fire(&mut self, record: &LogRecord) -> Result<(), HookError> {
        if !self.is_enabled(record.level) {
            return Ok(());
        }

        let bytes = self
            .formatter
            .format(record)
            .map_err(HookError::Encoding)?;

        self.writer.write_entry(&bytes).map_err(HookError::Write)
    }

    /// Levels this hook wants to receive.
    pub fn levels(&self) -> &BTreeSet<Level> {
        &self.levels
    }

    pub fn is_enabled(&self, level: Level) -> bool {
        self.levels.contains(&level)
    }

    /// Enable `level`. Enabling an already enabled level does nothing.
    pub fn set_level(&mut self, level: Level) {
        self.levels.insert(level);
    }

    /// Disable `level`. Disabling a level that is not enabled does nothing.
    pub fn remove_level(&mut self, level: Level) {
        self.levels.remove(&level);
    }

    pub fn formatter(&self) -> &F {
        &self.formatter
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}
