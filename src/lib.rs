//! Level-filtered hook that renders log records as Logstash JSON lines and
//! writes them to any [`std::io::Write`], plus a `tracing` layer driving it.
//!
//! ```
//! use logstash_hook::{Hook, Level, LogRecord};
//!
//! let mut hook = Hook::new(Vec::<u8>::new()).with_levels(Level::Warn.and_above());
//! hook.fire(&LogRecord::new(Level::Debug, "ignored")).unwrap();
//! hook.fire(&LogRecord::new(Level::Error, "disk full").with_field("free_mb", 0)).unwrap();
//!
//! let out = String::from_utf8(hook.into_writer()).unwrap();
//! assert_eq!(out.lines().count(), 1);
//! assert!(out.contains("\"message\":\"disk full\""));
//! ```

pub mod formatter;
pub mod hook;
pub mod level;
pub mod record;
pub mod sink;
pub mod layer;

pub mod init;
pub mod noop_sink;

pub use formatter::{BoxError, FormatError, Formatter, LogstashFormatter, TimestampFormat};
pub use hook::{Hook, HookError};
pub use layer::{HookHandle, LogstashLayer};
pub use level::Level;
pub use record::{Fields, LogRecord};
pub use sink::Sink;
