use crate::formatter::{Formatter, LogstashFormatter};
use crate::hook::Hook;
use crate::level::Level;
use crate::record::{Fields, LogRecord};
use crate::sink::Sink;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Filter, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns events into [`LogRecord`]s and
/// fires them through a [`Hook`].
///
/// Delivery is synchronous: the event is formatted and written on the
/// thread that emitted it. `tracing` has no way to hand an error back to
/// the caller, so failed deliveries are reported on stderr and counted.
/// The hook is locked only while the record is written, so a sink must not
/// emit `tracing` events of its own; field values may.
///
/// The hook's level set is exposed to `tracing` through [`HookHandle`],
/// which is a per-layer [`Filter`]:
///
/// ```no_run
/// use logstash_hook::layer::LogstashLayer;
/// use tracing_subscriber::layer::{Layer, SubscriberExt};
///
/// let layer = LogstashLayer::new(std::io::stdout());
/// let filter = layer.handle();
/// let subscriber = tracing_subscriber::registry().with(layer.with_filter(filter));
/// ```
pub struct LogstashLayer<W, F = LogstashFormatter> {
    hook: Arc<Mutex<Hook<W, F>>>,
    /// Total events seen by the layer.
    pub total_events: Arc<AtomicU64>,
    /// Events written to the sink.
    pub delivered_events: Arc<AtomicU64>,
    /// Events lost because formatting or writing failed.
    pub failed_events: Arc<AtomicU64>,
}

impl<W: Sink> LogstashLayer<W> {
    pub fn new(writer: W) -> Self {
        Self::from_hook(Hook::new(writer))
    }
}

impl<W: Sink, F: Formatter> LogstashLayer<W, F> {
    pub fn from_hook(hook: Hook<W, F>) -> Self {
        Self {
            hook: Arc::new(Mutex::new(hook)),
            total_events: Arc::new(AtomicU64::new(0)),
            delivered_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Shared handle on the hook, usable after the layer has been moved into
    /// a subscriber.
    pub fn handle(&self) -> HookHandle<W, F> {
        HookHandle {
            hook: Arc::clone(&self.hook),
        }
    }
}

/// Cloneable access to the hook owned by a [`LogstashLayer`].
///
/// Doubles as the layer's per-layer [`Filter`]: `tracing` asks it whether
/// an event's level is in the hook's level set before the layer sees it.
/// Change levels before the subscriber is shared between threads; the
/// handle serializes access but does not order level changes against
/// events already in flight.
pub struct HookHandle<W, F = LogstashFormatter> {
    hook: Arc<Mutex<Hook<W, F>>>,
}

impl<W, F> Clone for HookHandle<W, F> {
    fn clone(&self) -> Self {
        Self {
            hook: Arc::clone(&self.hook),
        }
    }
}

impl<W: Sink, F: Formatter> HookHandle<W, F> {
    pub fn levels(&self) -> BTreeSet<Level> {
        self.hook.lock().levels().clone()
    }

    pub fn is_enabled(&self, level: Level) -> bool {
        self.hook.lock().is_enabled(level)
    }

    pub fn set_level(&self, level: Level) {
        self.hook.lock().set_level(level);
    }

    pub fn remove_level(&self, level: Level) {
        self.hook.lock().remove_level(level);
    }

    /// Run `f` against the hook's sink, e.g. to inspect an in-memory buffer.
    pub fn with_writer<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        f(self.hook.lock().writer_mut())
    }
}

impl<S, W, F> Filter<S> for HookHandle<W, F>
where
    W: Sink,
    F: Formatter,
{
    fn enabled(&self, meta: &Metadata<'_>, _cx: &Context<'_, S>) -> bool {
        self.is_enabled(Level::from(*meta.level()))
    }
}

impl<S, W, F> Layer<S> for LogstashLayer<W, F>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    W: Sink + Send + 'static,
    F: Formatter + Send + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let level = Level::from(*event.metadata().level());
        if !self.hook.lock().is_enabled(level) {
            return;
        }

        // Field values may log from their `Debug` impls, so the record is
        // built before the hook is locked again.
        let mut fields = Fields::new();
        let mut message: Option<String> = None;

        let mut visitor = FieldVisitor {
            fields: &mut fields,
            message: &mut message,
        };
        event.record(&mut visitor);

        let record = LogRecord {
            timestamp: Utc::now(),
            level,
            message: message.unwrap_or_default(),
            fields,
        };

        let result = self.hook.lock().fire(&record);
        match result {
            Ok(()) => {
                self.delivered_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.failed_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("logstash hook failed to deliver event: {}", e);
            }
        }
    }
}

/// Collects event fields into JSON values, pulling out `message`.
pub(crate) struct FieldVisitor<'a> {
    pub(crate) fields: &'a mut Fields,
    pub(crate) message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // NaN and infinities become null
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(format!("{:?}", value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noop_sink::NoopSink;

    #[test]
    fn handle_shares_level_set_with_layer() {
        let layer = LogstashLayer::new(NoopSink);
        let handle = layer.handle();

        handle.remove_level(Level::Trace);
        assert!(!layer.handle().is_enabled(Level::Trace));
        assert_eq!(layer.handle().levels().len(), Level::ALL.len() - 1);

        handle.set_level(Level::Trace);
        assert!(layer.handle().is_enabled(Level::Trace));
    }

    #[test]
    fn with_writer_reaches_the_sink() {
        let layer = LogstashLayer::new(Vec::<u8>::new());
        layer.handle().with_writer(|buf| buf.extend_from_slice(b"x"));
        assert_eq!(layer.handle().with_writer(|buf| buf.len()), 1);
    }
}
