use crate::formatter::{LogstashFormatter, TimestampFormat};
use crate::hook::Hook;
use crate::layer::{HookHandle, LogstashLayer};
use crate::level::Level;
use crate::record::Fields;
use crate::sink::Sink;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::Registry;

/// Configuration of the installed logging layer.
///
/// **Fields**
/// - `extra_fields`: static fields merged into every entry (service name,
///   environment, ...).
/// - `levels`: levels forwarded to the sink.
/// - `timestamp_format`: rendering of `@timestamp`.
/// - `log_type`: value of the `type` key.
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt` layer is added
///   next to the Logstash layer and every event is also printed to the
///   console.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub extra_fields: Fields,
    pub levels: Vec<Level>,
    pub timestamp_format: TimestampFormat,
    pub log_type: String,
    pub enable_stdout: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            extra_fields: Fields::new(),
            levels: Level::ALL.to_vec(),
            timestamp_format: TimestampFormat::default(),
            log_type: "log".to_string(),
            enable_stdout: false,
        }
    }
}

impl LayerConfig {
    /// Build the layer described by this configuration around `writer`.
    pub fn build<W: Sink>(self, writer: W) -> LogstashLayer<W> {
        let formatter = LogstashFormatter::new(self.extra_fields)
            .with_timestamp_format(self.timestamp_format)
            .with_type(self.log_type);
        let hook = Hook::with_formatter(writer, formatter).with_levels(self.levels);
        LogstashLayer::from_hook(hook)
    }
}

/// Install a global `tracing` subscriber that writes Logstash JSON lines to
/// `writer` according to `config`.
///
/// **Returns**
/// - A [`HookHandle`] for adjusting levels or reaching the sink later.
/// - `Err(..)` if a global subscriber was already installed.
pub fn init_tracing_with_config<W>(
    writer: W,
    config: LayerConfig,
) -> Result<HookHandle<W>, SetGlobalDefaultError>
where
    W: Sink + Send + 'static,
{
    let enable_stdout = config.enable_stdout;
    let layer = config.build(writer);
    let handle = layer.handle();
    let filtered = layer.with_filter(handle.clone());

    // The two subscriber shapes have different types, so each branch
    // installs its own.
    if enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(filtered).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(filtered);
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(handle)
}

/// Install the layer with [`LayerConfig::default`]: no extra fields, every
/// level, RFC 3339 timestamps, no console output.
pub fn init_tracing<W>(writer: W) -> Result<HookHandle<W>, SetGlobalDefaultError>
where
    W: Sink + Send + 'static,
{
    init_tracing_with_config(writer, LayerConfig::default())
}
