use logstash_hook::layer::LogstashLayer;
use logstash_hook::Level;
use serde_json::Value;
use std::sync::atomic::Ordering;
use tracing_subscriber::layer::{Layer, SubscriberExt};

fn lines(buf: &[u8]) -> Vec<Value> {
    std::str::from_utf8(buf)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn events_become_json_lines() {
    let layer = LogstashLayer::new(Vec::<u8>::new());
    let handle = layer.handle();
    let subscriber = tracing_subscriber::registry().with(layer.with_filter(handle.clone()));

    tracing::subscriber::with_default(subscriber, || {
        tracing::error!(user_id = 42, reason = "invalid password", ok = false, "authentication failed");
    });

    let docs = handle.with_writer(|buf| lines(buf));
    assert_eq!(docs.len(), 1);

    let doc = &docs[0];
    assert_eq!(doc["message"], "authentication failed");
    assert_eq!(doc["level"], "error");
    assert_eq!(doc["user_id"], 42);
    assert_eq!(doc["reason"], "invalid password");
    assert_eq!(doc["ok"], false);
    assert_eq!(doc["@version"], "1");
    assert_eq!(doc["type"], "log");
    assert!(doc["@timestamp"].is_string());
}

#[test]
fn filter_follows_hook_levels() {
    let layer = LogstashLayer::new(Vec::<u8>::new());
    let handle = layer.handle();
    for level in Level::ALL {
        handle.remove_level(level);
    }
    for level in Level::Warn.and_above() {
        handle.set_level(level);
    }

    let total = layer.total_events.clone();
    let subscriber = tracing_subscriber::registry().with(layer.with_filter(handle.clone()));

    tracing::subscriber::with_default(subscriber, || {
        tracing::debug!("debug");
        tracing::info!("info");
        tracing::warn!("warn");
    });

    let docs = handle.with_writer(|buf| lines(buf));
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["message"], "warn");
    assert_eq!(docs[0]["level"], "warning");
    assert_eq!(total.load(Ordering::Relaxed), 1);
}

#[test]
fn unfiltered_layer_still_drops_disabled_levels() {
    let layer = LogstashLayer::new(Vec::<u8>::new());
    let handle = layer.handle();
    handle.remove_level(Level::Info);

    let total = layer.total_events.clone();
    let delivered = layer.delivered_events.clone();
    let subscriber = tracing_subscriber::registry().with(layer);

    tracing::subscriber::with_default(subscriber, || {
        tracing::info!("skipped");
        tracing::error!("kept");
    });

    let docs = handle.with_writer(|buf| lines(buf));
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["message"], "kept");
    assert_eq!(total.load(Ordering::Relaxed), 2);
    assert_eq!(delivered.load(Ordering::Relaxed), 1);
}

#[test]
fn write_failures_are_counted() {
    struct Closed;

    impl std::io::Write for Closed {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::NotConnected, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let layer = LogstashLayer::new(Closed);
    let failed = layer.failed_events.clone();
    let subscriber = tracing_subscriber::registry().with(layer);

    tracing::subscriber::with_default(subscriber, || {
        tracing::error!("lost");
    });

    assert_eq!(failed.load(Ordering::Relaxed), 1);
}
