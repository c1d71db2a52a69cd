//! Global installation. Everything runs in one test because the global
//! subscriber can only be set once per process.

use logstash_hook::init::{init_tracing, init_tracing_with_config, LayerConfig};
use logstash_hook::Level;
use serde_json::Value;
use std::fmt;
use std::sync::mpsc;
use std::time::Duration;

/// A field value that logs while it is being formatted.
struct Chatty;

impl fmt::Debug for Chatty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        tracing::trace!("formatting chatty value");
        f.write_str("Chatty")
    }
}

fn lines(buf: &[u8]) -> Vec<Value> {
    std::str::from_utf8(buf)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn global_install_filters_and_refuses_second_install() {
    let config = LayerConfig {
        levels: Level::Warn.and_above().collect(),
        ..LayerConfig::default()
    };
    let handle = init_tracing_with_config(Vec::<u8>::new(), config).expect("first install succeeds");

    tracing::info!("dropped");
    tracing::warn!(attempt = 2, "kept");

    let docs = handle.with_writer(|buf| lines(buf));
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["message"], "kept");
    assert_eq!(docs[0]["level"], "warning");
    assert_eq!(docs[0]["attempt"], 2);

    // Runs on its own thread so a lock held across field recording shows up
    // as a timeout instead of a hung test run.
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        tracing::error!(value = ?Chatty, "boom");
        let _ = tx.send(());
    });
    rx.recv_timeout(Duration::from_secs(5))
        .expect("event with a logging field value completed");

    let docs = handle.with_writer(|buf| lines(buf));
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[1]["message"], "boom");
    assert_eq!(docs[1]["value"], "Chatty");

    assert!(init_tracing(Vec::<u8>::new()).is_err());
}
