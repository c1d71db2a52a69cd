use logstash_hook::{Hook, Level, LogRecord, LogstashFormatter};
use serde_json::json;
use std::net::TcpStream;

/// Sends entries straight to a Logstash `tcp` input using the `json_lines`
/// codec, without going through `tracing`.
///
/// ```text
/// input { tcp { port => 5000 codec => json_lines } }
/// ```
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let addr = std::env::args().nth(1).unwrap_or_else(|| "127.0.0.1:5000".to_string());
    let conn = TcpStream::connect(&addr)?;

    let formatter = LogstashFormatter::new([("app".to_string(), json!("tcp-demo"))].into_iter().collect());
    let mut hook = Hook::with_formatter(conn, formatter).with_levels(Level::Warn.and_above());

    hook.fire(&LogRecord::new(Level::Info, "filtered out"))?;
    hook.fire(&LogRecord::new(Level::Warn, "cache miss ratio high").with_field("ratio", 0.42))?;

    let err = std::io::Error::new(std::io::ErrorKind::TimedOut, "upstream timed out");
    hook.fire(&LogRecord::new(Level::Error, "request failed").with_error(&err))?;

    Ok(())
}
