use logstash_hook::init::{init_tracing_with_config, LayerConfig};
use logstash_hook::Level;
use serde_json::json;
use tracing::{debug, error, info, warn};

fn main() {
    let mut config = LayerConfig {
        levels: Level::Info.and_above().collect(),
        ..LayerConfig::default()
    };
    config.extra_fields.insert("service".to_string(), json!("checkout"));
    config.extra_fields.insert("env".to_string(), json!("dev"));

    let handle = init_tracing_with_config(std::io::stdout(), config).expect("install subscriber");

    info!("starting service");
    debug!("not printed, debug is not enabled");

    error!(
        user_id = 42,
        reason = "invalid password",
        "authentication failed"
    );

    handle.remove_level(Level::Info);
    info!("not printed any more");
    warn!(retries = 3, "payment provider slow");
}
