//! Live endpoint check.
//!
//! Ignored by default. Reads the normal config plus `CHATWIRE_*` overrides and
//! sends one connection test and one short chat.
//!
//! Run explicitly:
//! `cargo test --test live_endpoint -- --ignored --nocapture`

use chatwire::api::ApiClient;
use chatwire::config::load_config;
use chatwire::types::Message;
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
#[ignore = "needs a live endpoint; run explicitly"]
async fn configured_endpoint_answers() {
    let config = load_config(None).expect("load config");
    if !config.is_configured() {
        eprintln!("[live-endpoint] endpoint/model/token not configured; skipping");
        return;
    }
    eprintln!(
        "[live-endpoint] provider={} model={} token={}",
        config.provider.as_str(),
        config.model,
        config.redacted_token()
    );

    let client = ApiClient::from_config(&config);
    timeout(Duration::from_secs(60), client.test_connection(&config))
        .await
        .expect("connection test timed out")
        .expect("connection test");

    let result = timeout(
        Duration::from_secs(60),
        client.chat(&[Message::user("Reply with the single word: pong")], &[], &config),
    )
    .await
    .expect("chat timed out")
    .expect("chat");
    let text = result.text().unwrap_or_default();
    eprintln!("[live-endpoint] reply={text:?}");
    assert!(!text.trim().is_empty());
}
