//! Mock token deployment.
//!
//! Nothing touches a chain. A launch waits out a simulated deployment delay
//! and hands back a link shaped like a real listing.

use std::time::Duration;

use crate::config::LaunchConfig;

/// Build the deployment link for `ticker` launched at `now_millis`.
pub fn deployment_link(link_base: &str, ticker: &str, now_millis: u64) -> String {
    format!(
        "{}/{}-{}",
        link_base.trim_end_matches('/'),
        ticker.to_lowercase(),
        now_millis
    )
}

/// Simulate the deployment and return the generated link.
pub async fn deploy(config: &LaunchConfig, ticker: &str) -> String {
    if config.deploy_delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(config.deploy_delay_ms)).await;
    }
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    deployment_link(&config.link_base, ticker, now)
}
