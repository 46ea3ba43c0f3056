use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info};

use crate::model::message::{ChatSpace, TriggerMessage};

/// Accepts either a bare space id (`ABC123`) or a full name (`spaces/ABC123`).
pub fn space_name(space: &str) -> Result<ChatSpace> {
    let name = if space.starts_with("spaces/") {
        space.to_string()
    } else {
        format!("spaces/{space}")
    };
    ChatSpace::parse(&name)
        .with_context(|| format!("Invalid space {space:?}: expected an id like ABC123 or spaces/ABC123"))
}

/// Send a single trigger naming `space` to the relay endpoint. No retry.
pub async fn ping_endpoint(endpoint: &str, space: &str) -> Result<()> {
    let space = space_name(space)?;
    let message = TriggerMessage::for_space(space.as_str());
    let data = serde_json::to_string(&message).context("Failed to serialize trigger message")?;
    info!(endpoint, payload = %data, "Pinging relay");

    let resp = reqwest::Client::new()
        .post(endpoint)
        .header(CONTENT_TYPE, "application/json")
        .body(data)
        .send()
        .await
        .with_context(|| format!("Failed to reach {endpoint}"))?;

    debug!(status = %resp.status(), "Relay responded");
    Ok(())
}
