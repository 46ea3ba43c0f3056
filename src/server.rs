use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::info;

use crate::handler::Relay;

pub fn router(relay: Arc<Relay>) -> Router {
    Router::new()
        .route("/", post(handle_trigger))
        .route("/chatbot", post(handle_trigger))
        .route("/health", get(health_check))
        .with_state(relay)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn handle_trigger(
    State(relay): State<Arc<Relay>>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    match relay.handle(&body).await {
        Ok(delivery) => (
            StatusCode::OK,
            Json(json!({
                "space": delivery.space.as_str(),
                "cards": delivery.cards,
                "text": delivery.text,
                "url": delivery.url,
            })),
        ),
        Err(e) => {
            let status = if e.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::BAD_GATEWAY
            };
            (status, Json(json!({ "error": e.to_string() })))
        }
    }
}

pub async fn serve(relay: Arc<Relay>, listen: &str) -> Result<()> {
    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to bind {listen}"))?;
    info!(addr = %listener.local_addr()?, "Listening for triggers");
    axum::serve(listener, router(relay))
        .await
        .context("HTTP server error")
}
