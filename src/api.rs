// src/api.rs
//! Axum router for the webhook transport. The contract with Intercom is a
//! fast 200: the handler parses the body, spawns the pipeline, and answers
//! immediately. Malformed JSON is acknowledged too, not bounced.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::debug;

use crate::pipeline::Pipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/webhook", get(verify_webhook).post(receive_webhook))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Liveness/verification probe; Intercom pings this when the webhook URL is
/// registered.
async fn verify_webhook() -> &'static str {
    "Intercom Auto-Translator is running"
}

async fn receive_webhook(State(state): State<AppState>, body: Bytes) -> StatusCode {
    match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(payload) => {
            let pipeline = state.pipeline.clone();
            // All real work happens after the acknowledgment below.
            tokio::spawn(async move {
                pipeline.handle(payload).await;
            });
        }
        Err(e) => {
            debug!(error = %e, "unparseable webhook body acknowledged");
        }
    }
    StatusCode::OK
}
