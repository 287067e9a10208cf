//! HTTP front for the dispatcher: one POST route, JSON in, JSON out.

use super::{WebhookDispatcher, WebhookPayload};
use crate::config::ServeConfig;
use crate::error::AppError;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
struct WebhookState {
    dispatcher: Arc<WebhookDispatcher>,
}

/// Builds the router with the webhook handler mounted at `route`.
pub fn router(dispatcher: Arc<WebhookDispatcher>, route: &str) -> Router {
    Router::new()
        .route(route, post(handle_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(WebhookState { dispatcher })
}

/// Binds the listener and serves until the process is stopped.
pub async fn serve(dispatcher: Arc<WebhookDispatcher>, config: &ServeConfig) -> Result<(), AppError> {
    let app = router(dispatcher, &config.route);
    let listener = tokio::net::TcpListener::bind(config.address()).await?;

    log::info!(
        "Webhook server listening on http://{}{}",
        config.address(),
        config.route
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// `200 {"status": "success"}` once every mapping has been processed,
/// `400 {"error": ...}` when the payload or the mapping set is unusable.
async fn handle_webhook(
    State(state): State<WebhookState>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let payload = match WebhookPayload::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            log::warn!("Rejected webhook request: {}", e);
            return error_response(e.to_string());
        }
    };
    log::info!("✅ Webhook received for page {}", payload.page_id);
    log::debug!(
        "Webhook properties: {}",
        serde_json::to_string_pretty(&payload.properties).unwrap_or_default()
    );

    match state.dispatcher.dispatch(&payload).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "success" }))),
        Err(e) => {
            log::error!("❌ Webhook for page {} failed: {}", payload.page_id, e);
            error_response(e.to_string())
        }
    }
}

fn error_response(message: String) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}
