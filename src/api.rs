//! Inbound HTTP endpoint — the webhook the messaging gateway calls.
//!
//! Business outcomes never surface as transport errors: the webhook answers
//! 200 with `{"status": ...}` for every processed message, including the
//! generic `erro` branch. Only malformed requests get a 4xx.

use crate::gateway::Gateway;
use axum::{
    extract::{Form, FromRequest, Request, State},
    http::{header, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use pacto_core::{config::ServerConfig, message::IncomingMessage};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

/// Shared state for API handlers.
#[derive(Clone)]
struct ApiState {
    gateway: Arc<Gateway>,
}

/// The webhook's minimal message event.
struct WebhookEvent {
    text: String,
    sender_id: String,
}

#[derive(Deserialize)]
struct JsonEvent {
    text: String,
    sender_id: String,
}

/// Twilio's form encoding of the same event.
#[derive(Deserialize)]
struct TwilioForm {
    #[serde(rename = "Body", default)]
    body: String,
    #[serde(rename = "From", default)]
    from: String,
}

impl<S> FromRequest<S> for WebhookEvent
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("json"))
            .unwrap_or(false);

        if is_json {
            let Json(event) = Json::<JsonEvent>::from_request(req, state)
                .await
                .map_err(|e| bad_request(&format!("invalid request: {e}")))?;
            Ok(Self {
                text: event.text,
                sender_id: event.sender_id,
            })
        } else {
            let Form(form) = Form::<TwilioForm>::from_request(req, state)
                .await
                .map_err(|e| bad_request(&format!("invalid request: {e}")))?;
            Ok(Self {
                text: form.body,
                sender_id: form.from,
            })
        }
    }
}

fn bad_request(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

/// `GET /` — liveness probe.
async fn home() -> Json<Value> {
    Json(json!({ "status": "online", "bot": "pacto" }))
}

/// `POST /webhook` — one inbound message, one status object back.
async fn webhook(
    State(state): State<ApiState>,
    event: WebhookEvent,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if event.sender_id.trim().is_empty() {
        return Err(bad_request("sender_id must not be empty"));
    }

    let incoming = IncomingMessage::from_event(&event.sender_id, &event.text);
    let status = state.gateway.handle_message(incoming).await;

    Ok(Json(json!({ "status": status.as_str() })))
}

/// Build the axum router with shared state.
fn build_router(gateway: Arc<Gateway>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/webhook", post(webhook))
        .layer(axum::extract::DefaultBodyLimit::max(64 * 1024))
        .with_state(ApiState { gateway })
}

/// Start the webhook server and block until shutdown.
pub async fn serve(config: &ServerConfig, gateway: Arc<Gateway>) -> anyhow::Result<()> {
    let app = build_router(gateway);
    let addr = format!("{}:{}", config.host, config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {addr}: {e}"))?;

    info!("Webhook server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Received shutdown signal");
}
