//! Call Webhook Routes
//!
//! Inbound telephony events. Authentication is applied by the router in
//! `main.rs`.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    routing::post,
    Json, Router,
};

use callmeter::WebhookEvent;

use crate::error::{ApiError, ApiResult};
use crate::models::WebhookAck;
use crate::AppState;

/// Receive a call lifecycle event
#[utoipa::path(
    post,
    path = "/webhooks/calls",
    request_body = CallWebhookRequest,
    responses(
        (status = 200, description = "Event accepted", body = WebhookAck),
        (status = 400, description = "Invalid payload, unknown agent or no owner", body = ErrorBody),
        (status = 401, description = "Missing or invalid webhook credentials", body = ErrorBody),
        (status = 415, description = "Body is not declared as application/json", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Webhook"
)]
pub async fn receive_call_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookAck>> {
    require_json(&headers)?;
    let event = WebhookEvent::from_slice(&body)?;
    let outcome = state.processor.process(event).await?;
    Ok(Json(outcome.into()))
}

/// The body is parsed from raw bytes, so the declared type is checked here
fn require_json(headers: &HeaderMap) -> Result<(), ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let mime = content_type.split(';').next().unwrap_or_default().trim();
    if mime.eq_ignore_ascii_case("application/json") {
        Ok(())
    } else {
        tracing::warn!(content_type = %content_type, "Webhook rejected: not JSON");
        Err(ApiError::UnsupportedMediaType(
            "Content-Type must be application/json".to_string(),
        ))
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/webhooks/calls", post(receive_call_event))
        .route("/webhook", post(receive_call_event))
}
