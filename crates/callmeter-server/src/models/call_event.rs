//! Call Webhook DTOs

use serde::Serialize;
use utoipa::ToSchema;

use crate::application::ProcessOutcome;

/// Provider call event. Documented for OpenAPI only; the handler validates
/// the raw body itself so loosely typed fields are tolerated.
#[derive(Debug, ToSchema)]
pub struct CallWebhookRequest {
    /// `call_started`, `call_ended`, `call_disconnected` or `call_analyzed`
    #[schema(example = "call_ended")]
    pub event: String,
    pub call: CallWebhookPayload,
}

#[derive(Debug, ToSchema)]
pub struct CallWebhookPayload {
    pub call_id: String,
    /// Provider-side agent id
    pub agent_id: String,
    pub from_number: Option<String>,
    pub to_number: Option<String>,
    /// Milliseconds since the Unix epoch
    pub start_timestamp: Option<f64>,
    /// Milliseconds since the Unix epoch
    pub end_timestamp: Option<f64>,
    /// Seconds
    pub duration: Option<f64>,
    pub duration_ms: Option<f64>,
    pub call_status: Option<String>,
    pub recording_url: Option<String>,
    pub transcript: Option<String>,
    pub sentiment_score: Option<f64>,
}

/// Acknowledgement of an accepted event
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    pub success: bool,
    pub event: String,
    pub call_id: String,
    /// Billing result, e.g. `charged` or `already_charged`
    pub billing: String,
}

impl From<ProcessOutcome> for WebhookAck {
    fn from(outcome: ProcessOutcome) -> Self {
        Self {
            success: true,
            billing: outcome.billing.label().to_string(),
            event: outcome.event,
            call_id: outcome.call_id,
        }
    }
}
