//! WebhookErrorLog - Operator-facing record of a rejected event

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{errors::DomainError, WebhookEvent};

/// A rejected webhook, kept for operator follow-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookErrorLog {
    pub id: Uuid,
    /// Stable kind, e.g. `agent_not_found`
    pub error_kind: String,
    pub call_id: Option<String>,
    pub agent_id: Option<String>,
    pub message: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl WebhookErrorLog {
    pub fn for_event(event: &WebhookEvent, error: &DomainError) -> Self {
        Self {
            id: Uuid::new_v4(),
            error_kind: error.kind().to_string(),
            call_id: Some(event.call.call_id.clone()),
            agent_id: Some(event.call.agent_id.clone()),
            message: error.to_string(),
            payload: serde_json::to_value(event).unwrap_or(serde_json::Value::Null),
            created_at: Utc::now(),
        }
    }
}
