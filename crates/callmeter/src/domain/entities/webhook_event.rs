//! WebhookEvent - Validated inbound telephony event
//!
//! The provider payload is loosely typed. It is parsed into a raw envelope
//! with every field optional, then validated into [`WebhookEvent`] where the
//! required fields are plain values. Nothing downstream sees the raw form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::{errors::DomainError, resolve_duration_seconds, CallEventKind};

/// A validated provider event
#[derive(Debug, Clone, Serialize)]
pub struct WebhookEvent {
    pub event: CallEventKind,
    pub call: CallPayload,
}

/// Call fields carried by an event
#[derive(Debug, Clone, Default, Serialize)]
pub struct CallPayload {
    pub call_id: String,
    /// Provider-side agent identifier
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

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(default, deserialize_with = "lenient_string")]
    event: Option<String>,
    #[serde(default)]
    call: Option<RawCall>,
}

#[derive(Debug, Deserialize)]
struct RawCall {
    #[serde(default, deserialize_with = "lenient_string")]
    call_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    agent_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    from_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    to_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    start_timestamp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    end_timestamp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    duration_ms: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    call_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    recording_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    transcript: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    sentiment_score: Option<f64>,
}

/// Numbers or numeric strings; anything else reads as absent
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite()))
}

/// Non-empty strings, or numbers rendered as strings
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl WebhookEvent {
    /// Parse and validate a raw request body
    pub fn from_slice(body: &[u8]) -> Result<Self, DomainError> {
        let raw: RawEnvelope = serde_json::from_slice(body)
            .map_err(|e| DomainError::Validation(format!("Invalid JSON body: {e}")))?;
        Self::validate(raw)
    }

    /// Validate an already-decoded JSON value
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        let raw: RawEnvelope = serde_json::from_value(value)
            .map_err(|e| DomainError::Validation(format!("Invalid payload: {e}")))?;
        Self::validate(raw)
    }

    fn validate(raw: RawEnvelope) -> Result<Self, DomainError> {
        let event = raw
            .event
            .ok_or_else(|| DomainError::Validation("Missing event name".to_string()))?;
        let call = raw
            .call
            .ok_or_else(|| DomainError::Validation("Missing call object".to_string()))?;
        let call_id = call
            .call_id
            .ok_or_else(|| DomainError::Validation("Missing call.call_id".to_string()))?;
        let agent_id = call
            .agent_id
            .ok_or_else(|| DomainError::Validation("Missing call.agent_id".to_string()))?;

        Ok(Self {
            event: CallEventKind::parse(&event),
            call: CallPayload {
                call_id,
                agent_id,
                from_number: call.from_number,
                to_number: call.to_number,
                start_timestamp: call.start_timestamp,
                end_timestamp: call.end_timestamp,
                duration: call.duration,
                duration_ms: call.duration_ms,
                call_status: call.call_status,
                recording_url: call.recording_url,
                transcript: call.transcript,
                sentiment_score: call.sentiment_score,
            },
        })
    }
}

impl CallPayload {
    /// Duration in whole seconds (`duration_ms`, then `duration`, then timestamps)
    pub fn duration_seconds(&self) -> i64 {
        resolve_duration_seconds(
            self.duration_ms,
            self.duration,
            self.start_timestamp,
            self.end_timestamp,
        )
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_timestamp.and_then(millis_to_datetime)
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_timestamp.and_then(millis_to_datetime)
    }
}

fn millis_to_datetime(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() || ms < 0.0 {
        return None;
    }
    DateTime::from_timestamp_millis(ms as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_full_event() {
        let body = json!({
            "event": "call_ended",
            "call": {
                "call_id": "call_abc",
                "agent_id": "agent_1",
                "from_number": "+15550001",
                "to_number": "+15550002",
                "start_timestamp": 1_700_000_000_000_i64,
                "end_timestamp": 1_700_000_125_000_i64,
                "call_status": "ended",
                "transcript": "hello",
                "sentiment_score": 0.8,
                "disconnection_reason": "user_hangup"
            }
        });

        let event = WebhookEvent::from_value(body).unwrap();
        assert_eq!(event.event, CallEventKind::CallEnded);
        assert_eq!(event.call.call_id, "call_abc");
        assert_eq!(event.call.duration_seconds(), 125);
        assert_eq!(event.call.start_time().unwrap().timestamp(), 1_700_000_000);
        assert_eq!(event.call.sentiment_score, Some(0.8));
    }

    #[test]
    fn test_missing_required_fields_rejected() {
        let cases = [
            json!({"call": {"call_id": "c", "agent_id": "a"}}),
            json!({"event": "call_ended"}),
            json!({"event": "call_ended", "call": {"agent_id": "a"}}),
            json!({"event": "call_ended", "call": {"call_id": "c"}}),
            json!({"event": "  ", "call": {"call_id": "c", "agent_id": "a"}}),
            json!({"event": "call_ended", "call": {"call_id": "", "agent_id": "a"}}),
        ];

        for body in cases {
            let err = WebhookEvent::from_value(body.clone()).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "{body}");
        }
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = WebhookEvent::from_slice(b"{not json").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_loose_field_types_are_tolerated() {
        let body = json!({
            "event": "call_ended",
            "call": {
                "call_id": 12345,
                "agent_id": "agent_1",
                "duration": "75",
                "duration_ms": "not-a-number",
                "sentiment_score": "Positive"
            }
        });

        let event = WebhookEvent::from_value(body).unwrap();
        assert_eq!(event.call.call_id, "12345");
        assert_eq!(event.call.duration_ms, None);
        assert_eq!(event.call.duration_seconds(), 75);
        assert_eq!(event.call.sentiment_score, None);
    }

    #[test]
    fn test_unknown_event_is_accepted() {
        let body = json!({"event": "transcript_updated", "call": {"call_id": "c", "agent_id": "a"}});
        let event = WebhookEvent::from_value(body).unwrap();
        assert!(!event.event.is_known());
        assert_eq!(event.call.duration_seconds(), 0);
    }
}
