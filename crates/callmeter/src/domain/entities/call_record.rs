//! CallRecord - Normalized telephony call
//!
//! One row per provider call id. Every event for the same call is upserted
//! onto that row; [`CallRecord::merge`] defines how the row converges.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Agent, CallStatus, Owner, WebhookEvent};

/// Normalized call, keyed by the provider call id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    pub call_id: String,
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub agent_id: Uuid,
    pub external_agent_id: String,
    pub status: CallStatus,
    /// Name of the last event applied
    pub last_event: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: i64,
    pub cost: Option<Decimal>,
    pub from_number: Option<String>,
    pub to_number: Option<String>,
    pub recording_url: Option<String>,
    pub transcript: Option<String>,
    pub sentiment_score: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CallRecord {
    /// Normalize an event for a resolved agent and owner
    pub fn from_event(event: &WebhookEvent, agent: &Agent, owner: Owner, cost: Option<Decimal>) -> Self {
        let call = &event.call;
        let now = Utc::now();
        Self {
            call_id: call.call_id.clone(),
            user_id: owner.user_id,
            company_id: owner.company_id,
            agent_id: agent.id,
            external_agent_id: agent.external_id.clone(),
            status: CallStatus::derive(&event.event, call.call_status.as_deref()),
            last_event: event.event.to_string(),
            start_time: call.start_time(),
            end_time: call.end_time(),
            duration_seconds: call.duration_seconds(),
            cost,
            from_number: call.from_number.clone(),
            to_number: call.to_number.clone(),
            recording_url: call.recording_url.clone(),
            transcript: call.transcript.clone(),
            sentiment_score: call.sentiment_score,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn owner(&self) -> Owner {
        Owner {
            user_id: self.user_id,
            company_id: self.company_id,
        }
    }

    /// Whether this record describes a finished call that can be billed
    pub fn is_billable(&self) -> bool {
        matches!(self.status, CallStatus::Completed | CallStatus::Analyzed) && self.duration_seconds > 0
    }

    /// Fold a newer observation of the same call into this one.
    ///
    /// - a terminal status is never regressed to `in_progress`
    /// - optional fields are only replaced by present values
    /// - duration only grows
    pub fn merge(mut self, incoming: CallRecord) -> CallRecord {
        let regresses = self.status.is_terminal() && incoming.status == CallStatus::InProgress;
        if !regresses {
            self.status = incoming.status;
        }

        self.user_id = incoming.user_id;
        self.company_id = incoming.company_id;
        self.agent_id = incoming.agent_id;
        self.external_agent_id = incoming.external_agent_id;
        self.last_event = incoming.last_event;
        self.start_time = incoming.start_time.or(self.start_time);
        self.end_time = incoming.end_time.or(self.end_time);
        self.duration_seconds = self.duration_seconds.max(incoming.duration_seconds);
        self.cost = incoming.cost.or(self.cost);
        self.from_number = incoming.from_number.or(self.from_number);
        self.to_number = incoming.to_number.or(self.to_number);
        self.recording_url = incoming.recording_url.or(self.recording_url);
        self.transcript = incoming.transcript.or(self.transcript);
        self.sentiment_score = incoming.sentiment_score.or(self.sentiment_score);
        self.updated_at = incoming.updated_at;
        self
    }
}
