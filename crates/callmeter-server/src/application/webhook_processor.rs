//! Webhook Processor (Use Case)
//!
//! Per event: resolve agent and owner, upsert the call record, and bill
//! terminal events. Resolution failures reject the event with no writes
//! other than the operational error log. Billing failures never reject it.

use std::sync::Arc;

use serde::Serialize;

use callmeter::{
    calculate_cost, Agent, CallRecord, CallRecordRepository, DomainError, ErrorCategory, Owner,
    WebhookErrorLog, WebhookErrorRepository, WebhookEvent,
};

use super::{AgentResolver, BillingOutcome, CallBiller, OwnershipResolver};

/// Result of an accepted event
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    pub call_id: String,
    pub event: String,
    pub billing: BillingOutcome,
}

pub struct WebhookProcessor {
    agents: Arc<AgentResolver>,
    owners: Arc<OwnershipResolver>,
    calls: Arc<dyn CallRecordRepository>,
    errors: Arc<dyn WebhookErrorRepository>,
    biller: Arc<CallBiller>,
}

impl WebhookProcessor {
    pub fn new(
        agents: Arc<AgentResolver>,
        owners: Arc<OwnershipResolver>,
        calls: Arc<dyn CallRecordRepository>,
        errors: Arc<dyn WebhookErrorRepository>,
        biller: Arc<CallBiller>,
    ) -> Self {
        Self {
            agents,
            owners,
            calls,
            errors,
            biller,
        }
    }

    pub async fn process(&self, event: WebhookEvent) -> Result<ProcessOutcome, DomainError> {
        let (agent, owner) = match self.resolve(&event).await {
            Ok(resolved) => resolved,
            Err(e) => {
                self.report(&event, &e).await;
                return Err(e);
            }
        };

        if !event.event.is_known() {
            tracing::warn!(
                call_id = %event.call.call_id,
                event = %event.event,
                "Unknown event type, updating call record without billing"
            );
        }

        let duration_seconds = event.call.duration_seconds();
        let cost = event
            .event
            .is_billable()
            .then(|| calculate_cost(duration_seconds, agent.rate_per_minute));

        let record = CallRecord::from_event(&event, &agent, owner, cost);
        let stored = self.calls.upsert(&record).await?;

        tracing::info!(
            call_id = %stored.call_id,
            event = %event.event,
            status = %stored.status,
            duration_seconds = duration_seconds,
            "Call record upserted"
        );

        let billing = if event.event.is_billable() {
            self.biller
                .bill(owner, &stored.call_id, duration_seconds, agent.rate_per_minute)
                .await
        } else {
            BillingOutcome::NotApplicable
        };

        Ok(ProcessOutcome {
            call_id: stored.call_id,
            event: event.event.to_string(),
            billing,
        })
    }

    async fn resolve(&self, event: &WebhookEvent) -> Result<(Agent, Owner), DomainError> {
        let agent = self.agents.resolve(&event.call.agent_id).await?;
        let owner = self.owners.resolve(agent.id).await?;
        Ok((agent, owner))
    }

    /// Operator-facing error channel
    async fn report(&self, event: &WebhookEvent, error: &DomainError) {
        tracing::error!(
            error_kind = error.kind(),
            call_id = %event.call.call_id,
            agent_id = %event.call.agent_id,
            event = %event.event,
            "Webhook rejected: {}",
            error
        );

        if error.category() != ErrorCategory::Resolution {
            return;
        }

        let entry = WebhookErrorLog::for_event(event, error);
        if let Err(e) = self.errors.record(&entry).await {
            tracing::warn!(error_kind = error.kind(), "Failed to persist webhook error: {}", e);
        }
    }
}
