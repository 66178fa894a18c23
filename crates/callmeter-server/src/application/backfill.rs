//! Backfill (Use Case)
//!
//! Operator-triggered replay of finished calls that were never charged,
//! through the same biller and charge key as the webhook path. Safe to run
//! repeatedly. Only calls that can be charged now are selected, so calls on
//! zero-rate agents or blocked accounts never occupy a run's `limit`; they
//! come back once the rate or the balance changes.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use callmeter::{CallRecordRepository, DomainError};

use super::{AgentResolver, BillingOutcome, CallBiller};

pub const DEFAULT_BACKFILL_LIMIT: i64 = 100;

/// Per-outcome counts of a backfill run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub scanned: usize,
    pub charged: usize,
    pub already_charged: usize,
    pub zero_cost: usize,
    pub skipped: usize,
    pub total_charged: Decimal,
}

pub struct BackfillService {
    calls: Arc<dyn CallRecordRepository>,
    agents: Arc<AgentResolver>,
    biller: Arc<CallBiller>,
}

impl BackfillService {
    pub fn new(
        calls: Arc<dyn CallRecordRepository>,
        agents: Arc<AgentResolver>,
        biller: Arc<CallBiller>,
    ) -> Self {
        Self {
            calls,
            agents,
            biller,
        }
    }

    pub async fn run(&self, limit: Option<i64>) -> Result<BackfillReport, DomainError> {
        let limit = limit.unwrap_or(DEFAULT_BACKFILL_LIMIT).max(1);
        let pending = self.calls.find_unbilled(limit).await?;
        let mut report = BackfillReport {
            scanned: pending.len(),
            ..Default::default()
        };

        tracing::info!(pending = pending.len(), "Backfill started");

        for call in pending {
            // Billed at the agent's current rate
            let Some(agent) = self.agents.find_by_id(call.agent_id).await? else {
                tracing::warn!(call_id = %call.call_id, agent_id = %call.agent_id, "Backfill: agent missing");
                report.skipped += 1;
                continue;
            };

            let outcome = self
                .biller
                .bill(call.owner(), &call.call_id, call.duration_seconds, agent.rate_per_minute)
                .await;

            match outcome {
                BillingOutcome::Charged { cost, .. } => {
                    report.charged += 1;
                    report.total_charged += cost;
                }
                BillingOutcome::AlreadyCharged => report.already_charged += 1,
                BillingOutcome::ZeroCost | BillingOutcome::ZeroDuration => report.zero_cost += 1,
                BillingOutcome::Skipped { .. } | BillingOutcome::NotApplicable => report.skipped += 1,
            }
        }

        tracing::info!(
            scanned = report.scanned,
            charged = report.charged,
            skipped = report.skipped,
            total_charged = %report.total_charged,
            "Backfill finished"
        );

        Ok(report)
    }
}
