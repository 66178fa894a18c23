//! Call Biller (Use Case)
//!
//! Charges one finished call: cost, keyed debit, then the ledger entry.
//! Shared by the webhook processor and the backfill so both go through
//! the same idempotency key.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use callmeter::{calculate_cost, ChargeKey, DebitResult, NewTransaction, Owner};

use super::{CreditLedger, TransactionRecorder};

/// What billing did for a call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BillingOutcome {
    /// The event does not trigger billing
    NotApplicable,
    ZeroDuration,
    /// The agent's rate yields no cost
    ZeroCost,
    Charged {
        cost: Decimal,
        new_balance: Decimal,
        account_blocked: bool,
        transaction_recorded: bool,
    },
    AlreadyCharged,
    /// Billing could not complete; the call record still stands
    Skipped { reason: String },
}

impl BillingOutcome {
    /// Short status name for responses and logs
    pub fn label(&self) -> &'static str {
        match self {
            BillingOutcome::NotApplicable => "not_applicable",
            BillingOutcome::ZeroDuration => "zero_duration",
            BillingOutcome::ZeroCost => "zero_cost",
            BillingOutcome::Charged { .. } => "charged",
            BillingOutcome::AlreadyCharged => "already_charged",
            BillingOutcome::Skipped { .. } => "skipped",
        }
    }
}

pub struct CallBiller {
    ledger: Arc<CreditLedger>,
    recorder: Arc<TransactionRecorder>,
}

impl CallBiller {
    pub fn new(ledger: Arc<CreditLedger>, recorder: Arc<TransactionRecorder>) -> Self {
        Self { ledger, recorder }
    }

    /// Bill a call. Never fails: ledger problems come back as
    /// [`BillingOutcome::Skipped`].
    pub async fn bill(
        &self,
        owner: Owner,
        call_id: &str,
        duration_seconds: i64,
        rate_per_minute: Decimal,
    ) -> BillingOutcome {
        if duration_seconds <= 0 {
            return BillingOutcome::ZeroDuration;
        }

        let cost = calculate_cost(duration_seconds, rate_per_minute);
        if cost <= Decimal::ZERO {
            return BillingOutcome::ZeroCost;
        }

        // Fast path for plain redeliveries; the charge key below is what
        // actually guarantees a single debit.
        match self.recorder.find_charge_for_call(call_id).await {
            Ok(Some(_)) => {
                tracing::info!(call_id = %call_id, "Call already charged, skipping");
                return BillingOutcome::AlreadyCharged;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(call_id = %call_id, "Charge lookup failed: {}", e),
        }

        let charge = ChargeKey::call_charge(call_id);
        let outcome = match self.ledger.debit(owner.user_id, cost, Some(charge)).await {
            Ok(DebitResult::Applied(outcome)) => outcome,
            Ok(DebitResult::AlreadyCharged) => {
                tracing::info!(call_id = %call_id, "Charge already claimed, skipping");
                return BillingOutcome::AlreadyCharged;
            }
            Err(e) => {
                tracing::warn!(
                    call_id = %call_id,
                    user_id = %owner.user_id,
                    error_kind = e.kind(),
                    "Billing skipped: {}",
                    e
                );
                return BillingOutcome::Skipped {
                    reason: e.to_string(),
                };
            }
        };

        let transaction = NewTransaction::call_charge(
            owner,
            call_id,
            cost,
            duration_seconds,
            outcome.new_balance,
        );
        let recorded = self.recorder.record_best_effort(&transaction).await;

        tracing::info!(
            call_id = %call_id,
            user_id = %owner.user_id,
            cost = %cost,
            new_balance = %outcome.new_balance,
            "Call charged"
        );

        BillingOutcome::Charged {
            cost,
            new_balance: outcome.new_balance,
            account_blocked: outcome.was_blocked,
            transaction_recorded: recorded.is_some(),
        }
    }
}
