//! Credit Adjustment (Use Case)
//!
//! Administrative top-ups and deductions. Each applied change appends an
//! `admin_credit` or `admin_debit` ledger entry.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use callmeter::{
    DebitResult, DomainError, NewTransaction, Owner, Transaction, COST_SCALE, MAX_AMOUNT,
};

use super::{CreditLedger, TransactionRecorder};

/// Result of an administrative adjustment
#[derive(Debug, Clone)]
pub struct AdjustmentOutcome {
    pub user_id: Uuid,
    pub new_balance: Decimal,
    pub is_blocked: bool,
    /// `None` when the ledger entry could not be written
    pub transaction: Option<Transaction>,
}

pub struct CreditAdjustmentService {
    ledger: Arc<CreditLedger>,
    recorder: Arc<TransactionRecorder>,
}

impl CreditAdjustmentService {
    pub fn new(ledger: Arc<CreditLedger>, recorder: Arc<TransactionRecorder>) -> Self {
        Self { ledger, recorder }
    }

    /// Positive `amount` credits, negative debits, zero is rejected. Amounts
    /// must be representable as stored: at most four decimal places.
    pub async fn adjust(
        &self,
        owner: Owner,
        amount: Decimal,
        description: String,
        created_by: Option<String>,
    ) -> Result<AdjustmentOutcome, DomainError> {
        let description = description.trim().to_string();
        if description.is_empty() {
            return Err(DomainError::Validation("description is required".to_string()));
        }
        if amount.normalize().scale() > COST_SCALE {
            return Err(DomainError::Validation(format!(
                "amount {} has more than {} decimal places",
                amount, COST_SCALE
            )));
        }
        if amount.abs() > MAX_AMOUNT {
            return Err(DomainError::Validation(format!("amount {} is out of range", amount)));
        }

        let (new_balance, is_blocked) = if amount > Decimal::ZERO {
            let outcome = self
                .ledger
                .credit(owner.user_id, owner.company_id, amount)
                .await?;
            (outcome.new_balance, outcome.is_blocked)
        } else if amount < Decimal::ZERO {
            match self.ledger.debit(owner.user_id, -amount, None).await? {
                DebitResult::Applied(outcome) => (outcome.new_balance, outcome.was_blocked),
                DebitResult::AlreadyCharged => {
                    return Err(DomainError::Conflict("debit already applied".to_string()))
                }
            }
        } else {
            return Err(DomainError::InvalidAmount { amount });
        };

        let entry = NewTransaction::admin_adjustment(
            owner,
            amount,
            description,
            new_balance,
            created_by.clone(),
        );
        let transaction = self.recorder.record_best_effort(&entry).await;

        tracing::info!(
            user_id = %owner.user_id,
            amount = %amount,
            new_balance = %new_balance,
            created_by = ?created_by,
            "Administrative credit adjustment"
        );

        Ok(AdjustmentOutcome {
            user_id: owner.user_id,
            new_balance,
            is_blocked,
            transaction,
        })
    }
}
