//! CreditBalance - Prepaid balance and its debit rule
//!
//! The rule here is the reference for every storage adapter: the Postgres
//! adapter expresses it as one conditional `UPDATE`, the in-memory test
//! adapter calls it under a single lock.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{errors::DomainError, TransactionType};

/// One prepaid balance per user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditBalance {
    pub user_id: Uuid,
    pub company_id: Option<Uuid>,
    /// Never negative in storage
    pub balance: Decimal,
    pub warning_threshold: Decimal,
    pub critical_threshold: Decimal,
    pub is_blocked: bool,
    pub updated_at: DateTime<Utc>,
}

/// Thresholds applied when an administrator provisions a new balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditDefaults {
    pub warning_threshold: Decimal,
    pub critical_threshold: Decimal,
}

impl Default for CreditDefaults {
    fn default() -> Self {
        Self {
            warning_threshold: Decimal::new(1000, 2),
            critical_threshold: Decimal::new(200, 2),
        }
    }
}

/// Idempotency key for a charge: at most one charge per (call, type)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChargeKey {
    pub call_id: String,
    pub transaction_type: TransactionType,
}

impl ChargeKey {
    pub fn call_charge(call_id: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            transaction_type: TransactionType::CallCharge,
        }
    }
}

/// Result of an applied debit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DebitOutcome {
    pub previous_balance: Decimal,
    pub new_balance: Decimal,
    /// This debit exhausted the balance and blocked the account
    pub was_blocked: bool,
    /// Advisory: new balance is at or below the warning threshold
    pub is_low: bool,
    /// Advisory: new balance is at or below the critical threshold
    pub is_critical: bool,
}

/// What a keyed debit did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitResult {
    Applied(DebitOutcome),
    /// The charge key was already claimed; nothing changed
    AlreadyCharged,
}

/// Result of a credit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CreditOutcome {
    pub previous_balance: Decimal,
    pub new_balance: Decimal,
    pub is_blocked: bool,
    /// The account was blocked before and is usable again
    pub was_unblocked: bool,
    /// The balance row did not exist and was provisioned
    pub created: bool,
}

impl CreditBalance {
    /// Empty, unblocked balance with the given thresholds
    pub fn provision(user_id: Uuid, company_id: Option<Uuid>, defaults: CreditDefaults) -> Self {
        Self {
            user_id,
            company_id,
            balance: Decimal::ZERO,
            warning_threshold: defaults.warning_threshold,
            critical_threshold: defaults.critical_threshold,
            is_blocked: false,
            updated_at: Utc::now(),
        }
    }

    /// Apply a debit of `amount` (> 0).
    ///
    /// Blocked accounts reject the debit unchanged. Otherwise the balance is
    /// clamped at zero and the account blocks when it reaches zero.
    pub fn apply_debit(&mut self, amount: Decimal) -> Result<DebitOutcome, DomainError> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::InvalidAmount { amount });
        }
        if self.is_blocked {
            return Err(DomainError::AccountBlocked {
                user_id: self.user_id,
            });
        }

        let previous_balance = self.balance;
        let new_balance = (previous_balance - amount).max(Decimal::ZERO);
        let blocked = new_balance <= Decimal::ZERO;

        self.balance = new_balance;
        self.is_blocked = blocked;
        self.updated_at = Utc::now();

        Ok(DebitOutcome {
            previous_balance,
            new_balance,
            was_blocked: blocked,
            is_low: new_balance <= self.warning_threshold,
            is_critical: new_balance <= self.critical_threshold,
        })
    }

    /// Apply a credit of `amount` (> 0), clearing the block when the
    /// resulting balance is positive.
    pub fn apply_credit(&mut self, amount: Decimal) -> Result<CreditOutcome, DomainError> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::InvalidAmount { amount });
        }

        let previous_balance = self.balance;
        let was_blocked = self.is_blocked;
        self.balance = previous_balance + amount;
        if self.balance > Decimal::ZERO {
            self.is_blocked = false;
        }
        self.updated_at = Utc::now();

        Ok(CreditOutcome {
            previous_balance,
            new_balance: self.balance,
            is_blocked: self.is_blocked,
            was_unblocked: was_blocked && !self.is_blocked,
            created: false,
        })
    }

    pub fn is_low(&self) -> bool {
        self.balance <= self.warning_threshold
    }

    pub fn is_critical(&self) -> bool {
        self.balance <= self.critical_threshold
    }
}
