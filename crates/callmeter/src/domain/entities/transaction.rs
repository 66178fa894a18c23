//! Transaction - Immutable ledger entry

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Owner, TransactionType};

/// An append-only record of a balance change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Uuid,
    /// Signed: negative for debits, positive for credits
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub description: String,
    /// Originating call, for call charges
    pub call_id: Option<String>,
    pub balance_after: Decimal,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A transaction that has not been written yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub description: String,
    pub call_id: Option<String>,
    pub balance_after: Decimal,
    pub created_by: Option<String>,
}

impl NewTransaction {
    /// Usage charge for a call. `cost` is the full computed cost even when
    /// the balance was clamped.
    pub fn call_charge(
        owner: Owner,
        call_id: &str,
        cost: Decimal,
        duration_seconds: i64,
        balance_after: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: owner.user_id,
            company_id: owner.company_id,
            amount: -cost.abs(),
            transaction_type: TransactionType::CallCharge,
            description: format!("Call charge: {} ({}s)", call_id, duration_seconds),
            call_id: Some(call_id.to_string()),
            balance_after,
            created_by: None,
        }
    }

    /// Administrative adjustment. The sign of `amount` picks credit or debit.
    pub fn admin_adjustment(
        owner: Owner,
        amount: Decimal,
        description: String,
        balance_after: Decimal,
        created_by: Option<String>,
    ) -> Self {
        let transaction_type = if amount < Decimal::ZERO {
            TransactionType::AdminDebit
        } else {
            TransactionType::AdminCredit
        };

        Self {
            id: Uuid::new_v4(),
            user_id: owner.user_id,
            company_id: owner.company_id,
            amount,
            transaction_type,
            description,
            call_id: None,
            balance_after,
            created_by,
        }
    }

    /// Materialize with a creation timestamp
    pub fn into_transaction(self, created_at: DateTime<Utc>) -> Transaction {
        Transaction {
            id: self.id,
            user_id: self.user_id,
            company_id: self.company_id,
            amount: self.amount,
            transaction_type: self.transaction_type,
            description: self.description,
            call_id: self.call_id,
            balance_after: self.balance_after,
            created_by: self.created_by,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Owner {
        Owner {
            user_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_call_charge_is_negative_and_linked() {
        let tx = NewTransaction::call_charge(owner(), "call_1", Decimal::new(30, 2), 180, Decimal::ZERO);
        assert_eq!(tx.amount, Decimal::new(-30, 2));
        assert_eq!(tx.transaction_type, TransactionType::CallCharge);
        assert_eq!(tx.call_id.as_deref(), Some("call_1"));
        assert_eq!(tx.balance_after, Decimal::ZERO);
    }

    #[test]
    fn test_admin_adjustment_type_follows_sign() {
        let credit = NewTransaction::admin_adjustment(owner(), Decimal::new(500, 2), "top-up".into(), Decimal::new(500, 2), None);
        assert_eq!(credit.transaction_type, TransactionType::AdminCredit);

        let debit = NewTransaction::admin_adjustment(owner(), Decimal::new(-100, 2), "fix".into(), Decimal::new(400, 2), Some("ops".into()));
        assert_eq!(debit.transaction_type, TransactionType::AdminDebit);
        assert_eq!(debit.created_by.as_deref(), Some("ops"));
    }
}
