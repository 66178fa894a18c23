//! Transaction Recorder (Use Case)
//!
//! Appends ledger entries. After a balance change has already been applied,
//! use [`TransactionRecorder::record_best_effort`]: the money movement
//! stands even if the audit entry cannot be written, and the gap is logged
//! for reconciliation.

use std::sync::Arc;

use uuid::Uuid;

use callmeter::{DomainError, NewTransaction, Transaction, TransactionRepository};

pub const DEFAULT_HISTORY_LIMIT: i64 = 50;
pub const MAX_HISTORY_LIMIT: i64 = 500;

pub struct TransactionRecorder {
    repo: Arc<dyn TransactionRepository>,
}

impl TransactionRecorder {
    pub fn new(repo: Arc<dyn TransactionRepository>) -> Self {
        Self { repo }
    }

    pub async fn record(&self, transaction: &NewTransaction) -> Result<Transaction, DomainError> {
        let saved = self.repo.insert(transaction).await?;
        tracing::debug!(
            transaction_id = %saved.id,
            user_id = %saved.user_id,
            amount = %saved.amount,
            transaction_type = %saved.transaction_type,
            "Recorded transaction"
        );
        Ok(saved)
    }

    /// Record without failing the caller. Returns `None` when nothing was
    /// written.
    pub async fn record_best_effort(&self, transaction: &NewTransaction) -> Option<Transaction> {
        match self.record(transaction).await {
            Ok(saved) => Some(saved),
            Err(DomainError::Conflict(msg)) => {
                tracing::info!(
                    call_id = ?transaction.call_id,
                    "Transaction already recorded: {}",
                    msg
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    reconciliation = true,
                    user_id = %transaction.user_id,
                    amount = %transaction.amount,
                    balance_after = %transaction.balance_after,
                    transaction_type = %transaction.transaction_type,
                    call_id = ?transaction.call_id,
                    "Balance changed but transaction was not recorded: {}",
                    e
                );
                None
            }
        }
    }

    pub async fn find_charge_for_call(&self, call_id: &str) -> Result<Option<Transaction>, DomainError> {
        self.repo.find_charge_for_call(call_id).await
    }

    /// Newest first. `limit` defaults to 50 and is capped at 500.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<Transaction>, DomainError> {
        let limit = limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);
        self.repo.list_for_user(user_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use callmeter::Owner;
    use rust_decimal::Decimal;

    fn owner() -> Owner {
        Owner {
            user_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_call_charge_is_conflict() {
        let store = Arc::new(MemoryStore::new());
        let recorder = TransactionRecorder::new(store.clone());
        let owner = owner();

        let tx = NewTransaction::call_charge(owner, "call_1", Decimal::ONE, 60, Decimal::TEN);
        recorder.record(&tx).await.unwrap();

        let dup = NewTransaction::call_charge(owner, "call_1", Decimal::ONE, 60, Decimal::TEN);
        assert!(matches!(recorder.record(&dup).await, Err(DomainError::Conflict(_))));
        assert!(recorder.record_best_effort(&dup).await.is_none());
        assert_eq!(store.transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_best_effort_swallows_storage_failure() {
        let store = Arc::new(MemoryStore::new());
        store.fail_transaction_inserts(true);
        let recorder = TransactionRecorder::new(store.clone());

        let tx = NewTransaction::call_charge(owner(), "call_1", Decimal::ONE, 60, Decimal::TEN);
        assert!(recorder.record_best_effort(&tx).await.is_none());
        assert!(recorder.record(&tx).await.is_err());
    }

    #[tokio::test]
    async fn test_history_newest_first_and_limited() {
        let store = Arc::new(MemoryStore::new());
        let recorder = TransactionRecorder::new(store.clone());
        let owner = owner();

        for i in 1..=3 {
            let tx = NewTransaction::admin_adjustment(
                owner,
                Decimal::from(i),
                format!("top-up {i}"),
                Decimal::from(i),
                None,
            );
            recorder.record(&tx).await.unwrap();
        }

        let history = recorder.list_for_user(owner.user_id, Some(2)).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].description, "top-up 3");

        let none = recorder.list_for_user(Uuid::new_v4(), None).await.unwrap();
        assert!(none.is_empty());
    }
}
