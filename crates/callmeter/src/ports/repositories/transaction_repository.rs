//! Transaction Repository Port
//!
//! Append-only: there is no update or delete.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, NewTransaction, Transaction};

/// Repository interface for ledger entries
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Append an entry. A second `call_charge` for the same call id fails
    /// with `DomainError::Conflict`.
    async fn insert(&self, transaction: &NewTransaction) -> Result<Transaction, DomainError>;

    /// The `call_charge` entry for a call, if any
    async fn find_charge_for_call(&self, call_id: &str) -> Result<Option<Transaction>, DomainError>;

    /// Recent entries for a user, newest first
    async fn list_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<Transaction>, DomainError>;
}
