//! Credit Balance Repository Port
//!
//! Every mutation is a single atomic operation in the implementation.
//! Callers never read a balance and write it back.

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    errors::DomainError, ChargeKey, CreditBalance, CreditDefaults, CreditOutcome, DebitResult,
};

/// Repository interface for prepaid balances
#[async_trait]
pub trait CreditBalanceRepository: Send + Sync {
    /// Find the balance row for a user
    async fn find(&self, user_id: Uuid) -> Result<Option<CreditBalance>, DomainError>;

    /// Atomically debit `amount` following [`CreditBalance::apply_debit`].
    ///
    /// With a `charge` key the key is claimed in the same atomic unit; a key
    /// that was already claimed yields [`DebitResult::AlreadyCharged`] and
    /// leaves the balance untouched. A failed debit releases the claim.
    ///
    /// Errors: `BalanceMissing` when no row exists, `AccountBlocked` when
    /// the account is blocked.
    async fn debit(
        &self,
        user_id: Uuid,
        amount: Decimal,
        charge: Option<&ChargeKey>,
    ) -> Result<DebitResult, DomainError>;

    /// Atomically credit `amount`, provisioning the row with `defaults`
    /// when it does not exist yet.
    async fn credit(
        &self,
        user_id: Uuid,
        company_id: Uuid,
        amount: Decimal,
        defaults: CreditDefaults,
    ) -> Result<CreditOutcome, DomainError>;

    /// Whether a charge key has been claimed
    async fn is_charged(&self, key: &ChargeKey) -> Result<bool, DomainError>;
}
