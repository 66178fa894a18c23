//! Credit Ledger (Use Case)
//!
//! Thin layer over the balance store: validates amounts and logs threshold
//! crossings. The atomic work happens in the repository.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use callmeter::{
    display_amount, ChargeKey, CreditBalance, CreditBalanceRepository, CreditDefaults,
    CreditOutcome, DebitResult, DomainError,
};

pub struct CreditLedger {
    repo: Arc<dyn CreditBalanceRepository>,
    defaults: CreditDefaults,
}

impl CreditLedger {
    pub fn new(repo: Arc<dyn CreditBalanceRepository>, defaults: CreditDefaults) -> Self {
        Self { repo, defaults }
    }

    /// Current balance row for a user
    pub async fn balance(&self, user_id: Uuid) -> Result<CreditBalance, DomainError> {
        self.repo
            .find(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("CreditBalance", user_id))
    }

    /// Debit `amount` (> 0). With a charge key the debit happens at most
    /// once per key.
    pub async fn debit(
        &self,
        user_id: Uuid,
        amount: Decimal,
        charge: Option<ChargeKey>,
    ) -> Result<DebitResult, DomainError> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::InvalidAmount { amount });
        }

        let result = self.repo.debit(user_id, amount, charge.as_ref()).await?;

        if let DebitResult::Applied(outcome) = &result {
            tracing::info!(
                user_id = %user_id,
                amount = %amount,
                new_balance = %outcome.new_balance,
                "Debited credit balance"
            );

            if outcome.was_blocked {
                tracing::warn!(user_id = %user_id, "Credit exhausted, account blocked");
            } else if outcome.is_critical {
                tracing::warn!(
                    user_id = %user_id,
                    balance = %display_amount(outcome.new_balance),
                    "Credit balance critical"
                );
            } else if outcome.is_low {
                tracing::warn!(
                    user_id = %user_id,
                    balance = %display_amount(outcome.new_balance),
                    "Credit balance low"
                );
            }
        }

        Ok(result)
    }

    /// Credit `amount` (> 0), provisioning the balance row with the
    /// configured thresholds if needed
    pub async fn credit(
        &self,
        user_id: Uuid,
        company_id: Uuid,
        amount: Decimal,
    ) -> Result<CreditOutcome, DomainError> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::InvalidAmount { amount });
        }

        let outcome = self
            .repo
            .credit(user_id, company_id, amount, self.defaults)
            .await?;

        if outcome.created {
            tracing::info!(user_id = %user_id, company_id = %company_id, "Provisioned credit balance");
        }
        if outcome.was_unblocked {
            tracing::info!(user_id = %user_id, "Account unblocked by credit");
        }
        tracing::info!(
            user_id = %user_id,
            amount = %amount,
            new_balance = %outcome.new_balance,
            "Credited balance"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn setup() -> (Arc<MemoryStore>, CreditLedger) {
        let store = Arc::new(MemoryStore::new());
        let ledger = CreditLedger::new(store.clone(), CreditDefaults::default());
        (store, ledger)
    }

    fn applied(result: DebitResult) -> callmeter::DebitOutcome {
        match result {
            DebitResult::Applied(outcome) => outcome,
            DebitResult::AlreadyCharged => panic!("expected an applied debit"),
        }
    }

    #[tokio::test]
    async fn test_debit_missing_row_is_hard_error() {
        let (_, ledger) = setup();
        let err = ledger.debit(Uuid::new_v4(), dec("1.00"), None).await.unwrap_err();
        assert!(matches!(err, DomainError::BalanceMissing { .. }));
    }

    #[tokio::test]
    async fn test_non_positive_amounts_rejected() {
        let (store, ledger) = setup();
        let user = Uuid::new_v4();
        store.set_balance(user, Uuid::new_v4(), dec("5"));

        for amount in [Decimal::ZERO, dec("-1")] {
            assert!(matches!(
                ledger.debit(user, amount, None).await,
                Err(DomainError::InvalidAmount { .. })
            ));
            assert!(matches!(
                ledger.credit(user, Uuid::new_v4(), amount).await,
                Err(DomainError::InvalidAmount { .. })
            ));
        }
        assert_eq!(store.balance(user).unwrap().balance, dec("5"));
    }

    #[tokio::test]
    async fn test_blocking_until_credit() {
        let (store, ledger) = setup();
        let (user, company) = (Uuid::new_v4(), Uuid::new_v4());
        store.set_balance(user, company, dec("0.50"));

        let outcome = applied(ledger.debit(user, dec("0.80"), None).await.unwrap());
        assert_eq!(outcome.new_balance, Decimal::ZERO);
        assert!(outcome.was_blocked);

        let err = ledger.debit(user, dec("0.01"), None).await.unwrap_err();
        assert!(matches!(err, DomainError::AccountBlocked { .. }));

        let credit = ledger.credit(user, company, dec("3.00")).await.unwrap();
        assert!(credit.was_unblocked);
        assert!(!credit.created);
        assert_eq!(credit.new_balance, dec("3.00"));

        let outcome = applied(ledger.debit(user, dec("1.00"), None).await.unwrap());
        assert_eq!(outcome.new_balance, dec("2.00"));
        assert!(outcome.is_critical);
    }

    #[tokio::test]
    async fn test_charge_key_debits_once() {
        let (store, ledger) = setup();
        let user = Uuid::new_v4();
        store.set_balance(user, Uuid::new_v4(), dec("10"));

        let key = ChargeKey::call_charge("call_1");
        applied(ledger.debit(user, dec("1"), Some(key.clone())).await.unwrap());
        let again = ledger.debit(user, dec("1"), Some(key)).await.unwrap();

        assert_eq!(again, DebitResult::AlreadyCharged);
        assert_eq!(store.balance(user).unwrap().balance, dec("9"));
    }

    #[tokio::test]
    async fn test_credit_provisions_with_defaults() {
        let store = Arc::new(MemoryStore::new());
        let defaults = CreditDefaults {
            warning_threshold: dec("5"),
            critical_threshold: dec("1"),
        };
        let ledger = CreditLedger::new(store.clone(), defaults);
        let user = Uuid::new_v4();

        let outcome = ledger.credit(user, Uuid::new_v4(), dec("20")).await.unwrap();
        assert!(outcome.created);
        assert_eq!(outcome.previous_balance, Decimal::ZERO);

        let row = ledger.balance(user).await.unwrap();
        assert_eq!(row.balance, dec("20"));
        assert_eq!(row.warning_threshold, dec("5"));
        assert_eq!(row.critical_threshold, dec("1"));
    }
}
