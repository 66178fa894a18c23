//! PostgreSQL implementation of CreditBalanceRepository
//!
//! Debits are one conditional `UPDATE` inside a transaction that also
//! claims the charge key, so a replayed or concurrent charge for the same
//! call can never debit twice.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use callmeter::{
    ChargeKey, CreditBalance, CreditBalanceRepository, CreditDefaults, CreditOutcome,
    DebitOutcome, DebitResult, DomainError,
};

pub struct PgCreditBalanceRepository {
    pool: PgPool,
}

impl PgCreditBalanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CreditBalanceRow {
    user_id: Uuid,
    company_id: Option<Uuid>,
    balance: Decimal,
    warning_threshold: Decimal,
    critical_threshold: Decimal,
    is_blocked: bool,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<CreditBalanceRow> for CreditBalance {
    fn from(row: CreditBalanceRow) -> Self {
        Self {
            user_id: row.user_id,
            company_id: row.company_id,
            balance: row.balance,
            warning_threshold: row.warning_threshold,
            critical_threshold: row.critical_threshold,
            is_blocked: row.is_blocked,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DebitRow {
    previous_balance: Decimal,
    new_balance: Decimal,
    is_blocked: bool,
    warning_threshold: Decimal,
    critical_threshold: Decimal,
}

impl From<DebitRow> for DebitOutcome {
    fn from(row: DebitRow) -> Self {
        Self {
            previous_balance: row.previous_balance,
            new_balance: row.new_balance,
            was_blocked: row.is_blocked,
            is_low: row.new_balance <= row.warning_threshold,
            is_critical: row.new_balance <= row.critical_threshold,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CreditRow {
    balance: Decimal,
    is_blocked: bool,
    created: bool,
}

/// Clamp at zero, block at zero, and skip rows that are already blocked
const DEBIT_SQL: &str = r#"
    WITH prev AS (
        SELECT user_id, balance FROM credit_balances WHERE user_id = $1 FOR UPDATE
    )
    UPDATE credit_balances cb
    SET balance = GREATEST(cb.balance - $2, 0),
        is_blocked = GREATEST(cb.balance - $2, 0) <= 0,
        updated_at = NOW()
    FROM prev
    WHERE cb.user_id = prev.user_id AND cb.is_blocked = FALSE
    RETURNING prev.balance AS previous_balance,
              cb.balance AS new_balance,
              cb.is_blocked,
              cb.warning_threshold,
              cb.critical_threshold
"#;

const CREDIT_SQL: &str = r#"
    INSERT INTO credit_balances
        (user_id, company_id, balance, warning_threshold, critical_threshold, is_blocked, updated_at)
    VALUES ($1, $2, $3, $4, $5, FALSE, NOW())
    ON CONFLICT (user_id) DO UPDATE
    SET balance = credit_balances.balance + EXCLUDED.balance,
        is_blocked = CASE
            WHEN credit_balances.balance + EXCLUDED.balance > 0 THEN FALSE
            ELSE credit_balances.is_blocked
        END,
        company_id = COALESCE(credit_balances.company_id, EXCLUDED.company_id),
        updated_at = NOW()
    RETURNING balance, is_blocked, (xmax = 0) AS created
"#;

#[async_trait]
impl CreditBalanceRepository for PgCreditBalanceRepository {
    async fn find(&self, user_id: Uuid) -> Result<Option<CreditBalance>, DomainError> {
        let row = sqlx::query_as::<_, CreditBalanceRow>(
            r#"
            SELECT user_id, company_id, balance, warning_threshold, critical_threshold,
                   is_blocked, updated_at
            FROM credit_balances
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(row.map(CreditBalance::from))
    }

    async fn debit(
        &self,
        user_id: Uuid,
        amount: Decimal,
        charge: Option<&ChargeKey>,
    ) -> Result<DebitResult, DomainError> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::InvalidAmount { amount });
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        if let Some(key) = charge {
            // A concurrent claim of the same key waits here until the other
            // transaction finishes, then sees the conflict.
            let claimed = sqlx::query(
                r#"
                INSERT INTO charge_claims (call_id, transaction_type, user_id, amount)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (call_id, transaction_type) DO NOTHING
                "#,
            )
            .bind(&key.call_id)
            .bind(key.transaction_type.as_str())
            .bind(user_id)
            .bind(amount)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?
            .rows_affected();

            if claimed == 0 {
                tx.rollback()
                    .await
                    .map_err(|e| DomainError::Repository(e.to_string()))?;
                return Ok(DebitResult::AlreadyCharged);
            }
        }

        let row = sqlx::query_as::<_, DebitRow>(DEBIT_SQL)
            .bind(user_id)
            .bind(amount)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        if let Some(row) = row {
            tx.commit()
                .await
                .map_err(|e| DomainError::Repository(e.to_string()))?;
            return Ok(DebitResult::Applied(row.into()));
        }

        // Nothing updated: either the row is missing or the account is blocked.
        // Rolling back releases the claim.
        let exists: Option<bool> =
            sqlx::query_scalar("SELECT is_blocked FROM credit_balances WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| DomainError::Repository(e.to_string()))?;

        tx.rollback()
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        match exists {
            Some(_) => Err(DomainError::AccountBlocked { user_id }),
            None => Err(DomainError::BalanceMissing { user_id }),
        }
    }

    async fn credit(
        &self,
        user_id: Uuid,
        company_id: Uuid,
        amount: Decimal,
        defaults: CreditDefaults,
    ) -> Result<CreditOutcome, DomainError> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::InvalidAmount { amount });
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        let was_blocked: Option<bool> = sqlx::query_scalar(
            "SELECT is_blocked FROM credit_balances WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        let row = sqlx::query_as::<_, CreditRow>(CREDIT_SQL)
            .bind(user_id)
            .bind(company_id)
            .bind(amount)
            .bind(defaults.warning_threshold)
            .bind(defaults.critical_threshold)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        let was_blocked = was_blocked.unwrap_or(false);
        Ok(CreditOutcome {
            previous_balance: row.balance - amount,
            new_balance: row.balance,
            is_blocked: row.is_blocked,
            was_unblocked: was_blocked && !row.is_blocked,
            created: row.created,
        })
    }

    async fn is_charged(&self, key: &ChargeKey) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM charge_claims WHERE call_id = $1 AND transaction_type = $2
            )
            "#,
        )
        .bind(&key.call_id)
        .bind(key.transaction_type.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))
    }
}
