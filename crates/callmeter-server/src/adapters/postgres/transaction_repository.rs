//! PostgreSQL implementation of TransactionRepository

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use callmeter::{DomainError, NewTransaction, Transaction, TransactionRepository, TransactionType};

pub struct PgTransactionRepository {
    pool: PgPool,
}

impl PgTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    user_id: Uuid,
    company_id: Uuid,
    amount: Decimal,
    transaction_type: String,
    description: String,
    call_id: Option<String>,
    balance_after: Decimal,
    created_by: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DomainError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let transaction_type: TransactionType = row
            .transaction_type
            .parse()
            .map_err(DomainError::Repository)?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            company_id: row.company_id,
            amount: row.amount,
            transaction_type,
            description: row.description,
            call_id: row.call_id,
            balance_after: row.balance_after,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

const TRANSACTION_COLUMNS: &str = "id, user_id, company_id, amount, transaction_type, description, \
     call_id, balance_after, created_by, created_at";

#[async_trait]
impl TransactionRepository for PgTransactionRepository {
    async fn insert(&self, transaction: &NewTransaction) -> Result<Transaction, DomainError> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            r#"
            INSERT INTO transactions
                (id, user_id, company_id, amount, transaction_type, description,
                 call_id, balance_after, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {TRANSACTION_COLUMNS}
            "#
        ))
        .bind(transaction.id)
        .bind(transaction.user_id)
        .bind(transaction.company_id)
        .bind(transaction.amount)
        .bind(transaction.transaction_type.as_str())
        .bind(&transaction.description)
        .bind(&transaction.call_id)
        .bind(transaction.balance_after)
        .bind(&transaction.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => DomainError::Conflict(format!(
                "{} already recorded for call {}",
                transaction.transaction_type,
                transaction.call_id.as_deref().unwrap_or("-")
            )),
            _ => DomainError::Repository(e.to_string()),
        })?;

        row.try_into()
    }

    async fn find_charge_for_call(&self, call_id: &str) -> Result<Option<Transaction>, DomainError> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions \
             WHERE call_id = $1 AND transaction_type = 'call_charge'"
        ))
        .bind(call_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        row.map(Transaction::try_from).transpose()
    }

    async fn list_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<Transaction>, DomainError> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions \
             WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        rows.into_iter().map(Transaction::try_from).collect()
    }
}
