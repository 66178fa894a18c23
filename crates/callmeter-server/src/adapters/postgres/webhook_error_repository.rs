//! PostgreSQL implementation of WebhookErrorRepository

use async_trait::async_trait;
use sqlx::PgPool;

use callmeter::{DomainError, WebhookErrorLog, WebhookErrorRepository};

pub struct PgWebhookErrorRepository {
    pool: PgPool,
}

impl PgWebhookErrorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WebhookErrorRepository for PgWebhookErrorRepository {
    async fn record(&self, entry: &WebhookErrorLog) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO webhook_errors (id, error_kind, call_id, agent_id, message, payload, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id)
        .bind(&entry.error_kind)
        .bind(&entry.call_id)
        .bind(&entry.agent_id)
        .bind(&entry.message)
        .bind(&entry.payload)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }
}
