//! PostgreSQL implementation of OwnershipRepository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use callmeter::{DomainError, OwnershipMapping, OwnershipRepository};

pub struct PgOwnershipRepository {
    pool: PgPool,
}

impl PgOwnershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OwnershipRow {
    id: Uuid,
    user_id: Uuid,
    company_id: Uuid,
    agent_id: Uuid,
    is_primary: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<OwnershipRow> for OwnershipMapping {
    fn from(row: OwnershipRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            company_id: row.company_id,
            agent_id: row.agent_id,
            is_primary: row.is_primary,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl OwnershipRepository for PgOwnershipRepository {
    async fn find_by_agent(&self, agent_id: Uuid) -> Result<Vec<OwnershipMapping>, DomainError> {
        let rows = sqlx::query_as::<_, OwnershipRow>(
            r#"
            SELECT id, user_id, company_id, agent_id, is_primary, created_at
            FROM user_agent_assignments
            WHERE agent_id = $1
            ORDER BY is_primary DESC, created_at ASC
            "#,
        )
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(rows.into_iter().map(OwnershipMapping::from).collect())
    }
}
