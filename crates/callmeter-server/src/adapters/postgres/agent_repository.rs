//! PostgreSQL implementation of AgentRepository

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use callmeter::{Agent, AgentRepository, AgentStatus, DomainError};

/// PostgreSQL implementation of AgentRepository
pub struct PgAgentRepository {
    pool: PgPool,
}

impl PgAgentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct AgentRow {
    id: Uuid,
    external_id: String,
    name: String,
    status: String,
    rate_per_minute: Decimal,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<AgentRow> for Agent {
    type Error = DomainError;

    fn try_from(row: AgentRow) -> Result<Self, Self::Error> {
        let status: AgentStatus = row.status.parse().map_err(DomainError::Repository)?;

        Ok(Self {
            id: row.id,
            external_id: row.external_id,
            name: row.name,
            status,
            rate_per_minute: row.rate_per_minute,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const AGENT_COLUMNS: &str =
    "id, external_id, name, status, rate_per_minute, created_at, updated_at";

#[async_trait]
impl AgentRepository for PgAgentRepository {
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Agent>, DomainError> {
        let row = sqlx::query_as::<_, AgentRow>(&format!(
            "SELECT {AGENT_COLUMNS} FROM agents WHERE external_id = $1"
        ))
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        row.map(Agent::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Agent>, DomainError> {
        let row = sqlx::query_as::<_, AgentRow>(&format!(
            "SELECT {AGENT_COLUMNS} FROM agents WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        row.map(Agent::try_from).transpose()
    }

    async fn update(&self, agent: &Agent) -> Result<Agent, DomainError> {
        let row = sqlx::query_as::<_, AgentRow>(&format!(
            r#"
            UPDATE agents
            SET name = $2, status = $3, rate_per_minute = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {AGENT_COLUMNS}
            "#
        ))
        .bind(agent.id)
        .bind(&agent.name)
        .bind(agent.status.as_str())
        .bind(agent.rate_per_minute)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        row.ok_or_else(|| DomainError::not_found("Agent", agent.id))?
            .try_into()
    }
}
