//! Agent DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use callmeter::Agent;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub id: Uuid,
    pub external_id: String,
    pub name: String,
    /// `active` or `inactive`
    pub status: String,
    #[schema(value_type = String)]
    pub rate_per_minute: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Agent> for AgentResponse {
    fn from(agent: Agent) -> Self {
        Self {
            id: agent.id,
            external_id: agent.external_id,
            name: agent.name,
            status: agent.status.to_string(),
            rate_per_minute: agent.rate_per_minute,
            created_at: agent.created_at,
            updated_at: agent.updated_at,
        }
    }
}

/// Rate and/or status change
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAgentRequest {
    #[schema(value_type = Option<String>, example = "0.10")]
    pub rate_per_minute: Option<Decimal>,
    /// `active` or `inactive`
    pub status: Option<String>,
}
