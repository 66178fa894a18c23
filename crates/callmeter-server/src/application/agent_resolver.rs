//! Agent Resolver (Use Case)
//!
//! Maps a provider agent id to an internal agent and its billing rate.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use callmeter::{Agent, AgentRepository, AgentStatus, DomainError};

/// Application service for agent lookup and administration
pub struct AgentResolver {
    repo: Arc<dyn AgentRepository>,
}

impl AgentResolver {
    pub fn new(repo: Arc<dyn AgentRepository>) -> Self {
        Self { repo }
    }

    /// Resolve an active agent for billing.
    ///
    /// Unknown ids fail with `AgentNotFound`, inactive agents with
    /// `AgentInactive`.
    pub async fn resolve(&self, external_id: &str) -> Result<Agent, DomainError> {
        let agent = self
            .repo
            .find_by_external_id(external_id)
            .await?
            .ok_or_else(|| DomainError::AgentNotFound {
                external_id: external_id.to_string(),
            })?;

        if !agent.is_active() {
            return Err(DomainError::AgentInactive {
                external_id: external_id.to_string(),
            });
        }

        Ok(agent)
    }

    /// Look up an agent regardless of status
    pub async fn find(&self, external_id: &str) -> Result<Agent, DomainError> {
        self.repo
            .find_by_external_id(external_id)
            .await?
            .ok_or_else(|| DomainError::not_found_str("Agent", external_id))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Agent>, DomainError> {
        self.repo.find_by_id(id).await
    }

    /// Change rate and/or status. Agents are never deleted.
    pub async fn update(
        &self,
        id: Uuid,
        rate_per_minute: Option<Decimal>,
        status: Option<AgentStatus>,
    ) -> Result<Agent, DomainError> {
        let mut agent = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Agent", id))?;

        if let Some(rate) = rate_per_minute {
            agent.set_rate(rate)?;
        }
        if let Some(status) = status {
            agent.set_status(status);
        }

        let saved = self.repo.update(&agent).await?;
        tracing::info!(
            agent_id = %saved.id,
            external_id = %saved.external_id,
            rate_per_minute = %saved.rate_per_minute,
            status = %saved.status,
            "Updated agent"
        );

        Ok(saved)
    }
}
