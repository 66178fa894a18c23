//! Agent Repository Port
//!
//! Read access to the agent registry, plus the administrative rate and
//! status changes. There is no delete.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, Agent};

/// Repository interface for Agent entities
#[async_trait]
pub trait AgentRepository: Send + Sync {
    /// Find an agent by the provider's identifier
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Agent>, DomainError>;

    /// Find an agent by internal ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Agent>, DomainError>;

    /// Persist rate and status of an existing agent
    async fn update(&self, agent: &Agent) -> Result<Agent, DomainError>;
}
