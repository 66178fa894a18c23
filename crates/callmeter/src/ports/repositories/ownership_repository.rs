//! Ownership Repository Port

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, OwnershipMapping};

/// Repository interface for user/company/agent assignments
#[async_trait]
pub trait OwnershipRepository: Send + Sync {
    /// All mappings that reference an agent
    async fn find_by_agent(&self, agent_id: Uuid) -> Result<Vec<OwnershipMapping>, DomainError>;
}
