//! Ownership Resolver (Use Case)
//!
//! Finds the single paying (user, company) for an agent. Only explicit
//! mappings count; when they do not name exactly one owner the call is
//! rejected.

use std::sync::Arc;

use uuid::Uuid;

use callmeter::{DomainError, Owner, OwnershipMapping, OwnershipRepository};

pub struct OwnershipResolver {
    repo: Arc<dyn OwnershipRepository>,
}

impl OwnershipResolver {
    pub fn new(repo: Arc<dyn OwnershipRepository>) -> Self {
        Self { repo }
    }

    pub async fn resolve(&self, agent_id: Uuid) -> Result<Owner, DomainError> {
        let mappings = self.repo.find_by_agent(agent_id).await?;
        select_owner(agent_id, &mappings)
    }
}

/// Exactly one primary wins; without a primary, a single mapping wins
fn select_owner(agent_id: Uuid, mappings: &[OwnershipMapping]) -> Result<Owner, DomainError> {
    let primaries: Vec<&OwnershipMapping> = mappings.iter().filter(|m| m.is_primary).collect();

    let candidates: Vec<&OwnershipMapping> = if primaries.is_empty() {
        mappings.iter().collect()
    } else {
        primaries
    };

    match candidates.as_slice() {
        [] => Err(DomainError::NoOwner { agent_id }),
        [only] => Ok(only.owner()),
        many => Err(DomainError::AmbiguousOwner {
            agent_id,
            candidates: many.len(),
        }),
    }
}
