//! OwnershipMapping - User/company assignment of an agent

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Links a user and company to an agent they are billed for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipMapping {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub agent_id: Uuid,
    /// At most one primary mapping per user
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

/// The paying party for a call
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Owner {
    pub user_id: Uuid,
    pub company_id: Uuid,
}

impl OwnershipMapping {
    pub fn new(user_id: Uuid, company_id: Uuid, agent_id: Uuid, is_primary: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            company_id,
            agent_id,
            is_primary,
            created_at: Utc::now(),
        }
    }

    pub fn owner(&self) -> Owner {
        Owner {
            user_id: self.user_id,
            company_id: self.company_id,
        }
    }
}
