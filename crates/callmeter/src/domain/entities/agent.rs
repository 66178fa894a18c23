//! Agent - AI calling agent known to the telephony provider
//!
//! Pure domain entity without infrastructure dependencies.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{errors::DomainError, AgentStatus};

/// Agent - maps a provider agent id to an internal record and billing rate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: Uuid,
    /// Identifier used by the telephony provider (unique)
    pub external_id: String,
    pub name: String,
    pub status: AgentStatus,
    pub rate_per_minute: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agent {
    /// Create a new active agent
    pub fn new(external_id: String, name: String, rate_per_minute: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            external_id,
            name,
            status: AgentStatus::Active,
            rate_per_minute,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }

    /// Change the billing rate
    pub fn set_rate(&mut self, rate_per_minute: Decimal) -> Result<(), DomainError> {
        if rate_per_minute < Decimal::ZERO {
            return Err(DomainError::Validation(format!(
                "rate_per_minute must be >= 0, got {}",
                rate_per_minute
            )));
        }
        self.rate_per_minute = rate_per_minute;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Soft status change (agents referenced by calls are never deleted)
    pub fn set_status(&mut self, status: AgentStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}
