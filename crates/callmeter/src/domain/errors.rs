//! Domain Errors
//!
//! Error types for domain operations.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Agent not found for external id {external_id}")]
    AgentNotFound { external_id: String },

    #[error("Agent {external_id} is inactive")]
    AgentInactive { external_id: String },

    #[error("No owner mapping for agent {agent_id}")]
    NoOwner { agent_id: Uuid },

    #[error("Ambiguous ownership for agent {agent_id}: {candidates} candidate mappings")]
    AmbiguousOwner { agent_id: Uuid, candidates: usize },

    #[error("Account {user_id} is blocked")]
    AccountBlocked { user_id: Uuid },

    #[error("No credit balance for user {user_id}")]
    BalanceMissing { user_id: Uuid },

    #[error("Invalid amount {amount}: must be greater than zero")]
    InvalidAmount { amount: Decimal },
}

/// Coarse error classes used to decide how a failure propagates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed or incomplete input; rejected without side effects
    Validation,
    /// Unknown agent or unresolvable owner; rejected without side effects
    Resolution,
    /// Billing could not complete; the call record still stands
    Ledger,
    /// Storage failure
    Persistence,
}

impl DomainError {
    pub fn not_found<T: AsRef<str>>(entity_type: T, id: Uuid) -> Self {
        Self::NotFound {
            entity_type: entity_type.as_ref().to_string(),
            id: id.to_string(),
        }
    }

    pub fn not_found_str<T: AsRef<str>>(entity_type: T, id: &str) -> Self {
        Self::NotFound {
            entity_type: entity_type.as_ref().to_string(),
            id: id.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) | Self::InvalidAmount { .. } => ErrorCategory::Validation,
            Self::AgentNotFound { .. }
            | Self::AgentInactive { .. }
            | Self::NoOwner { .. }
            | Self::AmbiguousOwner { .. }
            | Self::NotFound { .. } => ErrorCategory::Resolution,
            Self::AccountBlocked { .. } | Self::BalanceMissing { .. } | Self::Conflict(_) => {
                ErrorCategory::Ledger
            }
            Self::Repository(_) | Self::ExternalService(_) => ErrorCategory::Persistence,
        }
    }

    /// Stable identifier for the operational error log
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Validation(_) => "validation",
            Self::Conflict(_) => "conflict",
            Self::Repository(_) => "repository",
            Self::ExternalService(_) => "external_service",
            Self::AgentNotFound { .. } => "agent_not_found",
            Self::AgentInactive { .. } => "agent_inactive",
            Self::NoOwner { .. } => "user_mapping_not_found",
            Self::AmbiguousOwner { .. } => "ambiguous_ownership",
            Self::AccountBlocked { .. } => "account_blocked",
            Self::BalanceMissing { .. } => "balance_missing",
            Self::InvalidAmount { .. } => "invalid_amount",
        }
    }
}
