//! Callmeter Domain Library
//!
//! Core domain types and interfaces for metering telephony calls against
//! prepaid credit balances.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Core domain models (Agent, OwnershipMapping, CreditBalance,
//!     Transaction, CallRecord, WebhookEvent)
//!   - `value_objects/`: Immutable value types (AgentStatus, TransactionType,
//!     CallEventKind, CallStatus)
//!   - `services/`: Pure calculations (cost, duration)
//!   - `errors/`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `repositories/`: Data access interfaces
//!
//! # Usage
//!
//! ```rust,ignore
//! use callmeter::domain::{calculate_cost, CreditBalance, WebhookEvent};
//! use callmeter::ports::{AgentRepository, CreditBalanceRepository};
//! ```

pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    calculate_cost, display_amount, resolve_duration_seconds, Agent, AgentStatus, CallEventKind,
    CallPayload, CallRecord, CallStatus, ChargeKey, CreditBalance, CreditDefaults, CreditOutcome,
    DebitOutcome, DebitResult, DomainError, ErrorCategory, NewTransaction, Owner,
    OwnershipMapping, Transaction, TransactionType, WebhookErrorLog, WebhookEvent, COST_SCALE,
    MAX_AMOUNT, MAX_CALL_DURATION_SECONDS,
};
pub use ports::{
    AgentRepository, CallRecordRepository, CreditBalanceRepository, OwnershipRepository,
    TransactionRepository, WebhookErrorRepository,
};
