//! PostgreSQL Repository Implementations

mod agent_repository;
mod call_repository;
mod credit_repository;
mod ownership_repository;
mod transaction_repository;
mod webhook_error_repository;

pub use agent_repository::PgAgentRepository;
pub use call_repository::PgCallRecordRepository;
pub use credit_repository::PgCreditBalanceRepository;
pub use ownership_repository::PgOwnershipRepository;
pub use transaction_repository::PgTransactionRepository;
pub use webhook_error_repository::PgWebhookErrorRepository;
