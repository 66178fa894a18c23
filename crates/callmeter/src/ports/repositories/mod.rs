//! Repository Ports
//!
//! Abstract interfaces for data persistence operations.

mod agent_repository;
mod call_repository;
mod credit_repository;
mod ownership_repository;
mod transaction_repository;
mod webhook_error_repository;

pub use agent_repository::*;
pub use call_repository::*;
pub use credit_repository::*;
pub use ownership_repository::*;
pub use transaction_repository::*;
pub use webhook_error_repository::*;
