//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - Agent: Provider-facing calling agent with a billing rate
//! - OwnershipMapping: Which user/company pays for an agent
//! - CreditBalance: Prepaid balance and its debit rule
//! - Transaction: Append-only ledger entry
//! - CallRecord: Normalized telephony call
//! - WebhookEvent: Validated inbound provider event

mod agent;
mod call_record;
mod credit;
mod ownership;
mod transaction;
mod webhook_error;
mod webhook_event;

pub use agent::*;
pub use call_record::*;
pub use credit::*;
pub use ownership::*;
pub use transaction::*;
pub use webhook_error::*;
pub use webhook_event::*;
