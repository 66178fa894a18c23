//! Callmeter Data Models
//!
//! - Call webhook: inbound provider events
//! - Credit: balances, adjustments, transactions
//! - Agent: registry lookups and updates
//! - Backfill: replay of unbilled calls

mod agent;
mod backfill;
mod call_event;
mod credit;

pub use agent::*;
pub use backfill::*;
pub use call_event::*;
pub use credit::*;
