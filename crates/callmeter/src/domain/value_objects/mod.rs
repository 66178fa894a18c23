//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod agent_status;
mod call_event_kind;
mod call_status;
mod transaction_type;

pub use agent_status::*;
pub use call_event_kind::*;
pub use call_status::*;
pub use transaction_type::*;
