//! Application Layer (Use Cases)
//!
//! Orchestrates domain operations and coordinates between
//! repositories.

mod agent_resolver;
mod backfill;
mod call_biller;
mod credit_adjustment;
mod credit_ledger;
mod ownership_resolver;
mod transaction_recorder;
mod webhook_processor;

pub use agent_resolver::AgentResolver;
pub use backfill::{BackfillReport, BackfillService};
pub use call_biller::{BillingOutcome, CallBiller};
pub use credit_adjustment::{AdjustmentOutcome, CreditAdjustmentService};
pub use credit_ledger::CreditLedger;
pub use ownership_resolver::OwnershipResolver;
pub use transaction_recorder::TransactionRecorder;
pub use webhook_processor::{ProcessOutcome, WebhookProcessor};

#[cfg(test)]
pub(crate) mod testing {
    //! Fully wired services over one in-memory store

    use std::str::FromStr;
    use std::sync::Arc;

    use rust_decimal::Decimal;
    use uuid::Uuid;

    use callmeter::{Agent, CreditDefaults, Owner, OwnershipMapping, WebhookEvent};

    use super::*;
    use crate::adapters::memory::MemoryStore;

    pub fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    pub fn event(body: serde_json::Value) -> WebhookEvent {
        WebhookEvent::from_value(body).unwrap()
    }

    pub struct TestStack {
        pub store: Arc<MemoryStore>,
        pub agents: Arc<AgentResolver>,
        pub ledger: Arc<CreditLedger>,
        pub recorder: Arc<TransactionRecorder>,
        pub processor: Arc<WebhookProcessor>,
        pub backfill: Arc<BackfillService>,
        pub adjustments: Arc<CreditAdjustmentService>,
    }

    impl TestStack {
        pub fn new() -> Self {
            let store = Arc::new(MemoryStore::new());
            let agents = Arc::new(AgentResolver::new(store.clone()));
            let owners = Arc::new(OwnershipResolver::new(store.clone()));
            let ledger = Arc::new(CreditLedger::new(store.clone(), CreditDefaults::default()));
            let recorder = Arc::new(TransactionRecorder::new(store.clone()));
            let biller = Arc::new(CallBiller::new(ledger.clone(), recorder.clone()));
            let processor = Arc::new(WebhookProcessor::new(
                agents.clone(),
                owners,
                store.clone(),
                store.clone(),
                biller.clone(),
            ));
            let backfill = Arc::new(BackfillService::new(store.clone(), agents.clone(), biller));
            let adjustments = Arc::new(CreditAdjustmentService::new(ledger.clone(), recorder.clone()));

            Self {
                store,
                agents,
                ledger,
                recorder,
                processor,
                backfill,
                adjustments,
            }
        }

        pub fn seed_agent(&self, external_id: &str, rate_per_minute: &str) -> Agent {
            self.store.add_agent(Agent::new(
                external_id.to_string(),
                format!("Agent {external_id}"),
                dec(rate_per_minute),
            ))
        }

        /// Primary mapping for a fresh user and company
        pub fn seed_owner(&self, agent: &Agent) -> Owner {
            let mapping = OwnershipMapping::new(Uuid::new_v4(), Uuid::new_v4(), agent.id, true);
            let owner = mapping.owner();
            self.store.add_mapping(mapping);
            owner
        }
    }
}
