//! In-memory repository implementations for tests
//!
//! All state sits behind one mutex, so a debit and its charge claim happen
//! under a single guard just like the single transaction in Postgres.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use callmeter::{
    Agent, AgentRepository, CallRecord, CallRecordRepository, ChargeKey, CreditBalance,
    CreditBalanceRepository, CreditDefaults, CreditOutcome, DebitResult, DomainError,
    NewTransaction, OwnershipMapping, OwnershipRepository, Transaction, TransactionRepository,
    TransactionType, WebhookErrorLog, WebhookErrorRepository,
};

#[derive(Default)]
struct State {
    agents: HashMap<Uuid, Agent>,
    mappings: Vec<OwnershipMapping>,
    balances: HashMap<Uuid, CreditBalance>,
    claims: HashSet<ChargeKey>,
    transactions: Vec<Transaction>,
    calls: HashMap<String, CallRecord>,
    webhook_errors: Vec<WebhookErrorLog>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_transaction_inserts: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn add_agent(&self, agent: Agent) -> Agent {
        self.lock().agents.insert(agent.id, agent.clone());
        agent
    }

    pub fn add_mapping(&self, mapping: OwnershipMapping) {
        self.lock().mappings.push(mapping);
    }

    pub fn set_balance(&self, user_id: Uuid, company_id: Uuid, balance: Decimal) {
        let mut row = CreditBalance::provision(user_id, Some(company_id), CreditDefaults::default());
        row.balance = balance;
        self.lock().balances.insert(user_id, row);
    }

    pub fn balance(&self, user_id: Uuid) -> Option<CreditBalance> {
        self.lock().balances.get(&user_id).cloned()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.lock().transactions.clone()
    }

    pub fn call(&self, call_id: &str) -> Option<CallRecord> {
        self.lock().calls.get(call_id).cloned()
    }

    /// Store a call record as-is, bypassing the webhook path
    pub fn insert_call(&self, record: CallRecord) {
        self.lock().calls.insert(record.call_id.clone(), record);
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn webhook_errors(&self) -> Vec<WebhookErrorLog> {
        self.lock().webhook_errors.clone()
    }

    /// Make every subsequent transaction insert fail
    pub fn fail_transaction_inserts(&self, fail: bool) {
        self.fail_transaction_inserts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl AgentRepository for MemoryStore {
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Agent>, DomainError> {
        Ok(self
            .lock()
            .agents
            .values()
            .find(|a| a.external_id == external_id)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Agent>, DomainError> {
        Ok(self.lock().agents.get(&id).cloned())
    }

    async fn update(&self, agent: &Agent) -> Result<Agent, DomainError> {
        let mut state = self.lock();
        let stored = state
            .agents
            .get_mut(&agent.id)
            .ok_or_else(|| DomainError::not_found("Agent", agent.id))?;
        *stored = agent.clone();
        Ok(stored.clone())
    }
}

#[async_trait]
impl OwnershipRepository for MemoryStore {
    async fn find_by_agent(&self, agent_id: Uuid) -> Result<Vec<OwnershipMapping>, DomainError> {
        Ok(self
            .lock()
            .mappings
            .iter()
            .filter(|m| m.agent_id == agent_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CreditBalanceRepository for MemoryStore {
    async fn find(&self, user_id: Uuid) -> Result<Option<CreditBalance>, DomainError> {
        Ok(self.balance(user_id))
    }

    async fn debit(
        &self,
        user_id: Uuid,
        amount: Decimal,
        charge: Option<&ChargeKey>,
    ) -> Result<DebitResult, DomainError> {
        let mut state = self.lock();
        if let Some(key) = charge {
            if state.claims.contains(key) {
                return Ok(DebitResult::AlreadyCharged);
            }
        }

        let row = state
            .balances
            .get_mut(&user_id)
            .ok_or(DomainError::BalanceMissing { user_id })?;
        let outcome = row.apply_debit(amount)?;

        if let Some(key) = charge {
            state.claims.insert(key.clone());
        }
        Ok(DebitResult::Applied(outcome))
    }

    async fn credit(
        &self,
        user_id: Uuid,
        company_id: Uuid,
        amount: Decimal,
        defaults: CreditDefaults,
    ) -> Result<CreditOutcome, DomainError> {
        let mut state = self.lock();
        let created = !state.balances.contains_key(&user_id);
        let row = state
            .balances
            .entry(user_id)
            .or_insert_with(|| CreditBalance::provision(user_id, Some(company_id), defaults));
        let mut outcome = row.apply_credit(amount)?;
        outcome.created = created;
        Ok(outcome)
    }

    async fn is_charged(&self, key: &ChargeKey) -> Result<bool, DomainError> {
        Ok(self.lock().claims.contains(key))
    }
}

#[async_trait]
impl TransactionRepository for MemoryStore {
    async fn insert(&self, transaction: &NewTransaction) -> Result<Transaction, DomainError> {
        if self.fail_transaction_inserts.load(Ordering::SeqCst) {
            return Err(DomainError::Repository("transactions unavailable".to_string()));
        }

        let mut state = self.lock();
        let duplicate = transaction.transaction_type == TransactionType::CallCharge
            && state.transactions.iter().any(|t| {
                t.transaction_type == TransactionType::CallCharge && t.call_id == transaction.call_id
            });
        if duplicate {
            return Err(DomainError::Conflict(format!(
                "call_charge already recorded for call {:?}",
                transaction.call_id
            )));
        }

        let stored = transaction.clone().into_transaction(Utc::now());
        state.transactions.push(stored.clone());
        Ok(stored)
    }

    async fn find_charge_for_call(&self, call_id: &str) -> Result<Option<Transaction>, DomainError> {
        Ok(self
            .lock()
            .transactions
            .iter()
            .find(|t| {
                t.transaction_type == TransactionType::CallCharge
                    && t.call_id.as_deref() == Some(call_id)
            })
            .cloned())
    }

    async fn list_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<Transaction>, DomainError> {
        Ok(self
            .lock()
            .transactions
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CallRecordRepository for MemoryStore {
    async fn upsert(&self, record: &CallRecord) -> Result<CallRecord, DomainError> {
        let mut state = self.lock();
        let merged = match state.calls.remove(&record.call_id) {
            Some(existing) => existing.merge(record.clone()),
            None => record.clone(),
        };
        state.calls.insert(merged.call_id.clone(), merged.clone());
        Ok(merged)
    }

    async fn find(&self, call_id: &str) -> Result<Option<CallRecord>, DomainError> {
        Ok(self.call(call_id))
    }

    async fn find_unbilled(&self, limit: i64) -> Result<Vec<CallRecord>, DomainError> {
        let state = self.lock();
        let mut calls: Vec<CallRecord> = state
            .calls
            .values()
            .filter(|c| c.is_billable())
            .filter(|c| !state.claims.contains(&ChargeKey::call_charge(c.call_id.clone())))
            .filter(|c| {
                state
                    .agents
                    .get(&c.agent_id)
                    .is_some_and(|a| a.rate_per_minute > Decimal::ZERO)
            })
            .filter(|c| state.balances.get(&c.user_id).is_some_and(|b| !b.is_blocked))
            .cloned()
            .collect();
        calls.sort_by(|a, b| (a.created_at, &a.call_id).cmp(&(b.created_at, &b.call_id)));
        calls.truncate(limit.max(0) as usize);
        Ok(calls)
    }
}

#[async_trait]
impl WebhookErrorRepository for MemoryStore {
    async fn record(&self, entry: &WebhookErrorLog) -> Result<(), DomainError> {
        self.lock().webhook_errors.push(entry.clone());
        Ok(())
    }
}
