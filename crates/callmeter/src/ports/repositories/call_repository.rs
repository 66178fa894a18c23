//! Call Record Repository Port

use async_trait::async_trait;

use crate::domain::{errors::DomainError, CallRecord};

/// Repository interface for normalized call records
#[async_trait]
pub trait CallRecordRepository: Send + Sync {
    /// Insert or merge by call id, following [`CallRecord::merge`].
    /// Returns the stored row.
    async fn upsert(&self, record: &CallRecord) -> Result<CallRecord, DomainError>;

    /// Find a call by provider call id
    async fn find(&self, call_id: &str) -> Result<Option<CallRecord>, DomainError>;

    /// Finished calls with a positive duration and no claimed charge that
    /// can be charged now: the agent's rate is positive and the owner has an
    /// unblocked balance row. Oldest first.
    async fn find_unbilled(&self, limit: i64) -> Result<Vec<CallRecord>, DomainError>;
}
