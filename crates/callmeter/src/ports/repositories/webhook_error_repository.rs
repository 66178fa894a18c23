//! Webhook Error Repository Port

use async_trait::async_trait;

use crate::domain::{errors::DomainError, WebhookErrorLog};

/// Sink for rejected webhook events
#[async_trait]
pub trait WebhookErrorRepository: Send + Sync {
    async fn record(&self, entry: &WebhookErrorLog) -> Result<(), DomainError>;
}
