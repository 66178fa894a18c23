//! Callmeter Admin API Client

use anyhow::{bail, Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// API Client for the Callmeter admin endpoints
pub struct CallmeterClient {
    client: Client,
    base_url: String,
    api_key: String,
}

// ============================================
// API Response Types
// ============================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub user_id: Uuid,
    pub company_id: Option<Uuid>,
    pub balance: Decimal,
    pub warning_threshold: Decimal,
    pub critical_threshold: Decimal,
    pub is_blocked: bool,
    pub is_low: bool,
    pub is_critical: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustResponse {
    pub new_balance: Decimal,
    pub is_blocked: bool,
    pub transaction_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: Uuid,
    pub amount: Decimal,
    pub transaction_type: String,
    pub description: String,
    pub call_id: Option<String>,
    pub balance_after: Decimal,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillResponse {
    pub scanned: usize,
    pub charged: usize,
    pub already_charged: usize,
    pub zero_cost: usize,
    pub skipped: usize,
    pub total_charged: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub id: Uuid,
    pub external_id: String,
    pub name: String,
    pub status: String,
    pub rate_per_minute: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustRequest {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub amount: Decimal,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAgentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_per_minute: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
struct BackfillRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<i64>,
}

impl CallmeterClient {
    /// Create a new API client
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Test connection with health check
    pub async fn health(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        let resp = self.client.get(&url).send().await?;
        Ok(resp.status().is_success())
    }

    /// Current balance of a user
    pub async fn get_balance(&self, user_id: Uuid) -> Result<BalanceResponse> {
        let url = format!("{}/admin/credits/{}", self.base_url, user_id);
        self.send(self.client.get(&url)).await
    }

    /// Credit (positive) or debit (negative) a user's balance
    pub async fn adjust(&self, request: &AdjustRequest) -> Result<AdjustResponse> {
        let url = format!("{}/admin/credits/adjust", self.base_url);
        self.send(self.client.post(&url).json(request)).await
    }

    /// Ledger entries, newest first
    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<TransactionResponse>> {
        let url = format!("{}/admin/credits/{}/transactions", self.base_url, user_id);
        let mut request = self.client.get(&url);
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        self.send(request).await
    }

    /// Charge finished calls that were never billed
    pub async fn backfill(&self, limit: Option<i64>) -> Result<BackfillResponse> {
        let url = format!("{}/admin/backfill", self.base_url);
        self.send(self.client.post(&url).json(&BackfillRequest { limit }))
            .await
    }

    /// Look up an agent by the provider's identifier
    pub async fn get_agent(&self, external_id: &str) -> Result<AgentResponse> {
        let url = format!("{}/admin/agents/{}", self.base_url, external_id);
        self.send(self.client.get(&url)).await
    }

    /// Change an agent's rate or status
    pub async fn update_agent(
        &self,
        id: Uuid,
        request: &UpdateAgentRequest,
    ) -> Result<AgentResponse> {
        let url = format!("{}/admin/agents/{}", self.base_url, id);
        self.send(self.client.put(&url).json(request)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let resp = request
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .context("Failed to connect to Callmeter API")?;

        Self::parse(resp).await
    }

    async fn parse<T: DeserializeOwned>(resp: Response) -> Result<T> {
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("API error ({}): {}", status, body);
        }

        resp.json().await.context("Failed to parse response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_adjust_request_wire_format() {
        let request = AdjustRequest {
            user_id: Uuid::nil(),
            company_id: Uuid::nil(),
            amount: Decimal::from_str("-2.50").unwrap(),
            description: "Goodwill".to_string(),
            created_by: None,
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["amount"], json!("-2.50"));
        assert_eq!(value["companyId"], json!(Uuid::nil().to_string()));
        assert!(value.get("createdBy").is_none());
    }

    #[test]
    fn test_balance_response_parses_server_body() {
        let body = json!({
            "userId": Uuid::nil(),
            "companyId": null,
            "balance": "8.4000",
            "warningThreshold": "10.00",
            "criticalThreshold": "2.00",
            "isBlocked": false,
            "isLow": true,
            "isCritical": false,
            "updatedAt": "2025-01-01T00:00:00Z"
        });
        let balance: BalanceResponse = serde_json::from_value(body).unwrap();

        assert_eq!(balance.balance, Decimal::from_str("8.40").unwrap());
        assert!(balance.is_low);
        assert_eq!(balance.company_id, None);
    }
}
