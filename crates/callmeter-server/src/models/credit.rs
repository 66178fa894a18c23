//! Credit and Transaction DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use callmeter::{CreditBalance, Transaction};

use crate::application::AdjustmentOutcome;

/// Administrative balance adjustment
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustCreditRequest {
    pub user_id: Uuid,
    pub company_id: Uuid,
    /// Positive credits, negative debits
    #[schema(value_type = String, example = "25.00")]
    pub amount: Decimal,
    pub description: String,
    pub created_by: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustCreditResponse {
    pub user_id: Uuid,
    #[schema(value_type = String)]
    pub new_balance: Decimal,
    pub is_blocked: bool,
    /// Absent when the ledger entry could not be written
    pub transaction_id: Option<Uuid>,
}

impl From<AdjustmentOutcome> for AdjustCreditResponse {
    fn from(outcome: AdjustmentOutcome) -> Self {
        Self {
            user_id: outcome.user_id,
            new_balance: outcome.new_balance,
            is_blocked: outcome.is_blocked,
            transaction_id: outcome.transaction.map(|t| t.id),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreditBalanceResponse {
    pub user_id: Uuid,
    pub company_id: Option<Uuid>,
    #[schema(value_type = String)]
    pub balance: Decimal,
    #[schema(value_type = String)]
    pub warning_threshold: Decimal,
    #[schema(value_type = String)]
    pub critical_threshold: Decimal,
    pub is_blocked: bool,
    pub is_low: bool,
    pub is_critical: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<CreditBalance> for CreditBalanceResponse {
    fn from(balance: CreditBalance) -> Self {
        Self {
            is_low: balance.is_low(),
            is_critical: balance.is_critical(),
            user_id: balance.user_id,
            company_id: balance.company_id,
            balance: balance.balance,
            warning_threshold: balance.warning_threshold,
            critical_threshold: balance.critical_threshold,
            is_blocked: balance.is_blocked,
            updated_at: balance.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Uuid,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub transaction_type: String,
    pub description: String,
    pub call_id: Option<String>,
    #[schema(value_type = String)]
    pub balance_after: Decimal,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            user_id: tx.user_id,
            company_id: tx.company_id,
            amount: tx.amount,
            transaction_type: tx.transaction_type.to_string(),
            description: tx.description,
            call_id: tx.call_id,
            balance_after: tx.balance_after,
            created_by: tx.created_by,
            created_at: tx.created_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TransactionQuery {
    /// Page size (default 50, max 500)
    pub limit: Option<i64>,
}
