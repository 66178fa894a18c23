//! Backfill DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::BackfillReport;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BackfillRequest {
    /// Calls to scan (default 100)
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackfillResponse {
    pub scanned: usize,
    pub charged: usize,
    pub already_charged: usize,
    pub zero_cost: usize,
    pub skipped: usize,
    #[schema(value_type = String)]
    pub total_charged: Decimal,
}

impl From<BackfillReport> for BackfillResponse {
    fn from(report: BackfillReport) -> Self {
        Self {
            scanned: report.scanned,
            charged: report.charged,
            already_charged: report.already_charged,
            zero_cost: report.zero_cost,
            skipped: report.skipped,
            total_charged: report.total_charged,
        }
    }
}
