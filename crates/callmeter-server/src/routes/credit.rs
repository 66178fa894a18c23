//! Credit Routes (admin)
//!
//! Balance lookups, history, and manual adjustments.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use callmeter::Owner;

use crate::error::ApiResult;
use crate::models::{
    AdjustCreditRequest, AdjustCreditResponse, CreditBalanceResponse, TransactionQuery,
    TransactionResponse,
};
use crate::AppState;

/// Credit or debit a user's balance
#[utoipa::path(
    post,
    path = "/admin/credits/adjust",
    request_body = AdjustCreditRequest,
    responses(
        (status = 200, description = "Adjustment applied", body = AdjustCreditResponse),
        (status = 400, description = "Zero amount or missing description", body = ErrorBody),
        (status = 404, description = "No balance to debit", body = ErrorBody),
        (status = 409, description = "Account blocked", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "Credit"
)]
pub async fn adjust_credit(
    State(state): State<AppState>,
    Json(request): Json<AdjustCreditRequest>,
) -> ApiResult<Json<AdjustCreditResponse>> {
    let owner = Owner {
        user_id: request.user_id,
        company_id: request.company_id,
    };
    let outcome = state
        .adjustments
        .adjust(owner, request.amount, request.description, request.created_by)
        .await?;

    Ok(Json(outcome.into()))
}

/// Current balance for a user
#[utoipa::path(
    get,
    path = "/admin/credits/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Balance found", body = CreditBalanceResponse),
        (status = 404, description = "No balance row", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "Credit"
)]
pub async fn get_balance(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<CreditBalanceResponse>> {
    let balance = state.ledger.balance(user_id).await?;
    Ok(Json(balance.into()))
}

/// Transaction history, newest first
#[utoipa::path(
    get,
    path = "/admin/credits/{user_id}/transactions",
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
        TransactionQuery
    ),
    responses(
        (status = 200, description = "Transactions", body = Vec<TransactionResponse>)
    ),
    security(("bearer" = [])),
    tag = "Credit"
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<TransactionQuery>,
) -> ApiResult<Json<Vec<TransactionResponse>>> {
    let transactions = state.recorder.list_for_user(user_id, query.limit).await?;
    Ok(Json(
        transactions.into_iter().map(TransactionResponse::from).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/credits/adjust", post(adjust_credit))
        .route("/admin/credits/:user_id", get(get_balance))
        .route("/admin/credits/:user_id/transactions", get(list_transactions))
}
