//! Agent Routes (admin)
//!
//! `GET` looks an agent up by the provider's id; `PUT` addresses the
//! internal id. There is no delete: deactivate instead.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use callmeter::AgentStatus;

use crate::error::{ApiError, ApiResult};
use crate::models::{AgentResponse, UpdateAgentRequest};
use crate::AppState;

/// Look up an agent by external id
#[utoipa::path(
    get,
    path = "/admin/agents/{id}",
    params(
        ("id" = String, Path, description = "Provider-side agent id")
    ),
    responses(
        (status = 200, description = "Agent found", body = AgentResponse),
        (status = 404, description = "Agent not found", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "Agent"
)]
pub async fn get_agent(
    State(state): State<AppState>,
    Path(external_id): Path<String>,
) -> ApiResult<Json<AgentResponse>> {
    let agent = state.agents.find(&external_id).await?;
    Ok(Json(agent.into()))
}

/// Update rate and/or status
#[utoipa::path(
    put,
    path = "/admin/agents/{id}",
    params(
        ("id" = Uuid, Path, description = "Internal agent id")
    ),
    request_body = UpdateAgentRequest,
    responses(
        (status = 200, description = "Agent updated", body = AgentResponse),
        (status = 400, description = "Negative rate or unknown status", body = ErrorBody),
        (status = 404, description = "Agent not found", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "Agent"
)]
pub async fn update_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateAgentRequest>,
) -> ApiResult<Json<AgentResponse>> {
    let id: Uuid = id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid agent id: {}", id)))?;

    let status = request
        .status
        .as_deref()
        .map(str::parse::<AgentStatus>)
        .transpose()
        .map_err(ApiError::BadRequest)?;

    if request.rate_per_minute.is_none() && status.is_none() {
        return Err(ApiError::BadRequest(
            "Nothing to update: set ratePerMinute and/or status".to_string(),
        ));
    }

    let agent = state
        .agents
        .update(id, request.rate_per_minute, status)
        .await?;
    Ok(Json(agent.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/admin/agents/:id", get(get_agent).put(update_agent))
}
