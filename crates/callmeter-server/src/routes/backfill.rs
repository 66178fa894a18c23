//! Backfill Route (admin)

use axum::{extract::State, routing::post, Json, Router};

use crate::error::ApiResult;
use crate::models::{BackfillRequest, BackfillResponse};
use crate::AppState;

/// Charge finished calls that were never billed
#[utoipa::path(
    post,
    path = "/admin/backfill",
    request_body = BackfillRequest,
    responses(
        (status = 200, description = "Backfill report", body = BackfillResponse),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "Backfill"
)]
pub async fn run_backfill(
    State(state): State<AppState>,
    body: Option<Json<BackfillRequest>>,
) -> ApiResult<Json<BackfillResponse>> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let report = state.backfill.run(request.limit).await?;
    Ok(Json(report.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/admin/backfill", post(run_backfill))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use callmeter::{CallRecord, WebhookEvent};

    use crate::application::testing::{dec, TestStack};
    use crate::auth::AuthKeys;

    /// `count` finished 60s calls on one 0.01/min agent, never billed
    fn seed_calls(stack: &TestStack, count: usize) {
        let agent = stack.seed_agent("agent_1", "0.01");
        let owner = stack.seed_owner(&agent);
        stack.store.set_balance(owner.user_id, owner.company_id, dec("100.00"));

        for i in 0..count {
            let event = WebhookEvent::from_value(json!({
                "event": "call_ended",
                "call": {"call_id": format!("call_{i:03}"), "agent_id": "agent_1", "duration": 60}
            }))
            .unwrap();
            stack.store.insert_call(CallRecord::from_event(&event, &agent, owner, None));
        }
    }

    async fn post_backfill(stack: &TestStack, body: Option<Value>) -> (StatusCode, Value) {
        let keys = AuthKeys {
            api_key: Some("admin-key".to_string()),
            webhook_secret: None,
        };
        let app = crate::build_router(crate::AppState::from_stack(stack), Arc::new(keys));

        let request = Request::builder()
            .method("POST")
            .uri("/admin/backfill")
            .header(header::AUTHORIZATION, "Bearer admin-key");
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_absent_body_uses_default_limit() {
        let stack = TestStack::new();
        seed_calls(&stack, 101);

        let (status, body) = post_backfill(&stack, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scanned"], 100);
        assert_eq!(body["charged"], 100);
        assert_eq!(body["totalCharged"], "1.0000");

        let (status, body) = post_backfill(&stack, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scanned"], 1);
        assert_eq!(stack.store.transactions().len(), 101);
    }

    #[tokio::test]
    async fn test_explicit_limit() {
        let stack = TestStack::new();
        seed_calls(&stack, 5);

        let (status, body) = post_backfill(&stack, Some(json!({"limit": 2}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scanned"], 2);
        assert_eq!(body["alreadyCharged"], 0);
        assert_eq!(body["zeroCost"], 0);
        assert_eq!(body["skipped"], 0);
    }
}
