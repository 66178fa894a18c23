//! Request authentication
//!
//! Admin routes use a Bearer API key. The inbound webhook accepts either
//! the shared secret in `X-Webhook-Secret` or an HMAC-SHA256 of the raw
//! body in `X-Webhook-Signature: sha256=<hex>`. An unset key disables the
//! corresponding check (development).

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";
pub const WEBHOOK_SIGNATURE_HEADER: &str = "x-webhook-signature";

/// Largest webhook body buffered for signature checks
const MAX_WEBHOOK_BODY: usize = 2 * 1024 * 1024;

/// Credentials checked by the middlewares
#[derive(Debug, Clone, Default)]
pub struct AuthKeys {
    pub api_key: Option<String>,
    pub webhook_secret: Option<String>,
}

/// Bearer token check for admin routes
pub async fn admin_auth(
    State(keys): State<Arc<AuthKeys>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let api_key = match keys.api_key.as_deref() {
        Some(key) if !key.is_empty() => key,
        _ => {
            // No API key configured = auth disabled (for development)
            tracing::warn!("No API key configured, authentication disabled");
            return Ok(next.run(request).await);
        }
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) if constant_time_eq(token.as_bytes(), api_key.as_bytes()) => {
            Ok(next.run(request).await)
        }
        Some(_) => {
            tracing::warn!("Invalid API key attempted");
            Err(ApiError::Unauthorized("Invalid API key".to_string()))
        }
        None => {
            tracing::warn!("Missing or malformed Authorization header");
            Err(ApiError::Unauthorized("Missing bearer token".to_string()))
        }
    }
}

/// Shared-secret or signature check for the provider webhook
pub async fn webhook_auth(
    State(keys): State<Arc<AuthKeys>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let secret = match keys.webhook_secret.as_deref() {
        Some(secret) if !secret.is_empty() => secret,
        _ => {
            tracing::warn!("No webhook secret configured, webhook authentication disabled");
            return Ok(next.run(request).await);
        }
    };

    let headers = request.headers();
    let provided_secret = headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);
    let signature = headers
        .get(WEBHOOK_SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    if let Some(provided) = provided_secret {
        if constant_time_eq(provided.as_bytes(), secret.as_bytes()) {
            return Ok(next.run(request).await);
        }
        tracing::warn!("Invalid webhook secret attempted");
        return Err(ApiError::Unauthorized("Invalid webhook secret".to_string()));
    }

    let Some(signature) = signature else {
        tracing::warn!("Webhook without credentials");
        return Err(ApiError::Unauthorized(
            "Missing webhook secret or signature".to_string(),
        ));
    };

    // The signature covers the raw body, so buffer it and hand it back on
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_WEBHOOK_BODY)
        .await
        .map_err(|e| ApiError::BadRequest(format!("Unreadable body: {}", e)))?;

    if !verify_signature(secret, &bytes, &signature) {
        tracing::warn!("Invalid webhook signature attempted");
        return Err(ApiError::Unauthorized("Invalid webhook signature".to_string()));
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(request).await)
}

/// Verify `sha256=<hex>` (prefix optional) against the body
fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let hex_digest = signature.trim();
    let hex_digest = hex_digest.strip_prefix("sha256=").unwrap_or(hex_digest);
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::post, Router};
    use tower::ServiceExt;

    fn sign(secret: &str, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(payload);
        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }

    fn app(keys: AuthKeys) -> Router {
        let keys = Arc::new(keys);
        let webhook = Router::new()
            .route("/webhook", post(|body: String| async move { body }))
            .layer(middleware::from_fn_with_state(keys.clone(), webhook_auth));
        let admin = Router::new()
            .route("/admin", post(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(keys, admin_auth));
        webhook.merge(admin)
    }

    fn keys() -> AuthKeys {
        AuthKeys {
            api_key: Some("admin-key".to_string()),
            webhook_secret: Some("hook-secret".to_string()),
        }
    }

    async fn send(app: Router, request: Request) -> (StatusCode, String) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    fn post_to(uri: &str) -> axum::http::request::Builder {
        axum::http::Request::builder().method("POST").uri(uri)
    }

    #[tokio::test]
    async fn test_webhook_secret_header() {
        let ok = post_to("/webhook")
            .header(WEBHOOK_SECRET_HEADER, "hook-secret")
            .body(Body::from("{}"))
            .unwrap();
        assert_eq!(send(app(keys()), ok).await.0, StatusCode::OK);

        let wrong = post_to("/webhook")
            .header(WEBHOOK_SECRET_HEADER, "nope")
            .body(Body::from("{}"))
            .unwrap();
        assert_eq!(send(app(keys()), wrong).await.0, StatusCode::UNAUTHORIZED);

        let missing = post_to("/webhook").body(Body::from("{}")).unwrap();
        let (status, body) = send(app(keys()), missing).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("\"status\":401"));
    }

    #[tokio::test]
    async fn test_webhook_signature_preserves_body() {
        let payload = br#"{"event":"call_ended"}"#;
        let request = post_to("/webhook")
            .header(WEBHOOK_SIGNATURE_HEADER, sign("hook-secret", payload))
            .body(Body::from(payload.to_vec()))
            .unwrap();

        let (status, body) = send(app(keys()), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_bytes(), payload);

        let tampered = post_to("/webhook")
            .header(WEBHOOK_SIGNATURE_HEADER, sign("hook-secret", payload))
            .body(Body::from(r#"{"event":"call_started"}"#))
            .unwrap();
        assert_eq!(send(app(keys()), tampered).await.0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_bearer_token() {
        let ok = post_to("/admin")
            .header(header::AUTHORIZATION, "Bearer admin-key")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(app(keys()), ok).await.0, StatusCode::OK);

        let wrong = post_to("/admin")
            .header(header::AUTHORIZATION, "Bearer hook-secret")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(app(keys()), wrong).await.0, StatusCode::UNAUTHORIZED);

        let basic = post_to("/admin")
            .header(header::AUTHORIZATION, "Basic YWRtaW4=")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(app(keys()), basic).await.0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unconfigured_keys_disable_checks() {
        let admin = post_to("/admin").body(Body::empty()).unwrap();
        assert_eq!(send(app(AuthKeys::default()), admin).await.0, StatusCode::OK);

        let webhook = post_to("/webhook").body(Body::from("{}")).unwrap();
        assert_eq!(send(app(AuthKeys::default()), webhook).await.0, StatusCode::OK);
    }

    #[test]
    fn test_signature_prefix_optional() {
        let signature = sign("s", b"payload");
        assert!(verify_signature("s", b"payload", &signature));
        assert!(verify_signature("s", b"payload", &signature["sha256=".len()..]));
        assert!(!verify_signature("s", b"payload", "sha256=zz"));
        assert!(!verify_signature("other", b"payload", &signature));
    }
}
