use std::sync::Arc;

use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod adapters;
mod application;
mod auth;
mod config;
mod error;
mod models;
mod routes;

use adapters::{
    PgAgentRepository, PgCallRecordRepository, PgCreditBalanceRepository, PgOwnershipRepository,
    PgTransactionRepository, PgWebhookErrorRepository,
};
use application::{
    AgentResolver, BackfillService, CallBiller, CreditAdjustmentService, CreditLedger,
    OwnershipResolver, TransactionRecorder, WebhookProcessor,
};
use auth::AuthKeys;
use config::ServerConfig;

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<WebhookProcessor>,
    pub agents: Arc<AgentResolver>,
    pub ledger: Arc<CreditLedger>,
    pub recorder: Arc<TransactionRecorder>,
    pub adjustments: Arc<CreditAdjustmentService>,
    pub backfill: Arc<BackfillService>,
}

impl AppState {
    /// Wire every service over the Postgres adapters
    fn from_pool(pool: PgPool, config: &ServerConfig) -> Self {
        let agent_repo = Arc::new(PgAgentRepository::new(pool.clone()));
        let ownership_repo = Arc::new(PgOwnershipRepository::new(pool.clone()));
        let credit_repo = Arc::new(PgCreditBalanceRepository::new(pool.clone()));
        let transaction_repo = Arc::new(PgTransactionRepository::new(pool.clone()));
        let call_repo = Arc::new(PgCallRecordRepository::new(pool.clone()));
        let error_repo = Arc::new(PgWebhookErrorRepository::new(pool));

        let agents = Arc::new(AgentResolver::new(agent_repo));
        let owners = Arc::new(OwnershipResolver::new(ownership_repo));
        let ledger = Arc::new(CreditLedger::new(credit_repo, config.credit_defaults));
        let recorder = Arc::new(TransactionRecorder::new(transaction_repo));
        let biller = Arc::new(CallBiller::new(ledger.clone(), recorder.clone()));

        Self {
            processor: Arc::new(WebhookProcessor::new(
                agents.clone(),
                owners,
                call_repo.clone(),
                error_repo,
                biller.clone(),
            )),
            backfill: Arc::new(BackfillService::new(call_repo, agents.clone(), biller)),
            adjustments: Arc::new(CreditAdjustmentService::new(ledger.clone(), recorder.clone())),
            agents,
            ledger,
            recorder,
        }
    }

    #[cfg(test)]
    fn from_stack(stack: &application::testing::TestStack) -> Self {
        Self {
            processor: stack.processor.clone(),
            agents: stack.agents.clone(),
            ledger: stack.ledger.clone(),
            recorder: stack.recorder.clone(),
            adjustments: stack.adjustments.clone(),
            backfill: stack.backfill.clone(),
        }
    }
}

#[derive(Serialize)]
struct HealthCheck {
    status: String,
    message: String,
    version: String,
}

async fn health_check() -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "ok".to_string(),
        message: "Callmeter API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Full router: public health and docs, the authenticated webhook, and the
/// bearer-protected admin API
fn build_router(state: AppState, keys: Arc<AuthKeys>) -> Router {
    let webhook_routes = routes::webhook::router()
        .route_layer(middleware::from_fn_with_state(keys.clone(), auth::webhook_auth));

    let admin_routes = Router::new()
        .merge(routes::credit::router())
        .merge(routes::agent::router())
        .merge(routes::backfill::router())
        .route_layer(middleware::from_fn_with_state(keys, auth::admin_auth));

    let openapi = routes::swagger::ApiDoc::openapi();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .route("/health", get(health_check))
        .merge(webhook_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[shuttle_runtime::main]
async fn main(
    #[shuttle_shared_db::Postgres] pool: PgPool,
    #[shuttle_runtime::Secrets] secrets: shuttle_runtime::SecretStore,
) -> shuttle_axum::ShuttleAxum {
    tracing::info!("📞 Callmeter API initializing...");

    let config = ServerConfig::from_lookup(|key| secrets.get(key));

    if config.api_key.is_some() {
        tracing::info!("🔐 API key authentication enabled");
    } else {
        tracing::warn!("⚠️  No {} set - admin authentication disabled", config::API_KEY);
    }

    if config.webhook_secret.is_some() {
        tracing::info!("🔐 Webhook authentication enabled");
    } else {
        tracing::warn!(
            "⚠️  No {} set - webhook authentication disabled",
            config::WEBHOOK_SECRET
        );
    }

    tracing::info!(
        warning_threshold = %config.credit_defaults.warning_threshold,
        critical_threshold = %config.credit_defaults.critical_threshold,
        "💳 Default credit thresholds"
    );

    // Run migrations
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("✅ Database migrations completed");

    let keys = Arc::new(AuthKeys {
        api_key: config.api_key.clone(),
        webhook_secret: config.webhook_secret.clone(),
    });
    let state = AppState::from_pool(pool, &config);
    let router = build_router(state, keys);

    tracing::info!("📚 Swagger UI: /swagger-ui");
    tracing::info!("✅ Callmeter API ready");

    Ok(router.into())
}
