//! OpenAPI Documentation
//!
//! Centralized API documentation using utoipa.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::ErrorBody;
use crate::models::{
    AdjustCreditRequest, AdjustCreditResponse, AgentResponse, BackfillRequest, BackfillResponse,
    CallWebhookPayload, CallWebhookRequest, CreditBalanceResponse, TransactionResponse,
    UpdateAgentRequest, WebhookAck,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Callmeter API",
        version = "0.1.0",
        description = "Call webhook ingestion, prepaid credit ledger and admin API"
    ),
    paths(
        // Webhook
        super::webhook::receive_call_event,
        // Credit
        super::credit::adjust_credit,
        super::credit::get_balance,
        super::credit::list_transactions,
        // Agent
        super::agent::get_agent,
        super::agent::update_agent,
        // Backfill
        super::backfill::run_backfill,
    ),
    components(schemas(
        CallWebhookRequest,
        CallWebhookPayload,
        WebhookAck,
        AdjustCreditRequest,
        AdjustCreditResponse,
        CreditBalanceResponse,
        TransactionResponse,
        AgentResponse,
        UpdateAgentRequest,
        BackfillRequest,
        BackfillResponse,
        ErrorBody,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Webhook", description = "Inbound telephony events"),
        (name = "Credit", description = "Balances, adjustments and transaction history"),
        (name = "Agent", description = "Agent registry administration"),
        (name = "Backfill", description = "Replay of unbilled calls")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}
