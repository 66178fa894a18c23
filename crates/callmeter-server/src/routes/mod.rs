//! Callmeter API Routes
//!
//! - /webhooks/calls (alias /webhook) - Provider call events
//! - /admin/credits - Balances, adjustments, transaction history
//! - /admin/agents - Agent lookup, rate and status
//! - /admin/backfill - Charge finished calls that were never billed

pub mod agent;
pub mod backfill;
pub mod credit;
pub mod swagger;
pub mod webhook;
