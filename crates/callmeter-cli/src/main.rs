//! Callmeter CLI - credit administration
//!
//! Thin client over the admin API: balances, adjustments, ledger history,
//! billing backfill and agent rates.

mod api;
mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::Password;
use rust_decimal::Decimal;
use uuid::Uuid;

use api::{AdjustRequest, CallmeterClient, UpdateAgentRequest};
use config::Config;

#[derive(Parser)]
#[command(name = "callmeter")]
#[command(about = "Callmeter CLI - credit balances and call billing", long_about = None)]
#[command(version)]
struct Cli {
    /// Log HTTP activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Login and store API key
    Login {
        /// API key (will prompt if not provided)
        #[arg(short, long)]
        key: Option<String>,
        /// Server URL to store alongside the key
        #[arg(long)]
        url: Option<String>,
    },

    /// Show a user's credit balance
    Balance {
        user_id: Uuid,
    },

    /// Add credits to a user
    Credit {
        user_id: Uuid,
        company_id: Uuid,
        #[arg(value_parser = parse_positive_amount)]
        amount: Decimal,
        /// Ledger description
        #[arg(short, long, default_value = "Manual credit")]
        description: String,
    },

    /// Remove credits from a user
    Debit {
        user_id: Uuid,
        company_id: Uuid,
        #[arg(value_parser = parse_positive_amount)]
        amount: Decimal,
        /// Ledger description
        #[arg(short, long, default_value = "Manual debit")]
        description: String,
    },

    /// List a user's ledger entries, newest first
    Transactions {
        user_id: Uuid,
        /// Max entries
        #[arg(short = 'n', long)]
        limit: Option<i64>,
    },

    /// Charge finished calls that were never billed
    Backfill {
        /// Calls to scan
        #[arg(short, long)]
        limit: Option<i64>,
    },

    /// Agent operations
    Agent {
        #[command(subcommand)]
        action: AgentAction,
    },

    /// Show current configuration
    Config,
}

#[derive(Subcommand)]
enum AgentAction {
    /// Show an agent by its provider id
    Show {
        external_id: String,
    },
    /// Change the per-minute rate
    SetRate {
        /// Internal agent id
        id: Uuid,
        rate: Decimal,
    },
    /// Activate or deactivate an agent
    SetStatus {
        /// Internal agent id
        id: Uuid,
        /// active or inactive
        status: String,
    },
}

/// Direction comes from the subcommand, so amounts must be positive
fn parse_positive_amount(value: &str) -> Result<Decimal, String> {
    let amount: Decimal = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid amount '{}': {}", value, e))?;
    if amount <= Decimal::ZERO {
        return Err(format!("amount must be greater than zero, got {}", amount));
    }
    Ok(amount)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "callmeter=debug,reqwest=debug".into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Login { key, url } => cmd_login(key, url).await,
        Commands::Balance { user_id } => cmd_balance(user_id).await,
        Commands::Credit { user_id, company_id, amount, description } => {
            cmd_adjust(user_id, company_id, amount, description).await
        }
        Commands::Debit { user_id, company_id, amount, description } => {
            cmd_adjust(user_id, company_id, -amount, description).await
        }
        Commands::Transactions { user_id, limit } => cmd_transactions(user_id, limit).await,
        Commands::Backfill { limit } => cmd_backfill(limit).await,
        Commands::Agent { action } => cmd_agent(action).await,
        Commands::Config => cmd_config(),
    }
}

// ============================================
// Command Implementations
// ============================================

fn client() -> Result<CallmeterClient> {
    let config = Config::resolve()?;
    let api_key = config
        .api_key
        .as_ref()
        .context("Not logged in. Run 'callmeter login' first.")?;

    tracing::debug!(base_url = %config.base_url, "Using Callmeter API");
    Ok(CallmeterClient::new(&config.base_url, api_key))
}

async fn cmd_login(key: Option<String>, url: Option<String>) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(url) = url {
        config.base_url = url;
    }

    let api_key = match key {
        Some(k) => k,
        None => Password::new()
            .with_prompt("API Key")
            .interact()
            .context("Failed to read API key")?,
    };

    // Test connection
    let client = CallmeterClient::new(&config.base_url, &api_key);
    print!("Testing connection... ");

    match client.health().await {
        Ok(true) => {
            println!("{}", "OK".green());
        }
        _ => {
            println!("{}", "Failed".red());
            bail!("Could not connect to Callmeter API at {}", config.base_url);
        }
    }

    config.set_api_key(api_key);
    config.save()?;

    println!("{} API key saved to {:?}", "✓".green(), Config::config_path()?);

    Ok(())
}

async fn cmd_balance(user_id: Uuid) -> Result<()> {
    let balance = client()?.get_balance(user_id).await?;

    let amount = balance.balance.round_dp(2).to_string();
    let amount = if balance.is_blocked || balance.is_critical {
        amount.red()
    } else if balance.is_low {
        amount.yellow()
    } else {
        amount.green()
    };

    println!("{} {}", "Balance:".bold(), amount);
    println!("  User: {}", balance.user_id.to_string().dimmed());
    if let Some(company_id) = balance.company_id {
        println!("  Company: {}", company_id.to_string().dimmed());
    }
    println!(
        "  Thresholds: warning {} / critical {}",
        balance.warning_threshold.round_dp(2),
        balance.critical_threshold.round_dp(2)
    );
    if balance.is_blocked {
        println!("  {}", "Account blocked".red().bold());
    }

    Ok(())
}

async fn cmd_adjust(
    user_id: Uuid,
    company_id: Uuid,
    amount: Decimal,
    description: String,
) -> Result<()> {
    let request = AdjustRequest {
        user_id,
        company_id,
        amount,
        description,
        created_by: std::env::var("USER").ok(),
    };
    let outcome = client()?.adjust(&request).await?;

    println!(
        "{} Adjusted by {} - new balance {}",
        "✓".green(),
        amount.round_dp(2),
        outcome.new_balance.round_dp(2).to_string().cyan()
    );
    if outcome.is_blocked {
        println!("  {}", "Account is blocked".red());
    }
    if outcome.transaction_id.is_none() {
        println!(
            "  {}",
            "Balance changed but the ledger entry was not written; reconcile manually".yellow()
        );
    }

    Ok(())
}

async fn cmd_transactions(user_id: Uuid, limit: Option<i64>) -> Result<()> {
    let transactions = client()?.list_transactions(user_id, limit).await?;

    if transactions.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!("{}", "Transactions:".bold());
    for tx in transactions {
        let amount = tx.amount.round_dp(2).to_string();
        let amount = if tx.amount.is_sign_negative() {
            amount.red()
        } else {
            amount.green()
        };

        println!(
            "  {} {:>10} {} {} {}",
            tx.created_at.dimmed(),
            amount,
            format!("[{}]", tx.transaction_type).dimmed(),
            tx.description,
            tx.call_id.as_deref().unwrap_or("").dimmed()
        );
        tracing::debug!(id = %tx.id, balance_after = %tx.balance_after, "Transaction");
    }

    Ok(())
}

async fn cmd_backfill(limit: Option<i64>) -> Result<()> {
    let report = client()?.backfill(limit).await?;

    println!("{} Backfill complete", "✓".green());
    println!("  Scanned: {}", report.scanned);
    println!(
        "  Charged: {} ({})",
        report.charged.to_string().green(),
        report.total_charged.round_dp(2)
    );
    println!("  Already charged: {}", report.already_charged);
    println!("  Zero cost: {}", report.zero_cost);
    if report.skipped > 0 {
        println!("  Skipped: {}", report.skipped.to_string().yellow());
    }

    Ok(())
}

async fn cmd_agent(action: AgentAction) -> Result<()> {
    let client = client()?;

    let agent = match action {
        AgentAction::Show { external_id } => client.get_agent(&external_id).await?,
        AgentAction::SetRate { id, rate } => {
            if rate.is_sign_negative() {
                bail!("Rate must not be negative");
            }
            let request = UpdateAgentRequest {
                rate_per_minute: Some(rate),
                ..Default::default()
            };
            client.update_agent(id, &request).await?
        }
        AgentAction::SetStatus { id, status } => {
            let request = UpdateAgentRequest {
                status: Some(status),
                ..Default::default()
            };
            client.update_agent(id, &request).await?
        }
    };

    let status = if agent.status == "active" {
        agent.status.green()
    } else {
        agent.status.red()
    };

    println!(
        "  {} {} [{}] {}/min",
        agent.id.to_string().dimmed(),
        agent.name.cyan().bold(),
        status,
        agent.rate_per_minute
    );
    println!("  Provider id: {}", agent.external_id);

    Ok(())
}

fn cmd_config() -> Result<()> {
    let config = Config::resolve()?;

    println!("{}", "Configuration:".bold());
    println!("  Path: {:?}", Config::config_path()?);
    println!("  Base URL: {}", config.base_url);
    println!(
        "  API Key: {}",
        if config.api_key.is_some() { "Set".green() } else { "Not set".red() }
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_amount_parser() {
        assert_eq!(parse_positive_amount("12.50").unwrap(), Decimal::new(1250, 2));
        assert!(parse_positive_amount("0").is_err());
        assert!(parse_positive_amount("-5").is_err());
        assert!(parse_positive_amount("ten").is_err());
    }

    #[test]
    fn test_negative_debit_is_rejected() {
        let user = Uuid::new_v4().to_string();
        let company = Uuid::new_v4().to_string();

        let parsed = Cli::try_parse_from(["callmeter", "debit", &user, &company, "--", "-5"]);
        assert!(parsed.is_err());

        let parsed = Cli::try_parse_from(["callmeter", "credit", &user, &company, "0"]);
        assert!(parsed.is_err());

        let parsed = Cli::try_parse_from(["callmeter", "debit", &user, &company, "5"]).unwrap();
        assert!(matches!(
            parsed.command,
            Commands::Debit { amount, .. } if amount == Decimal::new(5, 0)
        ));
    }
}
