//! Server configuration read from the Shuttle secret store

use std::str::FromStr;

use rust_decimal::Decimal;

use callmeter::CreditDefaults;

pub const API_KEY: &str = "CALLMETER_API_KEY";
pub const WEBHOOK_SECRET: &str = "CALLMETER_WEBHOOK_SECRET";
pub const DEFAULT_WARNING_THRESHOLD: &str = "CALLMETER_DEFAULT_WARNING_THRESHOLD";
pub const DEFAULT_CRITICAL_THRESHOLD: &str = "CALLMETER_DEFAULT_CRITICAL_THRESHOLD";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bearer token for admin routes; `None` disables the check
    pub api_key: Option<String>,
    /// Shared secret for the inbound webhook; `None` disables the check
    pub webhook_secret: Option<String>,
    pub credit_defaults: CreditDefaults,
}

impl ServerConfig {
    /// Build from any key lookup (the secret store in production)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = CreditDefaults::default();

        Self {
            api_key: non_empty(API_KEY),
            webhook_secret: non_empty(WEBHOOK_SECRET),
            credit_defaults: CreditDefaults {
                warning_threshold: threshold(
                    DEFAULT_WARNING_THRESHOLD,
                    non_empty(DEFAULT_WARNING_THRESHOLD),
                    defaults.warning_threshold,
                ),
                critical_threshold: threshold(
                    DEFAULT_CRITICAL_THRESHOLD,
                    non_empty(DEFAULT_CRITICAL_THRESHOLD),
                    defaults.critical_threshold,
                ),
            },
        }
    }
}

fn threshold(key: &str, raw: Option<String>, fallback: Decimal) -> Decimal {
    match raw.map(|v| Decimal::from_str(v.trim())) {
        Some(Ok(value)) if value >= Decimal::ZERO => value,
        Some(_) => {
            tracing::warn!("⚠️  Invalid {} - using {}", key, fallback);
            fallback
        }
        None => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> ServerConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config(&[]);
        assert!(config.api_key.is_none());
        assert!(config.webhook_secret.is_none());
        assert_eq!(config.credit_defaults, CreditDefaults::default());
    }

    #[test]
    fn test_reads_secrets_and_thresholds() {
        let config = config(&[
            (API_KEY, "admin-key"),
            (WEBHOOK_SECRET, ""),
            (DEFAULT_WARNING_THRESHOLD, "25.5"),
            (DEFAULT_CRITICAL_THRESHOLD, "not-a-number"),
        ]);

        assert_eq!(config.api_key.as_deref(), Some("admin-key"));
        assert!(config.webhook_secret.is_none());
        assert_eq!(config.credit_defaults.warning_threshold, Decimal::new(255, 1));
        assert_eq!(config.credit_defaults.critical_threshold, Decimal::new(200, 2));
    }
}
