//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Commission policy configuration.
    pub commission: CommissionConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Commission policy configuration.
///
/// The rate and beneficiary are deployment configuration, never hidden
/// constants: produce-sale commissions are credited to the designated
/// platform administrator named here.
#[derive(Debug, Clone, Deserialize)]
pub struct CommissionConfig {
    /// Commission rate as a fraction of the sale total (e.g. 0.05 for 5%).
    #[serde(default = "default_commission_rate")]
    pub rate: Decimal,
    /// User ID of the platform administrator receiving commissions.
    pub beneficiary_id: Uuid,
}

fn default_commission_rate() -> Decimal {
    Decimal::new(5, 2) // 0.05
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("AGRILINK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                (
                    "AGRILINK__DATABASE__URL",
                    Some("postgres://localhost/agrilink_test"),
                ),
                (
                    "AGRILINK__COMMISSION__BENEFICIARY_ID",
                    Some("00000000-0000-0000-0000-000000000001"),
                ),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.database.url, "postgres://localhost/agrilink_test");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.commission.rate, dec!(0.05));
            },
        );
    }

    #[test]
    fn test_commission_rate_override() {
        temp_env::with_vars(
            [
                ("AGRILINK__DATABASE__URL", Some("postgres://localhost/x")),
                (
                    "AGRILINK__COMMISSION__BENEFICIARY_ID",
                    Some("00000000-0000-0000-0000-000000000001"),
                ),
                ("AGRILINK__COMMISSION__RATE", Some("0.10")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.commission.rate, dec!(0.10));
            },
        );
    }

    #[test]
    fn test_missing_beneficiary_is_an_error() {
        temp_env::with_vars(
            [("AGRILINK__DATABASE__URL", Some("postgres://localhost/x"))],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
