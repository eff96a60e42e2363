//! Configuration module for tax-service.
//!
//! Every CereTax default lives here; the rest of the service reads the typed
//! structs and never falls back to ad-hoc literals.

use secrecy::{ExposeSecret, Secret};
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// CereTax environment selector. Unknown values fall back to the sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Cert,
    Prod,
}

impl Environment {
    pub fn from_string(s: &str) -> Self {
        match s {
            "prod" => Environment::Prod,
            _ => Environment::Cert,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Cert => "cert",
            Environment::Prod => "prod",
        }
    }

    /// Base URL for tax calculation and status calls.
    pub fn calculation_base(&self) -> &'static str {
        match self {
            Environment::Cert => "https://calc.cert.ceretax.net",
            Environment::Prod => "https://calc.prod.ceretax.net",
        }
    }

    /// Base URL for reference-data lookups.
    pub fn data_base(&self) -> &'static str {
        match self {
            Environment::Cert => "https://data.cert.ceretax.net",
            Environment::Prod => "https://data.prod.ceretax.net",
        }
    }

    /// Base URL for address validation.
    pub fn address_base(&self) -> &'static str {
        match self {
            Environment::Cert => "https://av.cert.ceretax.net",
            Environment::Prod => "https://av.prod.ceretax.net",
        }
    }
}

/// CereTax account settings and per-request context defaults.
#[derive(Debug, Clone)]
pub struct CeretaxSettings {
    pub enabled: bool,
    pub api_key: Secret<String>,
    pub environment: Environment,
    pub logging_enabled: bool,
    pub address_validation_enabled: bool,
    pub default_ps_code: String,
    pub profile_id: String,
    pub business_type: String,
    pub customer_type: String,
    pub seller_type: String,
    pub unit_type: String,
    pub timeout_secs: u64,
    pub status_timeout_secs: u64,
}

impl CeretaxSettings {
    /// The configured API key, or `None` when empty.
    pub fn api_key(&self) -> Option<&str> {
        let key = self.api_key.expose_secret().trim();
        if key.is_empty() {
            None
        } else {
            Some(key)
        }
    }
}

impl Default for CeretaxSettings {
    fn default() -> Self {
        CeretaxSettings {
            enabled: false,
            api_key: Secret::new(String::new()),
            environment: Environment::Cert,
            logging_enabled: false,
            address_validation_enabled: false,
            default_ps_code: "10010100".to_string(),
            profile_id: "sales".to_string(),
            business_type: "01".to_string(),
            customer_type: "01".to_string(),
            seller_type: "01".to_string(),
            unit_type: "01".to_string(),
            timeout_secs: 30,
            status_timeout_secs: 40,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct TaxServiceConfig {
    /// Base layer shared across the workspace services (port, identity,
    /// log level, OTLP endpoint).
    pub common: core_config::Config,
    pub database: DatabaseConfig,
    pub ceretax: CeretaxSettings,
}

/// Accepts `true`, `1` and `yes` in any casing.
fn env_flag(key: &str) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).ok().filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string())
}

impl TaxServiceConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load("tax-service")?;

        Ok(Self {
            common,
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").map_err(|_| {
                    AppError::ConfigError(anyhow::anyhow!("DATABASE_URL is required"))
                })?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2),
            },
            ceretax: CeretaxSettings {
                enabled: env_flag("CERETAX_ENABLED"),
                api_key: Secret::new(env::var("CERETAX_API_KEY").unwrap_or_default()),
                environment: Environment::from_string(&env_or("CERETAX_ENVIRONMENT", "cert")),
                logging_enabled: env_flag("CERETAX_LOGGING_ENABLED"),
                address_validation_enabled: env_flag("CERETAX_ADDRESS_VALIDATION_ENABLED"),
                default_ps_code: env_or("CERETAX_DEFAULT_PS_CODE", "10010100"),
                profile_id: env_or("CERETAX_PROFILE_ID", "sales"),
                business_type: env_or("CERETAX_BUSINESS_TYPE", "01"),
                customer_type: env_or("CERETAX_CUSTOMER_TYPE", "01"),
                seller_type: env_or("CERETAX_SELLER_TYPE", "01"),
                unit_type: env_or("CERETAX_UNIT_TYPE", "01"),
                timeout_secs: env::var("CERETAX_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
                status_timeout_secs: env::var("CERETAX_STATUS_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(40),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_environment_falls_back_to_cert() {
        assert_eq!(Environment::from_string("staging"), Environment::Cert);
        assert_eq!(Environment::from_string("prod"), Environment::Prod);
    }

    #[test]
    fn default_settings_carry_fixed_fallback_codes() {
        let settings = CeretaxSettings::default();
        assert_eq!(settings.business_type, "01");
        assert_eq!(settings.customer_type, "01");
        assert_eq!(settings.seller_type, "01");
        assert_eq!(settings.unit_type, "01");
        assert_eq!(settings.default_ps_code, "10010100");
        assert_eq!(settings.profile_id, "sales");
        assert_eq!(settings.timeout_secs, 30);
    }

    #[test]
    fn empty_api_key_reads_as_missing() {
        let settings = CeretaxSettings::default();
        assert!(settings.api_key().is_none());

        let settings = CeretaxSettings {
            api_key: Secret::new("  key-1  ".to_string()),
            ..CeretaxSettings::default()
        };
        assert_eq!(settings.api_key(), Some("key-1"));
    }
}
