//! Shared base configuration for the workspace services.
//!
//! Every service carries the same base layer: listen port, service identity
//! and observability settings. Values come from an optional `configuration`
//! file, overridden by `APP__`-prefixed environment variables
//! (`APP__PORT`, `APP__LOG_LEVEL`, `APP__OTLP_ENDPOINT`, ...).

use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub service_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load the base layer. `service_name` is the fallback identity when
    /// none is configured.
    pub fn load(service_name: &str) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let mut loaded: Config = config.try_deserialize()?;
        if loaded.service_name.trim().is_empty() {
            loaded.service_name = service_name.to_string();
        }
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_take_defaults() {
        let config: Config = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, "info");
        assert!(config.service_name.is_empty());
        assert!(config.otlp_endpoint.is_none());
    }
}
