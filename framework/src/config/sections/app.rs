use super::typed_or_text;
use crate::config::env::{env, Environment};
use serde::{Deserialize, Serialize};

/// Application configuration, stored under the `app` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application name
    pub name: String,
    /// Environment name (`local`, `production`, ...)
    pub env: String,
    /// Debug mode enabled
    #[serde(deserialize_with = "typed_or_text")]
    pub debug: bool,
    /// Application URL
    pub url: String,
    pub timezone: String,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl AppConfig {
    /// Build config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            name: env("APP_NAME", defaults.name),
            env: Environment::detect().to_string(),
            debug: env("APP_DEBUG", defaults.debug),
            url: env("APP_URL", defaults.url),
            timezone: env("APP_TIMEZONE", defaults.timezone),
            log_level: env("LOG_LEVEL", defaults.log_level),
        }
    }

    pub fn environment(&self) -> Environment {
        match self.env.as_str() {
            "production" => Environment::Production,
            "staging" => Environment::Staging,
            "development" => Environment::Development,
            "testing" => Environment::Testing,
            "local" | "" => Environment::Local,
            other => Environment::Custom(other.to_string()),
        }
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn is_production(&self) -> bool {
        self.environment().is_production()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Ember Application".to_string(),
            env: "local".to_string(),
            debug: true,
            url: "http://localhost:8080".to_string(),
            timezone: "UTC".to_string(),
            log_level: "info".to_string(),
        }
    }
}
