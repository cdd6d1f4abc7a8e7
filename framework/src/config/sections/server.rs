use super::typed_or_text;
use crate::config::env::env;
use serde::{Deserialize, Serialize};

/// HTTP server configuration, stored under the `server` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    #[serde(deserialize_with = "typed_or_text")]
    pub port: u16,
    /// Largest accepted request body in bytes; bigger bodies get 413
    #[serde(deserialize_with = "typed_or_text")]
    pub max_body_size: usize,
}

impl ServerConfig {
    /// Seed values from `SERVER_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env("SERVER_HOST", defaults.host),
            port: env("SERVER_PORT", defaults.port),
            max_body_size: env("SERVER_MAX_BODY_SIZE", defaults.max_body_size),
        }
    }

    /// `host:port` string suitable for binding
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_body_size: 10 * 1024 * 1024,
        }
    }
}
