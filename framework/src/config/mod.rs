//! Configuration module for Ember
//!
//! This module provides Laravel-like configuration management including:
//! - Automatic `.env` file loading with environment-based precedence
//! - Reserved env tokens (`true`, `(null)`, `empty`, ...) mapped to typed values
//! - YAML/JSON config files with `${ENV}` interpolation
//! - Dotted-path access (`app.timezone`) with typed, failing accessors
//!
//! # Example
//!
//! ```rust,no_run
//! use ember::Config;
//!
//! Config::init(std::path::Path::new(".")).unwrap();
//!
//! let timezone = Config::get_or("app.timezone", "UTC");
//! let port = Config::server().port;
//! println!("{} on port {}", timezone, port);
//! ```

pub mod env;
pub mod loader;
pub mod repository;
mod sections;

pub use env::{env, env_optional, env_required, env_value, load_dotenv, EnvValue, Environment};
pub use repository::Repository;
pub use sections::{AppConfig, ServerConfig};

use crate::error::{ConfigError, FrameworkError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use std::sync::{OnceLock, RwLock};

/// Global config repository
static CONFIG_REPOSITORY: OnceLock<RwLock<Repository>> = OnceLock::new();

fn store() -> &'static RwLock<Repository> {
    CONFIG_REPOSITORY.get_or_init(|| RwLock::new(Repository::new()))
}

/// Main Config facade for accessing configuration
///
/// Wraps a process-wide [`Repository`]. Every accessor mirrors the
/// repository method of the same name.
pub struct Config;

impl Config {
    /// Initialize the configuration system
    ///
    /// Loads `.env` files from `project_root`, seeds the `app` and `server`
    /// sections from the environment, then merges every file in
    /// `project_root/config` over them.
    pub fn init(project_root: &Path) -> Result<Environment, FrameworkError> {
        let (environment, env_files) = env::load_dotenv(project_root);

        let mut repository = Repository::new();
        repository.merge_defaults("app", to_value(&AppConfig::from_env())?);
        repository.merge_defaults("server", to_value(&ServerConfig::from_env())?);
        for file in &env_files {
            repository.record_source(file);
        }
        loader::load_dir(&mut repository, &project_root.join("config"))?;

        Self::replace(repository);
        Ok(environment)
    }

    /// Swap the global repository wholesale
    pub fn replace(repository: Repository) {
        let mut guard = store().write().unwrap_or_else(|e| e.into_inner());
        *guard = repository;
    }

    /// Run a closure against the global repository
    pub fn with<R>(f: impl FnOnce(&Repository) -> R) -> R {
        let guard = store().read().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    pub fn with_mut<R>(f: impl FnOnce(&mut Repository) -> R) -> R {
        let mut guard = store().write().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    /// Clone of the whole repository
    pub fn snapshot() -> Repository {
        Self::with(Repository::clone)
    }

    pub fn get(key: &str) -> Option<Value> {
        Self::with(|repo| repo.get(key).cloned())
    }

    pub fn get_or(key: &str, default: impl Into<Value>) -> Value {
        Self::with(|repo| repo.get_or(key, default))
    }

    pub fn has(key: &str) -> bool {
        Self::with(|repo| repo.has(key))
    }

    pub fn set(key: &str, value: impl Into<Value>) {
        Self::with_mut(|repo| repo.set(key, value))
    }

    pub fn merge_defaults(key: &str, defaults: Value) {
        Self::with_mut(|repo| repo.merge_defaults(key, defaults))
    }

    pub fn string(key: &str) -> Result<String, ConfigError> {
        Self::with(|repo| repo.string(key))
    }

    pub fn integer(key: &str) -> Result<i64, ConfigError> {
        Self::with(|repo| repo.integer(key))
    }

    pub fn float(key: &str) -> Result<f64, ConfigError> {
        Self::with(|repo| repo.float(key))
    }

    pub fn boolean(key: &str) -> Result<bool, ConfigError> {
        Self::with(|repo| repo.boolean(key))
    }

    pub fn array(key: &str) -> Result<Vec<Value>, ConfigError> {
        Self::with(|repo| repo.array(key))
    }

    pub fn section<T: DeserializeOwned>(key: &str) -> Result<T, ConfigError> {
        Self::with(|repo| repo.section(key))
    }

    /// Typed `app` section; falls back to environment defaults if invalid
    pub fn app() -> AppConfig {
        Self::section("app").unwrap_or_else(|_| AppConfig::from_env())
    }

    /// Typed `server` section; falls back to environment defaults if invalid
    pub fn server() -> ServerConfig {
        Self::section("server").unwrap_or_else(|_| ServerConfig::from_env())
    }

    pub fn environment() -> Environment {
        Self::app().environment()
    }

    pub fn is_production() -> bool {
        Self::environment().is_production()
    }

    /// Debug mode; a missing or malformed `app.debug` counts as off
    pub fn is_debug() -> bool {
        Self::with(|repo| repo.boolean_or("app.debug", false)).unwrap_or(false)
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, FrameworkError> {
    serde_json::to_value(value)
        .map_err(|e| FrameworkError::internal(format!("Failed to serialize config: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    #[serial]
    fn test_init_merges_env_and_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(".env"),
            "EMBER_INIT_TZ=Asia/Tokyo\nEMBER_INIT_FLAG=(false)\n",
        )
        .unwrap();
        fs::create_dir(dir.path().join("config")).unwrap();
        fs::write(
            dir.path().join("config/app.yaml"),
            "timezone: ${EMBER_INIT_TZ}\nfeature: ${EMBER_INIT_FLAG}\n",
        )
        .unwrap();
        std::env::remove_var("EMBER_INIT_TZ");
        std::env::remove_var("EMBER_INIT_FLAG");

        Config::init(dir.path()).unwrap();

        assert_eq!(Config::string("app.timezone"), Ok("Asia/Tokyo".to_string()));
        assert_eq!(Config::boolean("app.feature"), Ok(false));
        assert!(Config::integer("server.port").is_ok());
        assert!(Config::string("app.feature").is_err());
        assert_eq!(Config::get_or("app.missing", "fallback"), Value::from("fallback"));
    }

    #[test]
    #[serial]
    fn test_set_and_section() {
        Config::replace(Repository::new());
        Config::set("server.port", 9999);
        Config::set("server.host", "0.0.0.0");

        let server = Config::server();
        assert_eq!(server.port, 9999);
        assert_eq!(server.address(), "0.0.0.0:9999");
    }

    #[test]
    #[serial]
    fn test_server_section_from_placeholder_text() {
        Config::replace(Repository::new());
        Config::set("server.port", "8443");

        assert_eq!(Config::string("server.port"), Ok("8443".to_string()));
        assert_eq!(Config::server().port, 8443);
    }

    #[test]
    #[serial]
    fn test_is_debug_defaults_off() {
        Config::replace(Repository::new());
        assert!(!Config::is_debug());

        Config::set("app.debug", "yes");
        assert!(!Config::is_debug());

        Config::set("app.debug", true);
        assert!(Config::is_debug());
    }
}
