use crate::error::FrameworkError;
use std::path::{Path, PathBuf};

/// Environment type enumeration
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Local,
    Development,
    Staging,
    Production,
    Testing,
    Custom(String),
}

impl Environment {
    /// Detect environment from APP_ENV or default to Local
    pub fn detect() -> Self {
        Self::from_name(std::env::var("APP_ENV").ok().as_deref())
    }

    /// Detect environment from the process, falling back to the APP_ENV
    /// entry of the project's base `.env` file
    pub fn detect_in(project_root: &Path) -> Self {
        if let Ok(name) = std::env::var("APP_ENV") {
            return Self::from_name(Some(&name));
        }

        let from_file = dotenvy::from_path_iter(project_root.join(".env"))
            .ok()
            .and_then(|iter| {
                iter.filter_map(Result::ok)
                    .find(|(key, _)| key == "APP_ENV")
                    .map(|(_, value)| value)
            });

        Self::from_name(from_file.as_deref())
    }

    fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("production") => Self::Production,
            Some("staging") => Self::Staging,
            Some("development") => Self::Development,
            Some("testing") => Self::Testing,
            Some("local") | Some("") | None => Self::Local,
            Some(other) => Self::Custom(other.to_string()),
        }
    }

    /// Get the .env file suffix for this environment
    pub fn env_file_suffix(&self) -> &str {
        match self {
            Self::Local => "local",
            Self::Production => "production",
            Self::Staging => "staging",
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Custom(name) => name.as_str(),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if this is a development environment (local or development)
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Local | Self::Development)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.env_file_suffix())
    }
}

/// A value read from the environment after reserved-token mapping
///
/// `.env` files can only hold strings, so a handful of literals are treated
/// as typed values when read back:
///
/// | raw                | value             |
/// |--------------------|-------------------|
/// | `true`, `(true)`   | `Bool(true)`      |
/// | `false`, `(false)` | `Bool(false)`     |
/// | `empty`, `(empty)` | `Str("")`         |
/// | `null`, `(null)`   | `Null`            |
///
/// Anything else is a string with one pair of surrounding double quotes removed.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvValue {
    Bool(bool),
    Str(String),
    Null,
}

impl EnvValue {
    /// Map a raw environment string to its typed value
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "(true)" => Self::Bool(true),
            "false" | "(false)" => Self::Bool(false),
            "empty" | "(empty)" => Self::Str(String::new()),
            "null" | "(null)" => Self::Null,
            _ => Self::Str(strip_quotes(raw).to_string()),
        }
    }

    /// Text form used for `FromStr` parsing; `None` for null
    pub fn as_text(&self) -> Option<std::borrow::Cow<'_, str>> {
        match self {
            Self::Bool(true) => Some("true".into()),
            Self::Bool(false) => Some("false".into()),
            Self::Str(s) => Some(s.as_str().into()),
            Self::Null => None,
        }
    }

    pub fn into_json(self) -> serde_json::Value {
        match self {
            Self::Bool(b) => serde_json::Value::Bool(b),
            Self::Str(s) => serde_json::Value::String(s),
            Self::Null => serde_json::Value::Null,
        }
    }
}

fn strip_quotes(raw: &str) -> &str {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}

/// Load environment variables from .env files with proper precedence
///
/// Precedence (later entries override earlier):
/// 1. .env (base defaults)
/// 2. .env.local (local overrides, not committed)
/// 3. .env.{environment} (environment-specific)
/// 4. .env.{environment}.local (environment-specific local overrides)
/// 5. Actual system environment variables (highest priority)
///
/// Returns the detected environment and the files that were actually loaded.
pub fn load_dotenv(project_root: &Path) -> (Environment, Vec<PathBuf>) {
    let env = Environment::detect_in(project_root);
    let suffix = env.env_file_suffix().to_string();

    // dotenvy never overwrites a variable that is already set, so files are
    // loaded from most to least specific.
    let mut candidates = vec![
        format!(".env.{}.local", suffix),
        format!(".env.{}", suffix),
        ".env.local".to_string(),
        ".env".to_string(),
    ];
    // In the local environment `.env.{env}` and `.env.local` are the same file
    let mut seen = std::collections::HashSet::new();
    candidates.retain(|name| seen.insert(name.clone()));

    let mut loaded = Vec::new();
    for name in candidates {
        let path = project_root.join(&name);
        if !path.exists() {
            continue;
        }
        match dotenvy::from_path(&path) {
            Ok(()) => {
                tracing::debug!(file = %path.display(), "loaded environment file");
                loaded.push(path);
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "failed to parse environment file");
            }
        }
    }

    (env, loaded)
}

/// Read an environment variable with reserved-token mapping applied
///
/// # Example
/// ```
/// use ember::config::{env_value, EnvValue};
///
/// std::env::set_var("DOC_FEATURE_FLAG", "(false)");
/// assert_eq!(env_value("DOC_FEATURE_FLAG"), Some(EnvValue::Bool(false)));
/// ```
pub fn env_value(key: &str) -> Option<EnvValue> {
    std::env::var(key).ok().map(|raw| EnvValue::parse(&raw))
}

/// Get an environment variable with a default value
///
/// Unset, `null` and unparsable values fall back to the default.
///
/// # Example
/// ```
/// use ember::config::env;
///
/// let port: u16 = env("SERVER_PORT", 8080);
/// let host = env("SERVER_HOST", "127.0.0.1".to_string());
/// ```
pub fn env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_optional(key).unwrap_or(default)
}

/// Get an optional environment variable
pub fn env_optional<T: std::str::FromStr>(key: &str) -> Option<T> {
    let value = env_value(key)?;
    let text = value.as_text()?;
    text.parse().ok()
}

/// Get a required environment variable
///
/// # Example
/// ```
/// use ember::config::env_required;
///
/// let missing: Result<String, _> = env_required("DOC_SURELY_UNSET_SECRET");
/// assert!(missing.is_err());
/// ```
pub fn env_required<T: std::str::FromStr>(key: &str) -> Result<T, FrameworkError> {
    env_optional(key).ok_or_else(|| FrameworkError::MissingEnv {
        key: key.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_reserved_tokens() {
        let cases = [
            ("true", EnvValue::Bool(true)),
            ("(true)", EnvValue::Bool(true)),
            ("TRUE", EnvValue::Bool(true)),
            ("false", EnvValue::Bool(false)),
            ("(false)", EnvValue::Bool(false)),
            ("empty", EnvValue::Str(String::new())),
            ("(empty)", EnvValue::Str(String::new())),
            ("null", EnvValue::Null),
            ("(null)", EnvValue::Null),
        ];
        for (raw, expected) in cases {
            assert_eq!(EnvValue::parse(raw), expected, "raw value {raw:?}");
        }
    }

    #[test]
    fn test_plain_values_pass_through() {
        assert_eq!(EnvValue::parse("UTC"), EnvValue::Str("UTC".into()));
        assert_eq!(EnvValue::parse("8080"), EnvValue::Str("8080".into()));
        assert_eq!(EnvValue::parse("(nil)"), EnvValue::Str("(nil)".into()));
        assert_eq!(EnvValue::parse(""), EnvValue::Str(String::new()));
    }

    #[test]
    fn test_double_quotes_are_stripped() {
        assert_eq!(
            EnvValue::parse("\"My Application\""),
            EnvValue::Str("My Application".into())
        );
        assert_eq!(EnvValue::parse("\""), EnvValue::Str("\"".into()));
        assert_eq!(
            EnvValue::parse("say \"hi\""),
            EnvValue::Str("say \"hi\"".into())
        );
    }

    #[test]
    fn test_typed_env_accessors() {
        std::env::set_var("EMBER_TEST_ENV_DEBUG", "(true)");
        std::env::set_var("EMBER_TEST_ENV_PORT", "9000");
        std::env::set_var("EMBER_TEST_ENV_NULL", "null");

        assert!(env("EMBER_TEST_ENV_DEBUG", false));
        assert_eq!(env::<u16>("EMBER_TEST_ENV_PORT", 80), 9000);
        assert_eq!(env::<u16>("EMBER_TEST_ENV_NULL", 80), 80);
        assert_eq!(env_optional::<String>("EMBER_TEST_ENV_NULL"), None);
        assert!(env_required::<String>("EMBER_TEST_ENV_UNSET_KEY").is_err());
    }

    #[test]
    #[serial]
    fn test_load_dotenv_precedence() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(".env"),
            "EMBER_TEST_LAYER=base\nEMBER_TEST_BASE_ONLY=yes\n",
        )
        .unwrap();
        fs::write(dir.path().join(".env.local"), "EMBER_TEST_LAYER=local\n").unwrap();
        std::env::remove_var("EMBER_TEST_LAYER");
        std::env::remove_var("EMBER_TEST_BASE_ONLY");
        std::env::remove_var("APP_ENV");

        let (environment, files) = load_dotenv(dir.path());

        assert_eq!(environment, Environment::Local);
        assert_eq!(files.len(), 2);
        assert_eq!(std::env::var("EMBER_TEST_LAYER").unwrap(), "local");
        assert_eq!(std::env::var("EMBER_TEST_BASE_ONLY").unwrap(), "yes");
    }

    #[test]
    #[serial]
    fn test_environment_read_from_base_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".env"), "APP_ENV=staging\n").unwrap();
        std::env::remove_var("APP_ENV");

        assert_eq!(Environment::detect_in(dir.path()), Environment::Staging);
    }
}
