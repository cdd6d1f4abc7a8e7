use crate::error::ConfigError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Hierarchical configuration store addressed by dotted paths
///
/// The first path segment names a section (usually a config file stem), the
/// rest walk into nested objects. Numeric segments index into arrays.
///
/// ```
/// use ember::config::Repository;
/// use serde_json::json;
///
/// let mut config = Repository::new();
/// config.set("app.timezone", "UTC");
///
/// assert_eq!(config.get("app.timezone"), Some(&json!("UTC")));
/// assert_eq!(config.get_or("app.locale", "en"), json!("en"));
/// assert!(config.get("app.locale").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Repository {
    items: Value,
    sources: Vec<PathBuf>,
}

impl Repository {
    pub fn new() -> Self {
        Self {
            items: Value::Object(Map::new()),
            sources: Vec::new(),
        }
    }

    /// Build a repository from an existing object tree
    pub fn from_value(items: Value) -> Self {
        let items = match items {
            Value::Object(_) => items,
            _ => Value::Object(Map::new()),
        };
        Self {
            items,
            sources: Vec::new(),
        }
    }

    /// Look up a value by dotted path
    pub fn get(&self, key: &str) -> Option<&Value> {
        if key.is_empty() {
            return Some(&self.items);
        }
        key.split('.').try_fold(&self.items, |node, segment| match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    /// Look up a value, returning `default` when the key is absent
    ///
    /// A key explicitly set to `null` is present and returns `null`.
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.get(key).cloned().unwrap_or_else(|| default.into())
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Store a value, creating intermediate objects as needed
    ///
    /// Non-object intermediates are replaced by objects.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        if key.is_empty() {
            self.items = value;
            return;
        }
        let mut node = &mut self.items;
        for segment in key.split('.') {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            node = match node {
                Value::Object(map) => map.entry(segment.to_string()).or_insert(Value::Null),
                _ => unreachable!("node was just made an object"),
            };
        }
        *node = value;
    }

    /// Deep-merge `value` over whatever is stored at `key`
    ///
    /// Objects merge key by key; any other value replaces the stored one.
    pub fn merge(&mut self, key: &str, value: Value) {
        match self.get_mut(key) {
            Some(existing) => deep_merge(existing, value, true),
            None => self.set(key, value),
        }
    }

    /// Deep-merge `defaults` under whatever is stored at `key`
    ///
    /// Stored values win; only missing keys are filled in. Used for
    /// provider-supplied configuration defaults.
    pub fn merge_defaults(&mut self, key: &str, defaults: Value) {
        match self.get_mut(key) {
            Some(existing) => deep_merge(existing, defaults, false),
            None => self.set(key, defaults),
        }
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        if key.is_empty() {
            return Some(&mut self.items);
        }
        key.split('.')
            .try_fold(&mut self.items, |node, segment| match node {
                Value::Object(map) => map.get_mut(segment),
                Value::Array(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(move |i| items.get_mut(i)),
                _ => None,
            })
    }

    /// Get a string value; other types are a mismatch
    pub fn string(&self, key: &str) -> Result<String, ConfigError> {
        self.typed(key, "string", None, |v| v.as_str().map(str::to_string))
    }

    pub fn string_or(&self, key: &str, default: impl Into<String>) -> Result<String, ConfigError> {
        self.typed(key, "string", Some(default.into()), |v| {
            v.as_str().map(str::to_string)
        })
    }

    /// Get an integer value; floats and numeric strings are a mismatch
    pub fn integer(&self, key: &str) -> Result<i64, ConfigError> {
        self.typed(key, "integer", None, Value::as_i64)
    }

    pub fn integer_or(&self, key: &str, default: i64) -> Result<i64, ConfigError> {
        self.typed(key, "integer", Some(default), Value::as_i64)
    }

    /// Get a float value; integers widen, everything else is a mismatch
    pub fn float(&self, key: &str) -> Result<f64, ConfigError> {
        self.typed(key, "float", None, Value::as_f64)
    }

    pub fn float_or(&self, key: &str, default: f64) -> Result<f64, ConfigError> {
        self.typed(key, "float", Some(default), Value::as_f64)
    }

    pub fn boolean(&self, key: &str) -> Result<bool, ConfigError> {
        self.typed(key, "boolean", None, Value::as_bool)
    }

    pub fn boolean_or(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        self.typed(key, "boolean", Some(default), Value::as_bool)
    }

    pub fn array(&self, key: &str) -> Result<Vec<Value>, ConfigError> {
        self.typed(key, "array", None, |v| v.as_array().cloned())
    }

    pub fn array_or(&self, key: &str, default: Vec<Value>) -> Result<Vec<Value>, ConfigError> {
        self.typed(key, "array", Some(default), |v| v.as_array().cloned())
    }

    fn typed<T>(
        &self,
        key: &str,
        expected: &'static str,
        default: Option<T>,
        extract: impl Fn(&Value) -> Option<T>,
    ) -> Result<T, ConfigError> {
        match self.get(key) {
            None => default.ok_or_else(|| ConfigError::Missing {
                key: key.to_string(),
            }),
            Some(value) => extract(value).ok_or_else(|| ConfigError::TypeMismatch {
                key: key.to_string(),
                expected,
                found: value_type(value),
            }),
        }
    }

    /// Deserialize a subtree into a typed struct
    ///
    /// A missing section deserializes from an empty object, so structs with
    /// `#[serde(default)]` get their defaults.
    pub fn section<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        let value = self
            .get(key)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        serde_json::from_value(value).map_err(|e| ConfigError::Deserialize {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// The whole configuration tree
    pub fn all(&self) -> &Value {
        &self.items
    }

    /// Names of the top-level sections, sorted
    pub fn sections(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .items
            .as_object()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub(crate) fn record_source(&mut self, path: &Path) {
        self.sources.push(path.to_path_buf());
    }

    /// Files this repository was loaded from
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

/// Runtime type name used in mismatch errors
pub fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn deep_merge(base: &mut Value, incoming: Value, incoming_wins: bool) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(incoming_map)) => {
            for (key, value) in incoming_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value, incoming_wins),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, incoming) => {
            if incoming_wins {
                *base = incoming;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;

    fn sample() -> Repository {
        Repository::from_value(json!({
            "app": {
                "name": "Ember",
                "debug": true,
                "timezone": "UTC",
                "workers": 4,
                "ratio": 0.75,
                "locales": ["en", "fr"],
                "nothing": null
            }
        }))
    }

    #[test]
    fn test_dotted_get() {
        let config = sample();
        assert_eq!(config.get("app.timezone"), Some(&json!("UTC")));
        assert_eq!(config.get("app.locales.1"), Some(&json!("fr")));
        assert_eq!(config.get("app.locales.9"), None);
        assert_eq!(config.get("app.timezone.deeper"), None);
        assert_eq!(config.get("mail.host"), None);
    }

    #[test]
    fn test_get_or_default() {
        let config = sample();
        assert_eq!(config.get_or("app.timezone", "Europe/Paris"), json!("UTC"));
        assert_eq!(config.get_or("app.locale", "en"), json!("en"));
        // Present-but-null is not absent
        assert_eq!(config.get_or("app.nothing", "fallback"), Value::Null);
    }

    #[test]
    fn test_set_creates_intermediates() {
        let mut config = Repository::new();
        config.set("cache.stores.redis.port", 6379);
        assert_eq!(config.integer("cache.stores.redis.port"), Ok(6379));

        config.set("cache.stores", "flat");
        config.set("cache.stores.file", "/tmp");
        assert_eq!(config.string("cache.stores.file"), Ok("/tmp".to_string()));
    }

    #[test]
    fn test_typed_accessors() {
        let config = sample();
        assert_eq!(config.string("app.name"), Ok("Ember".to_string()));
        assert_eq!(config.boolean("app.debug"), Ok(true));
        assert_eq!(config.integer("app.workers"), Ok(4));
        assert_eq!(config.float("app.ratio"), Ok(0.75));
        assert_eq!(config.float("app.workers"), Ok(4.0));
        assert_eq!(config.array("app.locales"), Ok(vec![json!("en"), json!("fr")]));
    }

    #[test]
    fn test_typed_accessor_mismatch_is_an_error() {
        let config = sample();
        assert_eq!(
            config.integer("app.name"),
            Err(ConfigError::TypeMismatch {
                key: "app.name".into(),
                expected: "integer",
                found: "string",
            })
        );
        assert!(matches!(
            config.boolean("app.workers"),
            Err(ConfigError::TypeMismatch { found: "integer", .. })
        ));
        assert!(matches!(
            config.integer("app.ratio"),
            Err(ConfigError::TypeMismatch { found: "float", .. })
        ));
        assert!(matches!(
            config.string("app.nothing"),
            Err(ConfigError::TypeMismatch { found: "null", .. })
        ));
        assert!(matches!(
            config.array("app"),
            Err(ConfigError::TypeMismatch { found: "object", .. })
        ));
    }

    #[test]
    fn test_typed_defaults_only_apply_when_missing() {
        let config = sample();
        assert_eq!(config.string_or("app.locale", "en"), Ok("en".to_string()));
        assert_eq!(config.integer_or("app.workers", 1), Ok(4));
        assert!(config.integer_or("app.name", 1).is_err());
        assert_eq!(
            config.boolean("app.missing"),
            Err(ConfigError::Missing {
                key: "app.missing".into()
            })
        );
    }

    #[test]
    fn test_merge_defaults_keeps_existing_values() {
        let mut config = sample();
        config.merge_defaults(
            "app",
            json!({ "name": "Default", "locale": "en", "locales": ["de"] }),
        );
        assert_eq!(config.string("app.name"), Ok("Ember".to_string()));
        assert_eq!(config.string("app.locale"), Ok("en".to_string()));
        assert_eq!(config.array("app.locales").unwrap().len(), 2);

        config.merge_defaults("mail", json!({ "driver": "log" }));
        assert_eq!(config.string("mail.driver"), Ok("log".to_string()));
    }

    #[test]
    fn test_merge_overrides_existing_values() {
        let mut config = sample();
        config.merge("app", json!({ "name": "Override", "extra": 1 }));
        assert_eq!(config.string("app.name"), Ok("Override".to_string()));
        assert_eq!(config.string("app.timezone"), Ok("UTC".to_string()));
        assert_eq!(config.integer("app.extra"), Ok(1));
    }

    #[test]
    fn test_section_deserializes_struct() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct AppSection {
            name: String,
            workers: u32,
            #[serde(default)]
            missing: Option<String>,
        }

        let config = sample();
        let section: AppSection = config.section("app").unwrap();
        assert_eq!(
            section,
            AppSection {
                name: "Ember".into(),
                workers: 4,
                missing: None,
            }
        );
        assert!(config.section::<AppSection>("mail").is_err());
    }

    #[test]
    fn test_sections_sorted() {
        let mut config = Repository::new();
        config.set("server.port", 1);
        config.set("app.name", "x");
        assert_eq!(config.sections(), vec!["app".to_string(), "server".to_string()]);
    }
}
