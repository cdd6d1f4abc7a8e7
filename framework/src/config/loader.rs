//! Configuration file loading
//!
//! Every `*.yaml`, `*.yml` or `*.json` file in the config directory becomes a
//! section named after its file stem. String values may reference the
//! environment with `${KEY}` or `${KEY:-default}`.

use super::env::{env_value, EnvValue};
use super::repository::Repository;
use crate::error::ConfigError;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Load every config file in `dir` into the repository
///
/// File values are merged over what is already stored, so framework and
/// provider defaults only fill the gaps. A missing directory is not an error.
pub fn load_dir(repository: &mut Repository, dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "no config directory");
        return Ok(Vec::new());
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| load_error(dir, e))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yaml") | Some("yml") | Some("json")
            )
        })
        .collect();
    files.sort();

    for path in &files {
        let section = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem.to_string(),
            None => continue,
        };
        let value = load_file(path)?;
        repository.merge(&section, interpolate(value));
        repository.record_source(path);
        tracing::debug!(file = %path.display(), section = %section, "loaded config file");
    }

    Ok(files)
}

/// Parse a single config file into a JSON tree
pub fn load_file(path: &Path) -> Result<Value, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| load_error(path, e))?;
    if contents.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");

    let value = if is_json {
        serde_json::from_str(&contents).map_err(|e| load_error(path, e))?
    } else {
        serde_yaml::from_str::<Value>(&contents).map_err(|e| load_error(path, e))?
    };

    // A YAML document holding only `~` parses as null
    Ok(match value {
        Value::Null => Value::Object(Default::default()),
        other => other,
    })
}

fn load_error(path: &Path, e: impl std::fmt::Display) -> ConfigError {
    ConfigError::Load {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Replace `${KEY}` / `${KEY:-default}` placeholders throughout a tree
///
/// A string that is exactly one placeholder takes the typed environment
/// value: reserved tokens become booleans, `""` or null, everything else
/// stays a string exactly as written (`01234` keeps its zero). Placeholders
/// inside longer strings are spliced as text.
pub fn interpolate(value: Value) -> Value {
    match value {
        Value::String(s) => interpolate_str(&s),
        Value::Array(items) => Value::Array(items.into_iter().map(interpolate).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, interpolate(value)))
                .collect(),
        ),
        other => other,
    }
}

fn interpolate_str(s: &str) -> Value {
    if let Some(expr) = whole_placeholder(s) {
        return resolve(expr);
    }

    if !s.contains("${") {
        return Value::String(s.to_string());
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                out.push_str(&render(&resolve(&after[..end])));
                rest = &after[end + 1..];
            }
            None => {
                // Unterminated placeholder, keep the text as written
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    Value::String(out)
}

fn whole_placeholder(s: &str) -> Option<&str> {
    let inner = s.strip_prefix("${")?.strip_suffix('}')?;
    if inner.contains('}') || inner.contains("${") {
        return None;
    }
    Some(inner)
}

fn resolve(expr: &str) -> Value {
    let (key, default) = match expr.split_once(":-") {
        Some((key, default)) => (key.trim(), Some(default)),
        None => (expr.trim(), None),
    };

    match env_value(key) {
        Some(value) => value.into_json(),
        None => default
            .map(|d| EnvValue::parse(d).into_json())
            .unwrap_or(Value::Null),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
