//! Named route URL generation

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

/// Global registry mapping route names to path patterns
static ROUTE_REGISTRY: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn store() -> &'static RwLock<HashMap<String, String>> {
    ROUTE_REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Register a route name -> path mapping
pub fn register_route_name(name: &str, path: &str) {
    let mut names = store().write().unwrap_or_else(|e| e.into_inner());
    names.insert(name.to_string(), path.to_string());
}

/// Generate a URL for a named route with parameters
///
/// Returns `None` if the route name is not registered.
///
/// # Example
/// ```rust,ignore
/// let url = route("photos.show", &[("id", "123")]);
/// assert_eq!(url, Some("/photos/123".to_string()));
/// ```
pub fn route(name: &str, params: &[(&str, &str)]) -> Option<String> {
    let names = store().read().unwrap_or_else(|e| e.into_inner());
    let pattern = names.get(name)?;
    Some(fill(pattern, params.iter().copied()))
}

/// Generate URL with HashMap parameters (used by `Redirect::route`)
pub fn route_with_params(name: &str, params: &HashMap<String, String>) -> Option<String> {
    let names = store().read().unwrap_or_else(|e| e.into_inner());
    let pattern = names.get(name)?;
    Some(fill(
        pattern,
        params.iter().map(|(k, v)| (k.as_str(), v.as_str())),
    ))
}

/// Substitute `{key}` and `{*key}` placeholders
fn fill<'a>(pattern: &str, params: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    let mut url = pattern.to_string();
    for (key, value) in params {
        url = url
            .replace(&format!("{{{}}}", key), value)
            .replace(&format!("{{*{}}}", key), value);
    }
    url
}
