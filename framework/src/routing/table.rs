//! Compiled route table

use super::router::RouteDefinition;
use super::url::register_route_name;
use crate::error::FrameworkError;
use http::Method;
use matchit::Router as MatchitRouter;
use std::collections::HashMap;

/// Result of looking up a request
pub enum RouteMatch<'a> {
    Found {
        route: &'a RouteDefinition,
        params: HashMap<String, String>,
    },
    /// The path exists under other methods
    MethodNotAllowed(Vec<String>),
    NotFound,
}

/// Immutable dispatch table, one matchit tree per method
pub struct RouteTable {
    routes: Vec<RouteDefinition>,
    methods: HashMap<Method, MatchitRouter<usize>>,
    names: HashMap<String, usize>,
}

impl RouteTable {
    /// Build the per-method trees
    ///
    /// Fails on the first pattern that conflicts with an earlier route of
    /// the same method. Route names are published for `route()` and
    /// `Redirect::route`; a repeated name points at the later route.
    pub fn compile(routes: Vec<RouteDefinition>) -> Result<Self, FrameworkError> {
        let mut methods: HashMap<Method, MatchitRouter<usize>> = HashMap::new();
        let mut names = HashMap::new();

        for (index, route) in routes.iter().enumerate() {
            methods
                .entry(route.method.clone())
                .or_insert_with(MatchitRouter::new)
                .insert(route.path.clone(), index)
                .map_err(|e| FrameworkError::RouteConflict {
                    method: route.method.to_string(),
                    path: route.path.clone(),
                    message: e.to_string(),
                })?;

            if let Some(name) = &route.name {
                if names.insert(name.clone(), index).is_some() {
                    tracing::warn!(name = %name, path = %route.path, "route name redefined");
                }
            }
        }

        for (name, index) in &names {
            register_route_name(name, &routes[*index].path);
        }
        tracing::debug!(routes = routes.len(), "route table compiled");

        Ok(Self {
            routes,
            methods,
            names,
        })
    }

    /// Find the route for a request
    ///
    /// HEAD requests fall back to GET routes.
    pub fn match_route(&self, method: &Method, path: &str) -> RouteMatch<'_> {
        if let Some(found) = self.lookup(method, path) {
            return found;
        }
        if *method == Method::HEAD {
            if let Some(found) = self.lookup(&Method::GET, path) {
                return found;
            }
        }

        let mut allowed: Vec<String> = self
            .methods
            .iter()
            .filter(|(_, tree)| tree.at(path).is_ok())
            .map(|(method, _)| method.to_string())
            .collect();

        if allowed.is_empty() {
            RouteMatch::NotFound
        } else {
            // GET routes also answer HEAD
            if allowed.iter().any(|m| m == "GET") && !allowed.iter().any(|m| m == "HEAD") {
                allowed.push(Method::HEAD.to_string());
            }
            allowed.sort();
            RouteMatch::MethodNotAllowed(allowed)
        }
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        let matched = self.methods.get(method)?.at(path).ok()?;
        let params = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Some(RouteMatch::Found {
            route: &self.routes[*matched.value],
            params,
        })
    }

    pub fn routes(&self) -> &[RouteDefinition] {
        &self.routes
    }

    pub fn named(&self, name: &str) -> Option<&RouteDefinition> {
        self.names.get(name).map(|index| &self.routes[*index])
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpResponse, Request, Response};
    use crate::routing::{route, Router};
    use pretty_assertions::assert_eq;

    async fn ok(_req: Request) -> Response {
        Ok(HttpResponse::text("ok"))
    }

    fn table() -> RouteTable {
        Router::new()
            .get("/photos", ok)
            .post("/photos", ok)
            .get("/photos/{id}", ok)
            .name("table_test.photos.show")
            .delete("/photos/{id}", ok)
            .compile()
            .unwrap()
    }

    #[test]
    fn test_match_extracts_params() {
        let table = table();
        match table.match_route(&Method::GET, "/photos/42") {
            RouteMatch::Found { route, params } => {
                assert_eq!(route.path, "/photos/{id}");
                assert_eq!(params.get("id").map(String::as_str), Some("42"));
            }
            _ => panic!("expected a match"),
        }
    }

    #[test]
    fn test_method_not_allowed_lists_methods() {
        let table = table();
        match table.match_route(&Method::PUT, "/photos/42") {
            RouteMatch::MethodNotAllowed(allowed) => {
                assert_eq!(allowed, vec!["DELETE", "GET", "HEAD"])
            }
            _ => panic!("expected 405"),
        }
    }

    #[test]
    fn test_allow_list_without_get_has_no_head() {
        let table = Router::new().post("/uploads", ok).compile().unwrap();
        match table.match_route(&Method::GET, "/uploads") {
            RouteMatch::MethodNotAllowed(allowed) => assert_eq!(allowed, vec!["POST"]),
            _ => panic!("expected 405"),
        }
    }

    #[test]
    fn test_unknown_path_is_not_found() {
        assert!(matches!(
            table().match_route(&Method::GET, "/videos"),
            RouteMatch::NotFound
        ));
    }

    #[test]
    fn test_head_falls_back_to_get() {
        assert!(matches!(
            table().match_route(&Method::HEAD, "/photos"),
            RouteMatch::Found { .. }
        ));
    }

    #[test]
    fn test_conflicting_routes_are_rejected() {
        let err = Router::new()
            .get("/photos/{id}", ok)
            .get("/photos/{id}", ok)
            .compile()
            .err()
            .unwrap();

        match err {
            FrameworkError::RouteConflict { method, path, .. } => {
                assert_eq!(method, "GET");
                assert_eq!(path, "/photos/{id}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_same_path_different_methods_is_fine() {
        assert_eq!(table().len(), 4);
    }

    #[test]
    fn test_compile_publishes_names() {
        let table = table();
        assert_eq!(
            table.named("table_test.photos.show").map(|r| r.path.as_str()),
            Some("/photos/{id}")
        );
        assert_eq!(
            route("table_test.photos.show", &[("id", "5")]),
            Some("/photos/5".to_string())
        );
    }
}
