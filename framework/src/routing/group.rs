//! Route grouping with shared prefix and middleware

use super::{RouteBuilder, RouteDefinition, RouteTable, Router};
use crate::error::FrameworkError;
use crate::http::{Request, Response};
use crate::middleware::{into_boxed, BoxedMiddleware, Middleware};
use http::Method;
use std::future::Future;

/// Builder for route groups with shared prefix and middleware
///
/// # Example
///
/// ```rust,ignore
/// Router::new()
///     .group("/api", |r| {
///         r.get("/users", list_users)
///          .post("/users", create_user)
///     }).middleware(ApiMiddleware)
/// ```
pub struct GroupBuilder {
    outer_router: Router,
    /// Routes registered within the group, paths still relative
    group_routes: Vec<RouteDefinition>,
    prefix: String,
    middleware: Vec<BoxedMiddleware>,
}

impl GroupBuilder {
    /// Apply middleware to all routes in this group
    ///
    /// Group middleware runs before each route's own middleware.
    pub fn middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware.push(into_boxed(middleware));
        self
    }

    /// Merge the group's routes into the outer router
    fn finalize(self) -> Router {
        let mut router = self.outer_router;
        for mut route in self.group_routes {
            route.path = join_path(&self.prefix, &route.path);
            let own = std::mem::take(&mut route.middleware);
            route.middleware = self.middleware.iter().cloned().chain(own).collect();
            router.push(route);
        }
        router
    }

    pub fn route<H, Fut>(self, method: Method, path: &str, handler: H) -> RouteBuilder
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.finalize().route(method, path, handler)
    }

    verb_methods!();

    /// Start another group after this one
    pub fn group<F, R>(self, prefix: &str, builder_fn: F) -> GroupBuilder
    where
        F: FnOnce(Router) -> R,
        R: Into<Router>,
    {
        self.finalize().group(prefix, builder_fn)
    }

    pub fn merge(self, other: impl Into<Router>) -> Router {
        self.finalize().merge(other)
    }

    pub fn compile(self) -> Result<RouteTable, FrameworkError> {
        self.finalize().compile()
    }
}

/// Join a group prefix and a route path without doubled or trailing slashes
pub(crate) fn join_path(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    match (prefix.is_empty(), path.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{}", path),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{}/{}", prefix, path),
    }
}

impl Router {
    /// Create a route group with a shared prefix
    ///
    /// Routes defined within the group will have the prefix prepended to their paths.
    /// Middleware applied to the group will be applied to all routes within it.
    /// Groups nest.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// Router::new()
    ///     .group("/api", |r| {
    ///         r.get("/users", list_users)      // -> GET /api/users
    ///          .post("/users", create_user)    // -> POST /api/users
    ///          .get("/users/{id}", show_user)  // -> GET /api/users/{id}
    ///     })
    ///     .middleware(ApiMiddleware)
    /// ```
    pub fn group<F, R>(self, prefix: &str, builder_fn: F) -> GroupBuilder
    where
        F: FnOnce(Router) -> R,
        R: Into<Router>,
    {
        let inner: Router = builder_fn(Router::new()).into();

        GroupBuilder {
            outer_router: self,
            group_routes: inner.into_routes(),
            prefix: prefix.to_string(),
            middleware: Vec::new(),
        }
    }
}

impl From<GroupBuilder> for Router {
    fn from(builder: GroupBuilder) -> Self {
        builder.finalize()
    }
}

// Allow RouteBuilder to chain into groups
impl RouteBuilder {
    pub fn group<F, R>(self, prefix: &str, builder_fn: F) -> GroupBuilder
    where
        F: FnOnce(Router) -> R,
        R: Into<Router>,
    {
        self.router.group(prefix, builder_fn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpResponse;
    use crate::middleware::Next;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    async fn ok(_req: Request) -> Response {
        Ok(HttpResponse::text("ok"))
    }

    struct Named(&'static str);

    #[async_trait]
    impl Middleware for Named {
        async fn handle(&self, request: Request, next: Next) -> Response {
            next(request).await
        }

        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/api", "/users"), "/api/users");
        assert_eq!(join_path("/api/", "users"), "/api/users");
        assert_eq!(join_path("/api", "/"), "/api");
        assert_eq!(join_path("", "/"), "/");
        assert_eq!(join_path("/", "/ping"), "/ping");
    }

    #[test]
    fn test_group_prefixes_and_orders_middleware() {
        let router: Router = Router::new()
            .get("/", ok)
            .group("/api", |r| {
                r.get("/users", ok)
                    .middleware(Named("route"))
                    .group("/admin", |r| r.delete("/users/{id}", ok))
                    .middleware(Named("inner"))
            })
            .middleware(Named("outer"))
            .into();

        let summary: Vec<(String, Vec<String>)> = router
            .routes()
            .iter()
            .map(|r| (r.path.clone(), r.middleware_names()))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("/".to_string(), vec![]),
                ("/api/users".to_string(), vec!["outer".to_string(), "route".to_string()]),
                (
                    "/api/admin/users/{id}".to_string(),
                    vec!["outer".to_string(), "inner".to_string()]
                ),
            ]
        );
    }

    #[test]
    fn test_routes_can_follow_a_group() {
        let router: Router = Router::new()
            .group("/api", |r| r.get("/ping", ok))
            .get("/health", ok)
            .name("health")
            .into();

        assert_eq!(router.routes()[1].path, "/health");
        assert_eq!(router.routes()[1].name.as_deref(), Some("health"));
    }
}
