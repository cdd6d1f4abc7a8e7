use super::table::RouteTable;
use crate::error::FrameworkError;
use crate::http::{Request, Response};
use crate::middleware::{into_boxed, BoxedMiddleware, Middleware};
use http::Method;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Future returned by a route handler
pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Type-erased route handler
pub type BoxedHandler = Arc<dyn Fn(Request) -> HandlerFuture + Send + Sync>;

/// Box an async function or closure as a route handler
pub fn handler<H, Fut>(handler: H) -> BoxedHandler
where
    H: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |req: Request| -> HandlerFuture { Box::pin(handler(req)) })
}

/// One registered route
///
/// `middleware` holds group middleware followed by the route's own, in the
/// order they run.
#[derive(Clone)]
pub struct RouteDefinition {
    pub method: Method,
    pub path: String,
    pub name: Option<String>,
    pub(crate) handler: BoxedHandler,
    pub(crate) middleware: Vec<BoxedMiddleware>,
}

impl RouteDefinition {
    pub fn new(method: Method, path: impl Into<String>, handler: BoxedHandler) -> Self {
        Self {
            method,
            path: path.into(),
            name: None,
            handler,
            middleware: Vec::new(),
        }
    }

    pub fn handler(&self) -> BoxedHandler {
        self.handler.clone()
    }

    pub fn middleware(&self) -> &[BoxedMiddleware] {
        &self.middleware
    }

    pub fn middleware_names(&self) -> Vec<String> {
        self.middleware.iter().map(|m| m.name().to_string()).collect()
    }
}

impl std::fmt::Debug for RouteDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteDefinition")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("name", &self.name)
            .field("middleware", &self.middleware_names())
            .finish()
    }
}

/// HTTP Router with Laravel-like route registration
///
/// Routes are only collected here; `compile` builds the lookup table and
/// reports conflicting registrations.
///
/// # Example
///
/// ```rust,ignore
/// let routes = Router::new()
///     .get("/", home::index).name("home")
///     .get("/account", account::show).middleware(Authenticate::new())
///     .resource("/photos", PhotoController::default())
///     .compile()?;
/// ```
#[derive(Clone, Default)]
pub struct Router {
    routes: Vec<RouteDefinition>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route for any method
    pub fn route<H, Fut>(self, method: Method, path: &str, handler: H) -> RouteBuilder
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route_boxed(method, path, self::handler(handler))
    }

    /// Register a route with a pre-boxed handler
    pub fn route_boxed(mut self, method: Method, path: &str, handler: BoxedHandler) -> RouteBuilder {
        self.routes.push(RouteDefinition::new(method, path, handler));
        RouteBuilder { router: self }
    }

    verb_methods!();

    /// Append every route of another router
    pub fn merge(mut self, other: impl Into<Router>) -> Self {
        self.routes.extend(other.into().routes);
        self
    }

    pub fn routes(&self) -> &[RouteDefinition] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub(crate) fn into_routes(self) -> Vec<RouteDefinition> {
        self.routes
    }

    pub(crate) fn push(&mut self, route: RouteDefinition) {
        self.routes.push(route);
    }

    /// Build the dispatch table
    pub fn compile(self) -> Result<RouteTable, FrameworkError> {
        RouteTable::compile(self.routes)
    }
}

/// Builder returned after registering a route, enabling `.name()` and
/// `.middleware()` chaining on the most recent route
pub struct RouteBuilder {
    pub(crate) router: Router,
}

impl RouteBuilder {
    fn last(&mut self) -> Option<&mut RouteDefinition> {
        self.router.routes.last_mut()
    }

    /// Name the most recently registered route
    pub fn name(mut self, name: &str) -> Self {
        if let Some(route) = self.last() {
            route.name = Some(name.to_string());
        }
        self
    }

    /// Apply middleware to the most recently registered route
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// Router::new()
    ///     .get("/admin", admin_handler).middleware(Authenticate::new())
    ///     .get("/api/users", users_handler).middleware(CorsMiddleware)
    /// ```
    pub fn middleware<M: Middleware + 'static>(self, middleware: M) -> Self {
        self.middleware_boxed(into_boxed(middleware))
    }

    pub fn middleware_boxed(mut self, middleware: BoxedMiddleware) -> Self {
        if let Some(route) = self.last() {
            route.middleware.push(middleware);
        }
        self
    }

    pub fn route<H, Fut>(self, method: Method, path: &str, handler: H) -> RouteBuilder
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.router.route(method, path, handler)
    }

    verb_methods!();

    pub fn merge(self, other: impl Into<Router>) -> Router {
        self.router.merge(other)
    }

    pub fn compile(self) -> Result<RouteTable, FrameworkError> {
        self.router.compile()
    }
}

impl From<RouteBuilder> for Router {
    fn from(builder: RouteBuilder) -> Self {
        builder.router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpResponse, Request};
    use crate::middleware::{Next, RequestLogger};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    async fn ok(_req: Request) -> Response {
        Ok(HttpResponse::text("ok"))
    }

    struct Audit;

    #[async_trait]
    impl Middleware for Audit {
        async fn handle(&self, request: Request, next: Next) -> Response {
            next(request).await
        }
    }

    #[test]
    fn test_name_and_middleware_apply_to_last_route() {
        let router: Router = Router::new()
            .get("/", ok)
            .name("home")
            .post("/photos", ok)
            .name("photos.store")
            .middleware(Audit)
            .middleware(RequestLogger)
            .into();

        let routes = router.routes();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].name.as_deref(), Some("home"));
        assert!(routes[0].middleware().is_empty());
        assert_eq!(routes[1].method, Method::POST);
        assert_eq!(routes[1].middleware_names(), vec!["Audit", "RequestLogger"]);
    }

    #[test]
    fn test_every_verb_registers() {
        let router: Router = Router::new()
            .get("/r", ok)
            .post("/r", ok)
            .put("/r", ok)
            .patch("/r", ok)
            .delete("/r", ok)
            .route(Method::OPTIONS, "/r", ok)
            .into();

        let methods: Vec<&str> = router.routes().iter().map(|r| r.method.as_str()).collect();
        assert_eq!(methods, vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"]);
    }

    #[test]
    fn test_merge_appends() {
        let api = Router::new().get("/api/ping", ok);
        let router = Router::new().get("/", ok).merge(api);
        assert_eq!(router.len(), 2);
        assert_eq!(router.routes()[1].path, "/api/ping");
    }
}
