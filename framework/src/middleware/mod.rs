//! Middleware pipeline
//!
//! A middleware receives the request and the rest of the pipeline as `next`.
//! It may change the request before calling `next(request).await`, change
//! the response afterwards, or return early without calling `next` at all.
//!
//! ```rust,ignore
//! use ember::{async_trait, HttpResponse, Middleware, Next, Request, Response};
//!
//! pub struct RequireJson;
//!
//! #[async_trait]
//! impl Middleware for RequireJson {
//!     async fn handle(&self, request: Request, next: Next) -> Response {
//!         if request.content_type() != Some("application/json") {
//!             return Err(HttpResponse::text("JSON only").status(415));
//!         }
//!         next(request).await
//!     }
//! }
//! ```

pub mod auth;
pub mod logging;
mod registry;

pub use auth::{AuthUser, Authenticate, Guard, StaticTokenGuard};
pub use logging::RequestLogger;
pub use registry::{global_middleware, register_global_middleware, MiddlewareRegistry};

use crate::http::{Request, Response};
use crate::routing::{BoxedHandler, HandlerFuture};
use async_trait::async_trait;
use std::sync::Arc;

/// The remainder of the pipeline, ending in the route handler
pub type Next = BoxedHandler;

/// A request/response filter
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, request: Request, next: Next) -> Response;

    /// Name shown by `route:list` and in logs
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

pub type BoxedMiddleware = Arc<dyn Middleware>;

pub fn into_boxed<M: Middleware + 'static>(middleware: M) -> BoxedMiddleware {
    Arc::new(middleware)
}

/// Ordered middleware wrapped around a terminal handler
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    middleware: Vec<BoxedMiddleware>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, middleware: BoxedMiddleware) {
        self.middleware.push(middleware);
    }

    pub fn extend(&mut self, middleware: impl IntoIterator<Item = BoxedMiddleware>) {
        self.middleware.extend(middleware);
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Run the request through every middleware, then `terminal`
    ///
    /// The first middleware is outermost: it sees the request first and the
    /// response last.
    pub async fn execute(self, request: Request, terminal: BoxedHandler) -> Response {
        let mut next: Next = terminal;
        for middleware in self.middleware.into_iter().rev() {
            let inner = next;
            next = Arc::new(move |request: Request| -> HandlerFuture {
                let middleware = middleware.clone();
                let inner = inner.clone();
                Box::pin(async move { middleware.handle(request, inner).await })
            });
        }
        next(request).await
    }
}

impl From<Vec<BoxedMiddleware>> for MiddlewareChain {
    fn from(middleware: Vec<BoxedMiddleware>) -> Self {
        Self { middleware }
    }
}
