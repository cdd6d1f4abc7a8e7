//! Middleware registry for global middleware
//!
//! Register global middleware from a provider's `boot` or from
//! `Application::middleware`. The kernel takes a snapshot when it is built.

use super::{into_boxed, BoxedMiddleware, Middleware};
use std::sync::{OnceLock, RwLock};

static GLOBAL_MIDDLEWARE: OnceLock<RwLock<Vec<BoxedMiddleware>>> = OnceLock::new();

fn store() -> &'static RwLock<Vec<BoxedMiddleware>> {
    GLOBAL_MIDDLEWARE.get_or_init(|| RwLock::new(Vec::new()))
}

/// Register a global middleware that runs on every request
///
/// Middleware runs in registration order.
///
/// # Example
///
/// ```rust,ignore
/// global_middleware!(RequestLogger);
/// global_middleware!(CorsMiddleware);
/// ```
pub fn register_global_middleware<M: Middleware + 'static>(middleware: M) {
    let mut list = store().write().unwrap_or_else(|e| e.into_inner());
    list.push(into_boxed(middleware));
}

/// Get all registered global middleware
pub fn global_middleware() -> Vec<BoxedMiddleware> {
    store().read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// Register global middleware by value
#[macro_export]
macro_rules! global_middleware {
    ($middleware:expr) => {
        $crate::middleware::register_global_middleware($middleware)
    };
}

/// Global middleware that runs on every request, in order
#[derive(Clone, Default)]
pub struct MiddlewareRegistry {
    global: Vec<BoxedMiddleware>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with globally registered middleware
    pub fn from_global() -> Self {
        Self {
            global: global_middleware(),
        }
    }

    /// Append global middleware
    ///
    /// Global middleware runs in the order it is added, before any group or
    /// route middleware.
    pub fn append<M: Middleware + 'static>(self, middleware: M) -> Self {
        self.append_boxed(into_boxed(middleware))
    }

    pub fn append_boxed(mut self, middleware: BoxedMiddleware) -> Self {
        self.global.push(middleware);
        self
    }

    pub fn global_middleware(&self) -> &[BoxedMiddleware] {
        &self.global
    }

    pub fn names(&self) -> Vec<String> {
        self.global.iter().map(|m| m.name().to_string()).collect()
    }
}
