//! Routing: route registration, groups, resource controllers and the
//! compiled route table used for dispatch

/// Generates `get`, `post`, `put`, `patch` and `delete` for a builder type
/// that has a `route(self, Method, &str, H) -> RouteBuilder` method
macro_rules! verb_methods {
    () => {
        /// Register a GET route
        pub fn get<H, Fut>(self, path: &str, handler: H) -> $crate::routing::RouteBuilder
        where
            H: Fn($crate::http::Request) -> Fut + Send + Sync + 'static,
            Fut: ::std::future::Future<Output = $crate::http::Response> + Send + 'static,
        {
            self.route(::http::Method::GET, path, handler)
        }

        /// Register a POST route
        pub fn post<H, Fut>(self, path: &str, handler: H) -> $crate::routing::RouteBuilder
        where
            H: Fn($crate::http::Request) -> Fut + Send + Sync + 'static,
            Fut: ::std::future::Future<Output = $crate::http::Response> + Send + 'static,
        {
            self.route(::http::Method::POST, path, handler)
        }

        /// Register a PUT route
        pub fn put<H, Fut>(self, path: &str, handler: H) -> $crate::routing::RouteBuilder
        where
            H: Fn($crate::http::Request) -> Fut + Send + Sync + 'static,
            Fut: ::std::future::Future<Output = $crate::http::Response> + Send + 'static,
        {
            self.route(::http::Method::PUT, path, handler)
        }

        /// Register a PATCH route
        pub fn patch<H, Fut>(self, path: &str, handler: H) -> $crate::routing::RouteBuilder
        where
            H: Fn($crate::http::Request) -> Fut + Send + Sync + 'static,
            Fut: ::std::future::Future<Output = $crate::http::Response> + Send + 'static,
        {
            self.route(::http::Method::PATCH, path, handler)
        }

        /// Register a DELETE route
        pub fn delete<H, Fut>(self, path: &str, handler: H) -> $crate::routing::RouteBuilder
        where
            H: Fn($crate::http::Request) -> Fut + Send + Sync + 'static,
            Fut: ::std::future::Future<Output = $crate::http::Response> + Send + 'static,
        {
            self.route(::http::Method::DELETE, path, handler)
        }
    };
}

mod group;
mod resource;
mod router;
mod table;
mod url;

pub use group::GroupBuilder;
pub use resource::ResourceController;
pub use router::{handler, BoxedHandler, HandlerFuture, RouteBuilder, RouteDefinition, Router};
pub use table::{RouteMatch, RouteTable};
pub use url::{register_route_name, route, route_with_params};
