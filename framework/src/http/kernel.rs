//! Request dispatch: global middleware, route lookup, route middleware,
//! handler

use super::{HttpResponse, Request, Response};
use crate::error::FrameworkError;
use crate::middleware::{MiddlewareChain, MiddlewareRegistry};
use crate::routing::{BoxedHandler, HandlerFuture, RouteMatch, RouteTable};
use std::sync::Arc;

/// Turns a request into a response
///
/// Global middleware wraps routing, so it also sees 404 and 405 responses.
/// One kernel is shared by every connection.
pub struct HttpKernel {
    routes: Arc<RouteTable>,
    middleware: MiddlewareRegistry,
}

impl HttpKernel {
    pub fn new(routes: RouteTable, middleware: MiddlewareRegistry) -> Self {
        Self {
            routes: Arc::new(routes),
            middleware,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn middleware(&self) -> &MiddlewareRegistry {
        &self.middleware
    }

    pub async fn handle(&self, request: Request) -> HttpResponse {
        let routes = self.routes.clone();
        let router: BoxedHandler = Arc::new(move |request: Request| -> HandlerFuture {
            let routes = routes.clone();
            Box::pin(async move { dispatch(&routes, request).await })
        });

        let chain = MiddlewareChain::from(self.middleware.global_middleware().to_vec());
        chain.execute(request, router).await.unwrap_or_else(|e| e)
    }
}

async fn dispatch(routes: &RouteTable, request: Request) -> Response {
    let (handler, middleware, params) = match routes.match_route(request.method(), request.path()) {
        RouteMatch::Found { route, params } => (route.handler(), route.middleware().to_vec(), params),
        RouteMatch::MethodNotAllowed(allowed) => {
            return Err(FrameworkError::MethodNotAllowed { allowed }.into())
        }
        RouteMatch::NotFound => return Err(FrameworkError::NotFound.into()),
    };

    MiddlewareChain::from(middleware)
        .execute(request.with_params(params), handler)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{Middleware, Next};
    use crate::routing::Router;
    use async_trait::async_trait;
    use bytes::Bytes;
    use http::Method;
    use std::sync::Mutex;

    type Trace = Arc<Mutex<Vec<&'static str>>>;

    struct Mark(&'static str, Trace);

    #[async_trait]
    impl Middleware for Mark {
        async fn handle(&self, request: Request, next: Next) -> Response {
            self.1.lock().unwrap().push(self.0);
            next(request).await
        }
    }

    fn request(method: Method, uri: &str) -> Request {
        Request::new(
            http::Request::builder()
                .method(method)
                .uri(uri)
                .body(Bytes::new())
                .unwrap(),
        )
    }

    fn kernel(trace: &Trace) -> HttpKernel {
        let handler_trace = trace.clone();
        let routes = Router::new()
            .group("/photos", |r| {
                r.get("/{id}", move |req: Request| {
                    let trace = handler_trace.clone();
                    async move {
                        trace.lock().unwrap().push("handler");
                        let id = req.param("id")?.to_string();
                        Ok::<_, HttpResponse>(HttpResponse::text(id))
                    }
                })
                .middleware(Mark("route", trace.clone()))
            })
            .middleware(Mark("group", trace.clone()))
            .compile()
            .unwrap();

        HttpKernel::new(
            routes,
            MiddlewareRegistry::new().append(Mark("global", trace.clone())),
        )
    }

    #[tokio::test]
    async fn test_middleware_order_global_group_route() {
        let trace = Trace::default();
        let response = kernel(&trace).handle(request(Method::GET, "/photos/9")).await;

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.body(), "9");
        assert_eq!(
            *trace.lock().unwrap(),
            vec!["global", "group", "route", "handler"]
        );
    }

    #[tokio::test]
    async fn test_not_found_still_runs_global_middleware() {
        let trace = Trace::default();
        let response = kernel(&trace).handle(request(Method::GET, "/videos")).await;

        assert_eq!(response.status_code(), 404);
        assert_eq!(*trace.lock().unwrap(), vec!["global"]);
    }

    #[tokio::test]
    async fn test_wrong_method_is_405_with_allow() {
        let trace = Trace::default();
        let response = kernel(&trace)
            .handle(request(Method::DELETE, "/photos/9"))
            .await;

        assert_eq!(response.status_code(), 405);
        assert_eq!(response.header_value("Allow"), Some("GET, HEAD"));
    }
}
