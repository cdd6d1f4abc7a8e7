use ember::{async_trait, Middleware, Next, Request, Response};
use std::time::Instant;

/// Adds an `X-Response-Time` header in milliseconds
pub struct ResponseTime;

#[async_trait]
impl Middleware for ResponseTime {
    async fn handle(&self, request: Request, next: Next) -> Response {
        let start = Instant::now();
        let result = next(request).await;
        let elapsed = format!("{:.3}ms", start.elapsed().as_secs_f64() * 1000.0);

        // Error responses get the header too
        match result {
            Ok(response) => Ok(response.header("X-Response-Time", elapsed)),
            Err(response) => Err(response.header("X-Response-Time", elapsed)),
        }
    }
}
