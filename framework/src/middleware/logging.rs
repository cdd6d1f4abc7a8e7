//! Request logging middleware

use super::{Middleware, Next};
use crate::http::{Request, Response};
use async_trait::async_trait;
use std::time::Instant;
use tracing::{error, info, warn};

/// Logs one line per request with method, path, status and duration
///
/// Client errors log at `warn`, server errors at `error`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestLogger;

#[async_trait]
impl Middleware for RequestLogger {
    async fn handle(&self, request: Request, next: Next) -> Response {
        let method = request.method().clone();
        let path = request.path().to_string();
        let start = Instant::now();

        let response = next(request).await;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        let status = match &response {
            Ok(r) | Err(r) => r.status_code(),
        };
        match status {
            500.. => error!(%method, %path, status, elapsed_ms, "request"),
            400..=499 => warn!(%method, %path, status, elapsed_ms, "request"),
            _ => info!(%method, %path, status, elapsed_ms, "request"),
        }

        response
    }
}
