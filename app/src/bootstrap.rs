//! Application Bootstrap
//!
//! Runs after every service provider has booted, so the container is fully
//! populated. Register global middleware and anything that needs resolved
//! services here.

use ember::global_middleware;

use crate::middleware;

/// Register global middleware and late services
pub async fn register() {
    // Global middleware (runs on every request in registration order)
    global_middleware!(middleware::ResponseTime);
}
