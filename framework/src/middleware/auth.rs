//! Bearer token authentication
//!
//! `Authenticate` asks the `dyn Guard` bound in the container who owns the
//! request's bearer token. Bind a guard in a provider:
//!
//! ```rust,ignore
//! fn register(&self, container: &mut Container) -> Result<(), FrameworkError> {
//!     let guard = StaticTokenGuard::from_config()?;
//!     container.bind::<dyn Guard>(Arc::new(guard));
//!     Ok(())
//! }
//! ```
//!
//! Handlers behind the middleware read the user from the extensions:
//!
//! ```rust,ignore
//! let user = req.extensions().get::<AuthUser>().cloned();
//! ```

use super::{Middleware, Next};
use crate::config::repository::value_type;
use crate::config::Config;
use crate::container::App;
use crate::error::{ConfigError, FrameworkError};
use crate::http::{HttpResponse, Request, Response};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// The identity attached to an authenticated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
}

impl AuthUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Resolves bearer tokens to users
#[async_trait]
pub trait Guard: Send + Sync {
    /// `None` rejects the token
    async fn user(&self, token: &str) -> Option<AuthUser>;
}

/// Guard backed by a fixed token-to-user map
///
/// Reads the `auth.tokens` config section, a map of user id to token:
///
/// ```yaml
/// # config/auth.yaml
/// tokens:
///   admin: ${API_TOKEN}
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticTokenGuard {
    tokens: HashMap<String, String>,
}

impl StaticTokenGuard {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }

    /// Users whose token is unset, null or empty cannot sign in; numeric
    /// and boolean tokens are taken as their text.
    pub fn from_config() -> Result<Self, ConfigError> {
        if !Config::has("auth.tokens") {
            tracing::warn!("auth.tokens is not configured, every token will be rejected");
            return Ok(Self::default());
        }
        let users: HashMap<String, Value> = Config::section("auth.tokens")?;

        let mut tokens = HashMap::new();
        for (user, value) in users {
            let token = match value {
                Value::String(token) => token,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                other => {
                    return Err(ConfigError::TypeMismatch {
                        key: format!("auth.tokens.{}", user),
                        expected: "string",
                        found: value_type(&other),
                    })
                }
            };
            if token.is_empty() {
                tracing::debug!(user = %user, "no token configured, sign-in disabled");
                continue;
            }
            tokens.insert(token, user);
        }
        Ok(Self::new(tokens))
    }

    pub fn with_token(mut self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), user_id.into());
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl Guard for StaticTokenGuard {
    async fn user(&self, token: &str) -> Option<AuthUser> {
        self.tokens.get(token).map(AuthUser::new)
    }
}

/// Rejects requests without a valid bearer token
///
/// Uses the container's `dyn Guard` unless constructed with an explicit one.
#[derive(Clone, Default)]
pub struct Authenticate {
    guard: Option<Arc<dyn Guard>>,
}

impl Authenticate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_guard(guard: Arc<dyn Guard>) -> Self {
        Self { guard: Some(guard) }
    }

    fn guard(&self) -> Result<Arc<dyn Guard>, FrameworkError> {
        match &self.guard {
            Some(guard) => Ok(guard.clone()),
            None => App::resolve::<dyn Guard>(),
        }
    }
}

#[async_trait]
impl Middleware for Authenticate {
    async fn handle(&self, mut request: Request, next: Next) -> Response {
        let guard = self.guard()?;

        let user = match request.bearer_token() {
            Some(token) => guard.user(token).await,
            None => None,
        };
        let Some(user) = user else {
            tracing::debug!(path = request.path(), "rejected unauthenticated request");
            return Err(HttpResponse::from(FrameworkError::Unauthenticated));
        };

        request.extensions_mut().insert(user);
        next(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{into_boxed, MiddlewareChain};
    use crate::routing::handler;
    use crate::testing::TestContainer;
    use bytes::Bytes;

    fn request(authorization: Option<&str>) -> Request {
        let mut builder = http::Request::builder().uri("/photos");
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        Request::new(builder.body(Bytes::new()).unwrap())
    }

    async fn run(auth: Authenticate, request: Request) -> HttpResponse {
        let mut chain = MiddlewareChain::new();
        chain.push(into_boxed(auth));
        let echo_user = handler(|req: Request| async move {
            let user = req.extensions().get::<AuthUser>().cloned();
            Ok(HttpResponse::text(user.map(|u| u.id).unwrap_or_default()))
        });
        chain
            .execute(request, echo_user)
            .await
            .unwrap_or_else(|e| e)
    }

    fn guard() -> Arc<dyn Guard> {
        Arc::new(StaticTokenGuard::default().with_token("s3cret", "admin"))
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler_with_user() {
        let response = run(Authenticate::with_guard(guard()), request(Some("Bearer s3cret"))).await;
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.body(), "admin");
    }

    #[tokio::test]
    async fn test_missing_or_rejected_token_is_401() {
        for header in [None, Some("Bearer wrong"), Some("Basic s3cret")] {
            let response = run(Authenticate::with_guard(guard()), request(header)).await;
            assert_eq!(response.status_code(), 401);
            assert_eq!(response.body(), r#"{"message":"Unauthenticated."}"#);
        }
    }

    #[tokio::test]
    async fn test_guard_resolved_from_container() {
        let _guard = TestContainer::fake();
        TestContainer::bind::<dyn Guard>(guard());

        let response = run(Authenticate::new(), request(Some("Bearer s3cret"))).await;
        assert_eq!(response.status_code(), 200);
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn test_static_guard_from_config() {
        crate::config::Config::replace(crate::config::Repository::new());
        Config::set("auth.tokens.admin", "tok-admin");
        Config::set("auth.tokens.disabled", "");

        let guard = StaticTokenGuard::from_config().unwrap();
        assert_eq!(guard.len(), 1);
        assert_eq!(guard.user("tok-admin").await, Some(AuthUser::new("admin")));
        assert_eq!(guard.user("").await, None);
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn test_static_guard_unset_token_disables_user() {
        crate::config::Config::replace(crate::config::Repository::new());
        Config::set("auth.tokens.admin", Value::Null);

        let guard = StaticTokenGuard::from_config().unwrap();
        assert!(guard.is_empty());
        assert_eq!(guard.user("null").await, None);
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn test_static_guard_numeric_token_is_text() {
        crate::config::Config::replace(crate::config::Repository::new());
        Config::set("auth.tokens.admin", 123456);
        Config::set("auth.tokens.ops", "ops-token");

        let guard = StaticTokenGuard::from_config().unwrap();
        assert_eq!(guard.len(), 2);
        assert_eq!(guard.user("123456").await, Some(AuthUser::new("admin")));
        assert_eq!(guard.user("ops-token").await, Some(AuthUser::new("ops")));
    }

    #[test]
    #[serial_test::serial]
    fn test_static_guard_rejects_nested_token() {
        crate::config::Config::replace(crate::config::Repository::new());
        Config::set("auth.tokens.admin", serde_json::json!(["a", "b"]));

        assert_eq!(
            StaticTokenGuard::from_config().unwrap_err(),
            ConfigError::TypeMismatch {
                key: "auth.tokens.admin".into(),
                expected: "string",
                found: "array",
            }
        );
    }

    #[tokio::test]
    async fn test_missing_guard_binding_is_server_error() {
        let _guard = TestContainer::fake();
        let response = run(Authenticate::new(), request(Some("Bearer s3cret"))).await;
        assert_eq!(response.status_code(), 500);
    }
}
