//! Framework-wide error types
//!
//! Provides a unified error type that can be used throughout the framework
//! and automatically converts to appropriate HTTP responses.

use thiserror::Error;

/// Trait for errors that can be converted to HTTP responses
///
/// Implement this trait on your domain errors to customize the HTTP status code
/// and message returned when the error reaches a handler boundary.
///
/// # Example
///
/// ```rust,ignore
/// use ember::HttpError;
///
/// #[derive(Debug)]
/// struct PhotoNotFound { id: u64 }
///
/// impl std::fmt::Display for PhotoNotFound {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         write!(f, "Photo {} not found", self.id)
///     }
/// }
///
/// impl std::error::Error for PhotoNotFound {}
///
/// impl HttpError for PhotoNotFound {
///     fn status_code(&self) -> u16 { 404 }
/// }
/// ```
pub trait HttpError: std::error::Error + Send + Sync + 'static {
    /// HTTP status code (default: 500)
    fn status_code(&self) -> u16 {
        500
    }

    /// Error message for HTTP response (default: error's Display)
    fn error_message(&self) -> String {
        self.to_string()
    }
}

/// Ad-hoc domain error with a status code
///
/// # Example
///
/// ```rust,ignore
/// use ember::{AppError, FrameworkError};
///
/// fn check(quantity: u32) -> Result<(), FrameworkError> {
///     if quantity == 0 {
///         return Err(AppError::bad_request("Quantity must be positive").into());
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AppError {
    message: String,
    status_code: u16,
}

impl AppError {
    /// Create a new AppError with status 500
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: 500,
        }
    }

    /// Set the HTTP status code
    pub fn status(mut self, code: u16) -> Self {
        self.status_code = code;
        self
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(message).status(404)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message).status(400)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(message).status(403)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(message).status(409)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl HttpError for AppError {
    fn status_code(&self) -> u16 {
        self.status_code
    }

    fn error_message(&self) -> String {
        self.message.clone()
    }
}

impl From<AppError> for FrameworkError {
    fn from(e: AppError) -> Self {
        FrameworkError::Domain {
            message: e.message,
            status_code: e.status_code,
        }
    }
}

/// Errors raised by the configuration repository
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// No value stored under the key and no default supplied
    #[error("Configuration key '{key}' is not set")]
    Missing { key: String },

    /// The stored value has a different runtime type than requested
    #[error("Configuration value for '{key}' must be of type {expected}, {found} given")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A configuration file could not be read or parsed
    #[error("Failed to load configuration file '{path}': {message}")]
    Load { path: String, message: String },

    /// A section could not be deserialized into the requested struct
    #[error("Configuration section '{key}' is invalid: {message}")]
    Deserialize { key: String, message: String },
}

/// Framework-wide error type
///
/// Every variant maps to an HTTP status code, so handlers can propagate
/// framework errors with `?` and get a sensible JSON error response.
#[derive(Debug, Clone, Error)]
pub enum FrameworkError {
    /// Service not found in the dependency injection container
    #[error("Service '{type_name}' not registered in container")]
    ServiceNotFound { type_name: String },

    /// A route parameter was missing
    #[error("Missing required parameter: {param_name}")]
    ParamError { param_name: String },

    /// A route parameter could not be parsed
    #[error("Invalid parameter '{param}': expected {expected_type}")]
    ParamParse {
        param: String,
        expected_type: &'static str,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A required environment variable is unset or unparsable
    #[error("Required environment variable {key} is not set or invalid")]
    MissingEnv { key: String },

    /// A provider failed during the register phase
    #[error("Provider '{provider}' failed to register: {message}")]
    ProviderRegistration { provider: String, message: String },

    /// A provider failed during the boot phase
    #[error("Provider '{provider}' failed to boot: {message}")]
    ProviderBoot { provider: String, message: String },

    /// Two routes claim the same method and pattern
    #[error("Route {method} {path} conflicts with an existing route: {message}")]
    RouteConflict {
        method: String,
        path: String,
        message: String,
    },

    #[error("Not Found")]
    NotFound,

    /// The path exists but not for this method
    #[error("Method Not Allowed")]
    MethodNotAllowed { allowed: Vec<String> },

    #[error("Payload Too Large")]
    PayloadTooLarge { limit: usize },

    #[error("Unauthenticated.")]
    Unauthenticated,

    #[error("Internal server error: {message}")]
    Internal { message: String },

    /// Domain/application error with custom status code
    #[error("{message}")]
    Domain { message: String, status_code: u16 },

    #[error("I/O error: {0}")]
    Io(String),
}

impl FrameworkError {
    /// Create a ServiceNotFound error for a given type
    pub fn service_not_found<T: ?Sized>() -> Self {
        Self::ServiceNotFound {
            type_name: std::any::type_name::<T>().to_string(),
        }
    }

    /// Create a ServiceNotFound error for a named binding
    pub fn named_service_not_found(name: &str) -> Self {
        Self::ServiceNotFound {
            type_name: name.to_string(),
        }
    }

    pub fn param(name: impl Into<String>) -> Self {
        Self::ParamError {
            param_name: name.into(),
        }
    }

    pub fn param_parse(param: impl Into<String>, expected_type: &'static str) -> Self {
        Self::ParamParse {
            param: param.into(),
            expected_type,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn domain(message: impl Into<String>, status_code: u16) -> Self {
        Self::Domain {
            message: message.into(),
            status_code,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ServiceNotFound { .. } => 500,
            Self::ParamError { .. } => 400,
            Self::ParamParse { .. } => 400,
            Self::Config(_) => 500,
            Self::MissingEnv { .. } => 500,
            Self::ProviderRegistration { .. } => 500,
            Self::ProviderBoot { .. } => 500,
            Self::RouteConflict { .. } => 500,
            Self::NotFound => 404,
            Self::MethodNotAllowed { .. } => 405,
            Self::PayloadTooLarge { .. } => 413,
            Self::Unauthenticated => 401,
            Self::Internal { .. } => 500,
            Self::Domain { status_code, .. } => *status_code,
            Self::Io(_) => 500,
        }
    }
}

impl From<std::io::Error> for FrameworkError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(FrameworkError::NotFound.status_code(), 404);
        assert_eq!(FrameworkError::Unauthenticated.status_code(), 401);
        assert_eq!(
            FrameworkError::MethodNotAllowed { allowed: vec![] }.status_code(),
            405
        );
        assert_eq!(FrameworkError::param("id").status_code(), 400);
        assert_eq!(FrameworkError::domain("teapot", 418).status_code(), 418);
    }

    #[test]
    fn test_app_error_converts_to_domain() {
        let err: FrameworkError = AppError::conflict("Already exists").into();
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.to_string(), "Already exists");
    }

    #[test]
    fn test_config_error_message() {
        let err = ConfigError::TypeMismatch {
            key: "app.debug".into(),
            expected: "boolean",
            found: "string",
        };
        assert_eq!(
            err.to_string(),
            "Configuration value for 'app.debug' must be of type boolean, string given"
        );
    }
}
