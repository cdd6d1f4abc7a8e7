use crate::error::{AppError, FrameworkError};
use crate::routing::route_with_params;
use bytes::Bytes;
use http_body_util::Full;
use std::collections::HashMap;

/// HTTP Response builder providing Laravel-like response creation
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: u16,
    body: String,
    headers: Vec<(String, String)>,
}

/// Response type alias - allows using `?` operator for early returns
pub type Response = Result<HttpResponse, HttpResponse>;

impl HttpResponse {
    pub fn new() -> Self {
        Self {
            status: 200,
            body: String::new(),
            headers: Vec::new(),
        }
    }

    /// Create a response with a string body
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
        }
    }

    /// Create a JSON response from a serde_json::Value
    pub fn json(body: serde_json::Value) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        }
    }

    /// Set the HTTP status code
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Add a header to the response
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Wrap this response in Ok() for use as Response type
    pub fn ok(self) -> Response {
        Ok(self)
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First value of a header, compared case-insensitively
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Convert to hyper response
    ///
    /// An invalid status code or header degrades to a bare 500.
    pub fn into_hyper(self) -> hyper::Response<Full<Bytes>> {
        let mut builder = hyper::Response::builder().status(self.status);

        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }

        builder
            .body(Full::new(Bytes::from(self.body)))
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "invalid response, sending 500");
                let mut fallback = hyper::Response::new(Full::new(Bytes::new()));
                *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            })
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Extension trait for Response to enable method chaining on helpers
pub trait ResponseExt {
    fn status(self, code: u16) -> Self;
    fn header(self, name: impl Into<String>, value: impl Into<String>) -> Self;
}

impl ResponseExt for Response {
    fn status(self, code: u16) -> Self {
        self.map(|r| r.status(code))
    }

    fn header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.map(|r| r.header(name, value))
    }
}

fn with_query(location: String, query_params: &[(String, String)]) -> String {
    if query_params.is_empty() {
        return location;
    }
    match serde_urlencoded::to_string(query_params) {
        Ok(query) => format!("{}?{}", location, query),
        Err(_) => location,
    }
}

/// HTTP Redirect response builder
pub struct Redirect {
    location: String,
    query_params: Vec<(String, String)>,
    status: u16,
}

impl Redirect {
    /// Create a redirect to a specific URL/path
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            location: path.into(),
            query_params: Vec::new(),
            status: 302,
        }
    }

    /// Create a redirect to a named route
    pub fn route(name: &str) -> RedirectRouteBuilder {
        RedirectRouteBuilder {
            name: name.to_string(),
            params: HashMap::new(),
            query_params: Vec::new(),
            status: 302,
        }
    }

    /// Add a query parameter
    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query_params.push((key.to_string(), value.into()));
        self
    }

    /// Set status to 301 (Moved Permanently)
    pub fn permanent(mut self) -> Self {
        self.status = 301;
        self
    }
}

/// Auto-convert Redirect to Response
impl From<Redirect> for Response {
    fn from(redirect: Redirect) -> Response {
        let url = with_query(redirect.location, &redirect.query_params);
        Ok(HttpResponse::new()
            .status(redirect.status)
            .header("Location", url))
    }
}

/// Builder for redirects to named routes with parameters
pub struct RedirectRouteBuilder {
    name: String,
    params: HashMap<String, String>,
    query_params: Vec<(String, String)>,
    status: u16,
}

impl RedirectRouteBuilder {
    /// Add a route parameter value
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Add a query parameter
    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query_params.push((key.to_string(), value.into()));
        self
    }

    /// Set status to 301 (Moved Permanently)
    pub fn permanent(mut self) -> Self {
        self.status = 301;
        self
    }
}

/// Auto-convert RedirectRouteBuilder to Response
///
/// An unknown route name is a server error, not a redirect.
impl From<RedirectRouteBuilder> for Response {
    fn from(redirect: RedirectRouteBuilder) -> Response {
        let url = route_with_params(&redirect.name, &redirect.params).ok_or_else(|| {
            HttpResponse::from(FrameworkError::internal(format!(
                "Route '{}' not defined",
                redirect.name
            )))
        })?;
        Ok(HttpResponse::new()
            .status(redirect.status)
            .header("Location", with_query(url, &redirect.query_params)))
    }
}

/// Auto-convert FrameworkError to HttpResponse
///
/// This enables using the `?` operator in controller handlers to propagate
/// framework errors as appropriate HTTP responses.
impl From<FrameworkError> for HttpResponse {
    fn from(err: FrameworkError) -> HttpResponse {
        let status = err.status_code();
        if status >= 500 {
            tracing::error!(error = %err, status, "request failed");
        }
        let response = match &err {
            FrameworkError::ParamParse {
                param,
                expected_type,
            } => HttpResponse::json(serde_json::json!({
                "message": err.to_string(),
                "param": param,
                "expected": expected_type,
            })),
            FrameworkError::MethodNotAllowed { allowed } => {
                HttpResponse::json(serde_json::json!({ "message": err.to_string() }))
                    .header("Allow", allowed.join(", "))
            }
            _ => HttpResponse::json(serde_json::json!({ "message": err.to_string() })),
        };
        response.status(status)
    }
}

/// Auto-convert AppError to HttpResponse
impl From<AppError> for HttpResponse {
    fn from(err: AppError) -> HttpResponse {
        FrameworkError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn body_json(response: &HttpResponse) -> Value {
        serde_json::from_str(response.body()).unwrap()
    }

    #[test]
    fn test_method_not_allowed_sets_allow_header() {
        let response = HttpResponse::from(FrameworkError::MethodNotAllowed {
            allowed: vec!["GET".into(), "POST".into()],
        });
        assert_eq!(response.status_code(), 405);
        assert_eq!(response.header_value("allow"), Some("GET, POST"));
        assert_eq!(body_json(&response)["message"], "Method Not Allowed");
    }

    #[test]
    fn test_unauthenticated_body() {
        let response = HttpResponse::from(FrameworkError::Unauthenticated);
        assert_eq!(response.status_code(), 401);
        assert_eq!(
            body_json(&response),
            serde_json::json!({ "message": "Unauthenticated." })
        );
    }

    #[test]
    fn test_redirect_with_query() {
        let response = Response::from(Redirect::to("/login").query("next", "/photos?page=2"))
            .unwrap();
        assert_eq!(response.status_code(), 302);
        assert_eq!(
            response.header_value("Location"),
            Some("/login?next=%2Fphotos%3Fpage%3D2")
        );
    }

    #[test]
    fn test_redirect_to_unknown_route_is_error() {
        let response = Response::from(Redirect::route("nowhere.at.all")).unwrap_err();
        assert_eq!(response.status_code(), 500);
    }

    #[test]
    fn test_response_ext_chaining() {
        let response: Response = HttpResponse::text("created").ok();
        let response = response.status(201).header("X-Id", "7").unwrap();
        assert_eq!(response.status_code(), 201);
        assert_eq!(response.header_value("x-id"), Some("7"));
    }
}
