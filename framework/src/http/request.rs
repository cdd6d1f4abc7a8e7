use super::body::{parse_form, parse_json};
use crate::error::FrameworkError;
use bytes::Bytes;
use http::{Extensions, HeaderMap, Method, Uri};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::str::FromStr;

/// HTTP Request wrapper providing Laravel-like access to request data
///
/// The body is collected before dispatch, so `json`, `form` and `input`
/// borrow the request and may be called more than once.
pub struct Request {
    inner: http::Request<Bytes>,
    params: HashMap<String, String>,
}

impl Request {
    pub fn new(inner: http::Request<Bytes>) -> Self {
        Self {
            inner,
            params: HashMap::new(),
        }
    }

    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    /// Request path without the query string
    pub fn path(&self) -> &str {
        self.inner.uri().path()
    }

    /// Get a route parameter by name (e.g., /users/{id})
    /// Returns Err if the parameter is missing, enabling use of `?` operator
    pub fn param(&self, name: &str) -> Result<&str, FrameworkError> {
        self.params
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| FrameworkError::param(name))
    }

    /// Route parameter parsed into `T`
    ///
    /// ```rust,ignore
    /// let id: u64 = req.param_as("id")?;
    /// ```
    pub fn param_as<T: FromStr>(&self, name: &str) -> Result<T, FrameworkError> {
        self.param(name)?
            .parse()
            .map_err(|_| FrameworkError::param_parse(name, std::any::type_name::<T>()))
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// First query string value for `name`, percent-decoded
    pub fn query(&self, name: &str) -> Option<String> {
        self.query_pairs()
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Every query string pair in order
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.inner
            .uri()
            .query()
            .and_then(|query| serde_urlencoded::from_str(query).ok())
            .unwrap_or_default()
    }

    /// Get a header value by name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name).and_then(|v| v.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Get the Content-Type header
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Token from an `Authorization: Bearer <token>` header
    pub fn bearer_token(&self) -> Option<&str> {
        let value = self.header("authorization")?;
        let (scheme, token) = value.split_once(' ')?;
        let token = token.trim();
        (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
    }

    pub fn body(&self) -> &Bytes {
        self.inner.body()
    }

    /// Parse the request body as JSON
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// #[derive(Deserialize)]
    /// struct CreatePhoto { title: String }
    ///
    /// pub async fn store(req: Request) -> Response {
    ///     let data: CreatePhoto = req.json()?;
    ///     // ...
    /// }
    /// ```
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FrameworkError> {
        parse_json(self.inner.body())
    }

    /// Parse the request body as form-urlencoded
    pub fn form<T: DeserializeOwned>(&self) -> Result<T, FrameworkError> {
        parse_form(self.inner.body())
    }

    /// Parse the request body based on Content-Type header
    ///
    /// - `application/x-www-form-urlencoded` -> Form parsing
    /// - Otherwise -> JSON parsing (default)
    pub fn input<T: DeserializeOwned>(&self) -> Result<T, FrameworkError> {
        match self.content_type() {
            Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => self.form(),
            _ => self.json(),
        }
    }

    /// Per-request values set by middleware (e.g. the authenticated user)
    pub fn extensions(&self) -> &Extensions {
        self.inner.extensions()
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        self.inner.extensions_mut()
    }

    pub fn inner(&self) -> &http::Request<Bytes> {
        &self.inner
    }

    pub fn into_inner(self) -> http::Request<Bytes> {
        self.inner
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(inner: http::Request<Bytes>) -> Self {
        Self::new(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn request(builder: http::request::Builder, body: &'static str) -> Request {
        Request::new(builder.body(Bytes::from_static(body.as_bytes())).unwrap())
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Photo {
        title: String,
    }

    #[test]
    fn test_params_and_query() {
        let mut params = HashMap::new();
        params.insert("id".to_string(), "42".to_string());
        let req = request(
            http::Request::builder().uri("/photos/42?sort=desc&tag=a%20b"),
            "",
        )
        .with_params(params);

        assert_eq!(req.path(), "/photos/42");
        assert_eq!(req.param("id").unwrap(), "42");
        assert_eq!(req.param_as::<u64>("id").unwrap(), 42);
        assert!(matches!(req.param("slug"), Err(FrameworkError::ParamError { .. })));
        assert_eq!(req.query("tag"), Some("a b".to_string()));
        assert_eq!(req.query("page"), None);
    }

    #[test]
    fn test_param_parse_failure() {
        let mut params = HashMap::new();
        params.insert("id".to_string(), "abc".to_string());
        let req = request(http::Request::builder().uri("/photos/abc"), "").with_params(params);

        let err = req.param_as::<u32>("id").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_bearer_token() {
        let req = request(
            http::Request::builder().header("Authorization", "Bearer secret-token"),
            "",
        );
        assert_eq!(req.bearer_token(), Some("secret-token"));

        let basic = request(
            http::Request::builder().header("Authorization", "Basic dXNlcg=="),
            "",
        );
        assert_eq!(basic.bearer_token(), None);

        let empty = request(http::Request::builder().header("Authorization", "Bearer "), "");
        assert_eq!(empty.bearer_token(), None);
    }

    #[test]
    fn test_input_follows_content_type() {
        let json = request(
            http::Request::builder().header("Content-Type", "application/json"),
            r#"{"title":"Sunset"}"#,
        );
        assert_eq!(json.input::<Photo>().unwrap().title, "Sunset");

        let form = request(
            http::Request::builder().header("Content-Type", "application/x-www-form-urlencoded"),
            "title=Harbour+lights",
        );
        assert_eq!(form.input::<Photo>().unwrap().title, "Harbour lights");
    }

    #[test]
    fn test_invalid_json_is_bad_request() {
        let req = request(http::Request::builder(), "{not json");
        let err = req.json::<Photo>().unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
