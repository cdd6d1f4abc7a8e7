//! In-process HTTP client for tests

use crate::error::FrameworkError;
use crate::http::{HttpKernel, HttpResponse, Request};
use crate::middleware::MiddlewareRegistry;
use crate::routing::Router;
use bytes::Bytes;
use http::Method;
use serde::Serialize;
use serde_json::Value;

/// Dispatches requests through an [`HttpKernel`]
pub struct TestClient {
    kernel: HttpKernel,
}

impl TestClient {
    /// Client over `router` with no global middleware
    pub fn new(router: impl Into<Router>) -> Result<Self, FrameworkError> {
        Self::with_middleware(router, MiddlewareRegistry::new())
    }

    pub fn with_middleware(
        router: impl Into<Router>,
        middleware: MiddlewareRegistry,
    ) -> Result<Self, FrameworkError> {
        let routes = router.into().compile()?;
        Ok(Self::from_kernel(HttpKernel::new(routes, middleware)))
    }

    pub fn from_kernel(kernel: HttpKernel) -> Self {
        Self { kernel }
    }

    pub fn kernel(&self) -> &HttpKernel {
        &self.kernel
    }

    pub fn request(&self, method: Method, uri: &str) -> TestRequest<'_> {
        TestRequest {
            client: self,
            builder: http::Request::builder().method(method).uri(uri),
            body: Bytes::new(),
        }
    }

    pub fn get(&self, uri: &str) -> TestRequest<'_> {
        self.request(Method::GET, uri)
    }

    pub fn post(&self, uri: &str) -> TestRequest<'_> {
        self.request(Method::POST, uri)
    }

    pub fn put(&self, uri: &str) -> TestRequest<'_> {
        self.request(Method::PUT, uri)
    }

    pub fn patch(&self, uri: &str) -> TestRequest<'_> {
        self.request(Method::PATCH, uri)
    }

    pub fn delete(&self, uri: &str) -> TestRequest<'_> {
        self.request(Method::DELETE, uri)
    }
}

/// A request being built by [`TestClient`]
pub struct TestRequest<'a> {
    client: &'a TestClient,
    builder: http::request::Builder,
    body: Bytes,
}

impl<'a> TestRequest<'a> {
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", &format!("Bearer {}", token))
    }

    /// JSON body with a matching Content-Type
    pub fn json(mut self, body: &Value) -> Self {
        self.body = Bytes::from(body.to_string());
        self.header("Content-Type", "application/json")
    }

    /// Form-urlencoded body with a matching Content-Type
    pub fn form<T: Serialize + ?Sized>(mut self, fields: &T) -> Self {
        self.body = Bytes::from(serde_urlencoded::to_string(fields).unwrap_or_default());
        self.header("Content-Type", "application/x-www-form-urlencoded")
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Dispatch the request
    ///
    /// Panics if the method, URI or a header is invalid.
    pub async fn send(self) -> TestResponse {
        let request = match self.builder.body(self.body) {
            Ok(request) => request,
            Err(e) => panic!("invalid test request: {}", e),
        };
        TestResponse::from(self.client.kernel.handle(Request::new(request)).await)
    }
}

/// Response captured by [`TestClient`]
///
/// The `assert_*` methods panic with the response body to make failures
/// readable, and return `&Self` so they chain.
#[derive(Debug, Clone)]
pub struct TestResponse {
    response: HttpResponse,
}

impl From<HttpResponse> for TestResponse {
    fn from(response: HttpResponse) -> Self {
        Self { response }
    }
}

impl TestResponse {
    pub fn status(&self) -> u16 {
        self.response.status_code()
    }

    pub fn text(&self) -> &str {
        self.response.body()
    }

    /// Body parsed as JSON; `Value::Null` if it is not JSON
    pub fn json(&self) -> Value {
        serde_json::from_str(self.text()).unwrap_or(Value::Null)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.response.header_value(name)
    }

    #[track_caller]
    pub fn assert_status(&self, expected: u16) -> &Self {
        if self.status() != expected {
            panic!(
                "\n  Expected status: {}\n  Received status: {}\n  Body: {}\n",
                expected,
                self.status(),
                self.text()
            );
        }
        self
    }

    #[track_caller]
    pub fn assert_header(&self, name: &str, expected: &str) -> &Self {
        if self.header(name) != Some(expected) {
            panic!(
                "\n  Expected header {}: {:?}\n  Received: {:?}\n",
                name,
                expected,
                self.header(name)
            );
        }
        self
    }

    /// Compare the JSON value at a dotted path (`data.0.title`)
    #[track_caller]
    pub fn assert_json(&self, path: &str, expected: impl Into<Value>) -> &Self {
        let expected = expected.into();
        let body = self.json();
        let actual = json_path(&body, path);
        if actual != Some(&expected) {
            panic!(
                "\n  Expected JSON at '{}': {}\n  Received: {}\n  Body: {}\n",
                path,
                expected,
                actual.map_or_else(|| "<missing>".to_string(), Value::to_string),
                self.text()
            );
        }
        self
    }
}

fn json_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Response;
    use serde_json::json;

    async fn store(req: Request) -> Response {
        let payload: Value = req.input()?;
        Ok(HttpResponse::json(json!({ "data": [payload] })).status(201))
    }

    #[tokio::test]
    async fn test_json_and_form_bodies() {
        let client = TestClient::new(Router::new().post("/photos", store)).unwrap();

        client
            .post("/photos")
            .json(&json!({ "title": "Sunset" }))
            .send()
            .await
            .assert_status(201)
            .assert_header("content-type", "application/json")
            .assert_json("data.0.title", "Sunset");

        client
            .post("/photos")
            .form(&[("title", "Harbour")])
            .send()
            .await
            .assert_json("data.0.title", "Harbour");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let client = TestClient::new(Router::new()).unwrap();
        let response = client.get("/nope").send().await;
        assert_eq!(response.status(), 404);
        assert_eq!(response.json()["message"], "Not Found");
    }

    #[test]
    #[should_panic(expected = "Expected status: 200")]
    fn test_assert_status_panics_with_body() {
        TestResponse::from(HttpResponse::text("boom").status(500)).assert_status(200);
    }
}
