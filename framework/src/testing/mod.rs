//! Testing utilities for Ember applications
//!
//! - `TestContainer` swaps container bindings for fakes on the current thread
//! - `TestClient` sends requests through the full middleware and routing
//!   stack without opening a socket
//!
//! # Example
//!
//! ```rust,ignore
//! use ember::testing::{TestClient, TestContainer};
//!
//! #[tokio::test]
//! async fn lists_photos() {
//!     let _guard = TestContainer::fake();
//!     TestContainer::instance(PhotoStore::with_fixtures());
//!
//!     let client = TestClient::new(routes::web()).unwrap();
//!     client
//!         .get("/photos")
//!         .send()
//!         .await
//!         .assert_status(200)
//!         .assert_json("0.title", "Sunset");
//! }
//! ```

mod client;

pub use crate::container::testing::{TestContainer, TestContainerGuard};
pub use client::{TestClient, TestRequest, TestResponse};
