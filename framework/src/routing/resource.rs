//! Resource controllers: the seven conventional CRUD routes from one type

use super::router::{handler, BoxedHandler};
use super::{GroupBuilder, RouteBuilder, Router};
use crate::error::FrameworkError;
use crate::http::{Request, Response};
use async_trait::async_trait;
use http::Method;
use std::sync::Arc;

/// A controller answering the conventional resource actions
///
/// Every action defaults to 404, so implement only what the resource
/// supports.
///
/// | Method    | Path                | Action    | Name              |
/// |-----------|---------------------|-----------|-------------------|
/// | GET       | /photos             | `index`   | `photos.index`    |
/// | GET       | /photos/create      | `create`  | `photos.create`   |
/// | POST      | /photos             | `store`   | `photos.store`    |
/// | GET       | /photos/{id}        | `show`    | `photos.show`     |
/// | GET       | /photos/{id}/edit   | `edit`    | `photos.edit`     |
/// | PUT/PATCH | /photos/{id}        | `update`  | `photos.update`   |
/// | DELETE    | /photos/{id}        | `destroy` | `photos.destroy`  |
#[async_trait]
pub trait ResourceController: Send + Sync + 'static {
    async fn index(&self, _req: Request) -> Response {
        Err(FrameworkError::NotFound.into())
    }

    async fn create(&self, _req: Request) -> Response {
        Err(FrameworkError::NotFound.into())
    }

    async fn store(&self, _req: Request) -> Response {
        Err(FrameworkError::NotFound.into())
    }

    async fn show(&self, _req: Request) -> Response {
        Err(FrameworkError::NotFound.into())
    }

    async fn edit(&self, _req: Request) -> Response {
        Err(FrameworkError::NotFound.into())
    }

    async fn update(&self, _req: Request) -> Response {
        Err(FrameworkError::NotFound.into())
    }

    async fn destroy(&self, _req: Request) -> Response {
        Err(FrameworkError::NotFound.into())
    }
}

#[derive(Clone, Copy)]
enum Action {
    Index,
    Create,
    Store,
    Show,
    Edit,
    Update,
    Destroy,
}

impl Action {
    fn name(self) -> &'static str {
        match self {
            Action::Index => "index",
            Action::Create => "create",
            Action::Store => "store",
            Action::Show => "show",
            Action::Edit => "edit",
            Action::Update => "update",
            Action::Destroy => "destroy",
        }
    }
}

fn action_handler<C: ResourceController>(controller: &Arc<C>, action: Action) -> BoxedHandler {
    let controller = controller.clone();
    handler(move |req: Request| {
        let controller = controller.clone();
        async move {
            match action {
                Action::Index => controller.index(req).await,
                Action::Create => controller.create(req).await,
                Action::Store => controller.store(req).await,
                Action::Show => controller.show(req).await,
                Action::Edit => controller.edit(req).await,
                Action::Update => controller.update(req).await,
                Action::Destroy => controller.destroy(req).await,
            }
        }
    })
}

/// `/admin/photos` -> `admin.photos`
fn name_prefix(path: &str) -> String {
    path.trim_matches('/').replace('/', ".")
}

impl Router {
    /// Register the conventional resource routes for a controller
    ///
    /// The member routes take an `{id}` parameter.
    pub fn resource<C: ResourceController>(mut self, path: &str, controller: C) -> Router {
        let controller = Arc::new(controller);
        let base = path.trim_end_matches('/');
        let member = format!("{}/{{id}}", base);
        let prefix = name_prefix(path);

        let table = [
            (Method::GET, base.to_string(), Action::Index, true),
            (Method::GET, format!("{}/create", base), Action::Create, true),
            (Method::POST, base.to_string(), Action::Store, true),
            (Method::GET, member.clone(), Action::Show, true),
            (Method::GET, format!("{}/edit", member), Action::Edit, true),
            (Method::PUT, member.clone(), Action::Update, true),
            (Method::PATCH, member.clone(), Action::Update, false),
            (Method::DELETE, member, Action::Destroy, true),
        ];

        for (method, route_path, action, named) in table {
            let route_path = if route_path.is_empty() { "/".to_string() } else { route_path };
            let mut builder = self.route_boxed(method, &route_path, action_handler(&controller, action));
            if named {
                builder = builder.name(&format!("{}.{}", prefix, action.name()));
            }
            self = builder.into();
        }
        self
    }
}

impl RouteBuilder {
    pub fn resource<C: ResourceController>(self, path: &str, controller: C) -> Router {
        self.router.resource(path, controller)
    }
}

impl GroupBuilder {
    pub fn resource<C: ResourceController>(self, path: &str, controller: C) -> Router {
        Router::from(self).resource(path, controller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpResponse;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct PhotoController;

    #[async_trait]
    impl ResourceController for PhotoController {
        async fn index(&self, _req: Request) -> Response {
            Ok(HttpResponse::text("all photos"))
        }
    }

    #[test]
    fn test_resource_registers_conventional_routes() {
        let router = Router::new().resource("/admin/photos", PhotoController);

        let summary: Vec<(String, String, Option<String>)> = router
            .routes()
            .iter()
            .map(|r| (r.method.to_string(), r.path.clone(), r.name.clone()))
            .collect();

        let named = |m: &str, p: &str, n: Option<&str>| {
            (m.to_string(), p.to_string(), n.map(str::to_string))
        };
        assert_eq!(
            summary,
            vec![
                named("GET", "/admin/photos", Some("admin.photos.index")),
                named("GET", "/admin/photos/create", Some("admin.photos.create")),
                named("POST", "/admin/photos", Some("admin.photos.store")),
                named("GET", "/admin/photos/{id}", Some("admin.photos.show")),
                named("GET", "/admin/photos/{id}/edit", Some("admin.photos.edit")),
                named("PUT", "/admin/photos/{id}", Some("admin.photos.update")),
                named("PATCH", "/admin/photos/{id}", None),
                named("DELETE", "/admin/photos/{id}", Some("admin.photos.destroy")),
            ]
        );
    }

    #[tokio::test]
    async fn test_unimplemented_action_is_not_found() {
        let controller = Arc::new(PhotoController);
        let request = || {
            Request::new(
                http::Request::builder()
                    .uri("/photos/1")
                    .body(bytes::Bytes::new())
                    .unwrap(),
            )
        };

        let index = action_handler(&controller, Action::Index)(request()).await;
        assert_eq!(index.unwrap().body(), "all photos");

        let show = action_handler(&controller, Action::Show)(request()).await;
        assert_eq!(show.unwrap_err().status_code(), 404);
    }
}
