use async_trait::async_trait;
use ember::{
    json, App, AppError, Config, HttpResponse, Request, ResourceController, Response, ResponseExt,
};
use serde::Deserialize;
use serde_json::json;

use crate::services::PhotoStore;

#[derive(Debug, Deserialize)]
struct PhotoInput {
    #[serde(default)]
    title: String,
}

impl PhotoInput {
    fn validated(self) -> Result<String, AppError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AppError::new("The title field is required.").status(422));
        }
        Ok(title.to_string())
    }
}

/// JSON API for photos; `create` and `edit` have no HTML forms and stay 404
#[derive(Default)]
pub struct PhotoController;

#[async_trait]
impl ResourceController for PhotoController {
    async fn index(&self, req: Request) -> Response {
        let store = App::resolve::<PhotoStore>()?;
        let per_page = Config::integer("photos.per_page").unwrap_or(20).max(1) as usize;
        let page: usize = req
            .query("page")
            .and_then(|p| p.parse().ok())
            .unwrap_or(1)
            .max(1);

        let photos = store.page(page, per_page);
        Ok(HttpResponse::json(json!({
            "data": photos,
            "page": page,
            "per_page": per_page,
            "total": store.len(),
            "disk": store.disk(),
        })))
    }

    async fn store(&self, req: Request) -> Response {
        let title = req.input::<PhotoInput>()?.validated()?;
        let photo = App::resolve::<PhotoStore>()?.create(title);
        tracing::info!(id = photo.id, "photo created");
        json(json!({ "data": photo })).status(201)
    }

    async fn show(&self, req: Request) -> Response {
        let id: u64 = req.param_as("id")?;
        let photo = App::resolve::<PhotoStore>()?
            .find(id)
            .ok_or_else(|| AppError::not_found(format!("Photo {} not found", id)))?;
        Ok(HttpResponse::json(json!({ "data": photo })))
    }

    async fn update(&self, req: Request) -> Response {
        let id: u64 = req.param_as("id")?;
        let title = req.input::<PhotoInput>()?.validated()?;
        let photo = App::resolve::<PhotoStore>()?
            .update(id, title)
            .ok_or_else(|| AppError::not_found(format!("Photo {} not found", id)))?;
        Ok(HttpResponse::json(json!({ "data": photo })))
    }

    async fn destroy(&self, req: Request) -> Response {
        let id: u64 = req.param_as("id")?;
        if !App::resolve::<PhotoStore>()?.delete(id) {
            return Err(AppError::not_found(format!("Photo {} not found", id)).into());
        }
        Ok(HttpResponse::new().status(204))
    }
}
