use ember::{json, route, Config, Redirect, Request, Response};
use serde_json::json;

pub async fn index(_req: Request) -> Response {
    let app = Config::app();
    json(json!({
        "name": app.name,
        "environment": app.env,
        "photos": route("photos.index", &[]),
    }))
}

pub async fn health(_req: Request) -> Response {
    json(json!({ "status": "ok" }))
}

/// Legacy path kept for old bookmarks
pub async fn redirect_home(_req: Request) -> Response {
    Redirect::route("home").permanent().into()
}
