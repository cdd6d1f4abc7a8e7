use ember::{json, AuthUser, FrameworkError, Request, Response};
use serde_json::json;

/// The authenticated user, as set by `Authenticate`
pub async fn show(req: Request) -> Response {
    let user = req
        .extensions()
        .get::<AuthUser>()
        .ok_or(FrameworkError::Unauthenticated)?;

    json(json!({ "id": user.id }))
}
