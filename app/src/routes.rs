use ember::{Authenticate, Router};

use crate::controllers;

pub fn register() -> Router {
    Router::new()
        .get("/", controllers::home::index)
        .name("home")
        .get("/home", controllers::home::redirect_home)
        .get("/health", controllers::home::health)
        .name("health")
        .resource("/photos", controllers::photo::PhotoController)
        // Protected routes - requires a bearer token from config/auth.yaml
        .group("/account", |r| {
            r.get("/", controllers::account::show)
                .name("account.show")
        })
        .middleware(Authenticate::new())
        .into()
}
