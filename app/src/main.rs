use ember::{Application, RequestLogger};

mod bootstrap;
mod controllers;
mod middleware;
mod providers;
mod routes;
mod services;

#[tokio::main]
async fn main() {
    // AppServiceProvider is discovered through `provider!`
    Application::new()
        .provider(providers::AuthServiceProvider)
        .middleware(RequestLogger)
        .bootstrap(bootstrap::register)
        .routes(routes::register)
        .run()
        .await;
}
