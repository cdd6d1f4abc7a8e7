pub mod app;
pub mod config;
pub mod console;
pub mod container;
pub mod error;
pub mod http;
pub mod logging;
pub mod middleware;
pub mod routing;
pub mod server;
pub mod testing;

pub use app::{Application, BootedApplication, Cli, Commands};
pub use config::{
    env, env_optional, env_required, AppConfig, Config, Environment, Repository, ServerConfig,
};
pub use container::{App, Container, ProviderRegistry, Publishable, ServiceProvider};
pub use error::{AppError, ConfigError, FrameworkError, HttpError};
pub use http::{json, text, HttpKernel, HttpResponse, Redirect, Request, Response, ResponseExt};
pub use middleware::{
    register_global_middleware, AuthUser, Authenticate, Guard, Middleware, MiddlewareRegistry,
    Next, RequestLogger, StaticTokenGuard,
};
pub use routing::{route, ResourceController, RouteTable, Router};
pub use server::Server;

pub use async_trait::async_trait;

#[doc(hidden)]
pub mod __private {
    pub use inventory;
}
