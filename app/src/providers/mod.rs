mod app_service_provider;
mod auth_service_provider;

pub use auth_service_provider::AuthServiceProvider;
