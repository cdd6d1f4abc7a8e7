use ember::{Config, Container, FrameworkError, Publishable, ServiceProvider};
use serde_json::json;

use crate::services::PhotoStore;

const PHOTOS_CONFIG: &str = "\
# Photos per page on GET /photos
per_page: 20
# Storage disk recorded on new photos
disk: ${PHOTOS_DISK:-local}
";

/// Binds the application's own services
#[derive(Default)]
pub struct AppServiceProvider;

impl ServiceProvider for AppServiceProvider {
    fn config(&self) -> Option<(&'static str, serde_json::Value)> {
        Some(("photos", json!({ "per_page": 20, "disk": "local" })))
    }

    fn publishes(&self) -> Vec<Publishable> {
        vec![Publishable::config("photos.yaml", PHOTOS_CONFIG)]
    }

    fn register(&self, container: &mut Container) -> Result<(), FrameworkError> {
        let disk = Config::string("photos.disk")?;
        container.singleton(move |_| PhotoStore::new(disk.clone()));
        Ok(())
    }
}

ember::provider!(AppServiceProvider);
