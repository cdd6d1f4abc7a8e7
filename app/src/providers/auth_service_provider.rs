use ember::{Container, FrameworkError, Guard, ServiceProvider, StaticTokenGuard};
use std::sync::Arc;

use crate::services::PhotoStore;

pub struct AuthServiceProvider;

impl ServiceProvider for AuthServiceProvider {
    fn register(&self, container: &mut Container) -> Result<(), FrameworkError> {
        let guard = StaticTokenGuard::from_config()?;
        tracing::debug!(tokens = guard.len(), "static token guard ready");
        container.bind::<dyn Guard>(Arc::new(guard));
        Ok(())
    }

    fn boot(&self, container: &Container) -> Result<(), FrameworkError> {
        // Account routes list photos, so the store must exist by now
        container.resolve::<PhotoStore>()?;
        Ok(())
    }
}
