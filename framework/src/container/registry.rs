//! Ordered provider registry with two-phase bootstrap

use super::provider::{self, Publishable, ServiceProvider};
use super::Container;
use crate::config::Repository;
use crate::error::FrameworkError;

/// Where a provider is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    Pending,
    Registered,
    Booted,
}

struct Slot {
    provider: Box<dyn ServiceProvider>,
    state: ProviderState,
}

/// Holds providers in order and drives them through register then boot
///
/// Every pending provider registers before any provider boots, and boot runs
/// in the same order as registration. A provider is never registered or
/// booted twice, so running the bootstrap again only affects providers
/// added since.
#[derive(Default)]
pub struct ProviderRegistry {
    slots: Vec<Slot>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with providers registered via `provider!`
    pub fn with_discovered() -> Self {
        let mut registry = Self::new();
        for provider in provider::discovered() {
            registry.add_boxed(provider);
        }
        registry
    }

    pub fn add<P: ServiceProvider + 'static>(&mut self, provider: P) -> &mut Self {
        self.add_boxed(Box::new(provider))
    }

    pub fn add_boxed(&mut self, provider: Box<dyn ServiceProvider>) -> &mut Self {
        self.slots.push(Slot {
            provider,
            state: ProviderState::Pending,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Provider names in bootstrap order
    pub fn names(&self) -> Vec<String> {
        self.slots
            .iter()
            .map(|slot| slot.provider.name().to_string())
            .collect()
    }

    pub fn state_of(&self, name: &str) -> Option<ProviderState> {
        self.slots
            .iter()
            .find(|slot| slot.provider.name() == name)
            .map(|slot| slot.state)
    }

    /// True once every provider has booted
    pub fn is_booted(&self) -> bool {
        self.slots
            .iter()
            .all(|slot| slot.state == ProviderState::Booted)
    }

    /// Merge configuration defaults of pending providers under `config`
    pub fn merge_config(&self, config: &mut Repository) {
        for slot in self.pending() {
            if let Some((section, defaults)) = slot.provider.config() {
                tracing::debug!(provider = slot.provider.name(), section, "merging provider config");
                config.merge_defaults(section, defaults);
            }
        }
    }

    /// Register phase: call `register` on every pending provider in order
    ///
    /// Stops at the first failure; later providers stay pending.
    pub fn register_all(&mut self, container: &mut Container) -> Result<(), FrameworkError> {
        for slot in self
            .slots
            .iter_mut()
            .filter(|slot| slot.state == ProviderState::Pending)
        {
            let name = slot.provider.name().to_string();
            tracing::debug!(provider = %name, "registering provider");
            slot.provider.register(container).map_err(|e| {
                tracing::error!(provider = %name, error = %e, "provider registration failed");
                FrameworkError::ProviderRegistration {
                    provider: name.clone(),
                    message: e.to_string(),
                }
            })?;
            slot.state = ProviderState::Registered;
        }
        Ok(())
    }

    /// Boot phase: call `boot` on every registered provider in order
    pub fn boot_all(&mut self, container: &Container) -> Result<(), FrameworkError> {
        for slot in self
            .slots
            .iter_mut()
            .filter(|slot| slot.state == ProviderState::Registered)
        {
            let name = slot.provider.name().to_string();
            tracing::debug!(provider = %name, "booting provider");
            slot.provider.boot(container).map_err(|e| {
                tracing::error!(provider = %name, error = %e, "provider boot failed");
                FrameworkError::ProviderBoot {
                    provider: name.clone(),
                    message: e.to_string(),
                }
            })?;
            slot.state = ProviderState::Booted;
        }
        Ok(())
    }

    /// Config merge, register phase, then boot phase
    ///
    /// A registration failure aborts before any provider boots.
    pub fn bootstrap(
        &mut self,
        container: &mut Container,
        config: &mut Repository,
    ) -> Result<(), FrameworkError> {
        self.merge_config(config);
        self.register_all(container)?;
        self.boot_all(container)?;
        tracing::info!(providers = self.len(), "providers booted");
        Ok(())
    }

    /// Publishable files, optionally limited to one provider
    pub fn publishables(&self, only: Option<&str>) -> Vec<(String, Publishable)> {
        self.slots
            .iter()
            .filter(|slot| only.map_or(true, |name| slot.provider.name() == name))
            .flat_map(|slot| {
                let name = slot.provider.name().to_string();
                slot.provider
                    .publishes()
                    .into_iter()
                    .map(move |file| (name.clone(), file))
            })
            .collect()
    }

    fn pending(&self) -> impl Iterator<Item = &Slot> {
        self.slots
            .iter()
            .filter(|slot| slot.state == ProviderState::Pending)
    }
}
